use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PricingError;

/// Brent solver settings for implied volatility
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpliedVolConfig {
    /// Upper end of the first bracket tried
    #[serde(default = "default_initial_upper")]
    pub initial_upper: f64,
    /// The bracket is doubled until it contains the root or passes this value
    #[serde(default = "default_max_upper")]
    pub max_upper: f64,
    /// Absolute tolerance on the price residual
    #[serde(default = "default_iv_tolerance")]
    pub tolerance: f64,
    /// Iteration cap handed to the Brent solver
    #[serde(default = "default_iv_max_iterations")]
    pub max_iterations: usize,
}

impl Default for ImpliedVolConfig {
    fn default() -> Self {
        Self {
            initial_upper: default_initial_upper(),
            max_upper: default_max_upper(),
            tolerance: default_iv_tolerance(),
            max_iterations: default_iv_max_iterations(),
        }
    }
}

impl ImpliedVolConfig {
    /// Bracket ends and tolerance must be positive and finite, with
    /// `initial_upper <= max_upper`, and the solver needs at least one iteration.
    pub fn validate(&self) -> std::result::Result<(), PricingError> {
        let positive = [
            ("implied_vol.initial_upper", self.initial_upper),
            ("implied_vol.max_upper", self.max_upper),
            ("implied_vol.tolerance", self.tolerance),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(PricingError::invalid(
                    field,
                    value,
                    "must be positive and finite",
                ));
            }
        }
        if self.initial_upper > self.max_upper {
            return Err(PricingError::invalid(
                "implied_vol.initial_upper",
                self.initial_upper,
                "must not exceed max_upper",
            ));
        }
        if self.max_iterations == 0 {
            return Err(PricingError::invalid(
                "implied_vol.max_iterations",
                0.0,
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Main configuration struct for batch pricing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricerConfig {
    /// Rate applied to rows that do not carry their own
    #[serde(default = "default_rate")]
    pub default_rate: f64,

    /// Log and drop invalid rows instead of failing the whole batch
    #[serde(default = "default_skip_invalid_rows")]
    pub skip_invalid_rows: bool,

    #[serde(default)]
    pub implied_vol: ImpliedVolConfig,
}

impl Default for PricerConfig {
    fn default() -> Self {
        Self {
            default_rate: default_rate(),
            skip_invalid_rows: default_skip_invalid_rows(),
            implied_vol: ImpliedVolConfig::default(),
        }
    }
}

impl PricerConfig {
    /// Fail on the first invalid row, with a tighter solver tolerance
    pub fn strict() -> Self {
        Self {
            skip_invalid_rows: false,
            implied_vol: ImpliedVolConfig {
                tolerance: 1e-14,
                ..ImpliedVolConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> std::result::Result<(), PricingError> {
        if !self.default_rate.is_finite() {
            return Err(PricingError::invalid(
                "default_rate",
                self.default_rate,
                "must be finite",
            ));
        }
        self.implied_vol.validate()
    }

    /// Parse a TOML document; omitted keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse pricer configuration")?;
        config
            .validate()
            .context("Invalid pricer configuration")?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }
}

fn default_rate() -> f64 {
    0.02
}

fn default_skip_invalid_rows() -> bool {
    true
}

fn default_initial_upper() -> f64 {
    5.0
}

fn default_max_upper() -> f64 {
    100.0
}

fn default_iv_tolerance() -> f64 {
    1e-12
}

fn default_iv_max_iterations() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = PricerConfig::from_toml_str("").unwrap();
        assert_eq!(config.default_rate, 0.02);
        assert!(config.skip_invalid_rows);
        assert_eq!(config.implied_vol.initial_upper, 5.0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = PricerConfig::from_toml_str(
            r#"
            default_rate = 0.05

            [implied_vol]
            max_upper = 20.0
            "#,
        )
        .unwrap();
        assert_eq!(config.default_rate, 0.05);
        assert_eq!(config.implied_vol.max_upper, 20.0);
        assert_eq!(config.implied_vol.tolerance, 1e-12);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(PricerConfig::from_toml_str("default_rate = \"high\"").is_err());
    }

    #[test]
    fn test_non_positive_bracket_rejected() {
        for doc in [
            "[implied_vol]\ninitial_upper = 0.0",
            "[implied_vol]\ninitial_upper = -1.0",
            "[implied_vol]\nmax_upper = 1.0",
            "[implied_vol]\ntolerance = 0.0",
            "[implied_vol]\nmax_iterations = 0",
        ] {
            assert!(PricerConfig::from_toml_str(doc).is_err(), "accepted: {}", doc);
        }
    }

    #[test]
    fn test_validate_names_offending_field() {
        let config = ImpliedVolConfig {
            initial_upper: f64::NAN,
            ..ImpliedVolConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PricingError::InvalidInput {
                field: "implied_vol.initial_upper",
                ..
            })
        ));
        assert!(PricerConfig::default().validate().is_ok());
        assert!(PricerConfig::strict().validate().is_ok());
    }

    #[test]
    fn test_strict_preset() {
        let config = PricerConfig::strict();
        assert!(!config.skip_invalid_rows);
        assert!(config.implied_vol.tolerance < ImpliedVolConfig::default().tolerance);
    }
}
