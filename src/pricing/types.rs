use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PricingError;

/// Option type: call or put
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(format!("Invalid option type: {}", other)),
        }
    }
}

impl TryFrom<String> for OptionType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OptionType> for String {
    fn from(value: OptionType) -> Self {
        value.as_str().to_string()
    }
}

/// One Black-Scholes parameter tuple.
///
/// Times are in years; `rate` is continuously compounded and `volatility`
/// annualised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptionInputs {
    /// Current underlying price (S)
    pub spot: f64,
    /// Strike price (K)
    pub strike: f64,
    /// Contract expiry (T)
    pub maturity: f64,
    /// Valuation time (t)
    pub now: f64,
    /// Risk-free rate (r)
    pub rate: f64,
    /// Volatility (sigma)
    pub volatility: f64,
}

impl OptionInputs {
    pub fn new(spot: f64, strike: f64, maturity: f64, now: f64, rate: f64, volatility: f64) -> Self {
        Self {
            spot,
            strike,
            maturity,
            now,
            rate,
            volatility,
        }
    }

    /// Time to maturity `T - t`.
    pub fn tau(&self) -> f64 {
        self.maturity - self.now
    }

    /// Same tuple with a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Self {
        Self {
            volatility,
            ..*self
        }
    }

    /// Reject tuples the pricer has no defined value for.
    ///
    /// Spot and strike must be positive, volatility non-negative, `now` must
    /// not lie after `maturity`, and every field must be finite, as must the
    /// discount factor `e^(-rate·tau)`.
    pub fn validate(&self) -> Result<(), PricingError> {
        let fields = [
            ("spot", self.spot),
            ("strike", self.strike),
            ("maturity", self.maturity),
            ("now", self.now),
            ("rate", self.rate),
            ("volatility", self.volatility),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(PricingError::invalid(field, value, "must be finite"));
            }
        }

        if self.spot <= 0.0 {
            return Err(PricingError::invalid("spot", self.spot, "must be positive"));
        }
        if self.strike <= 0.0 {
            return Err(PricingError::invalid(
                "strike",
                self.strike,
                "must be positive",
            ));
        }
        if self.volatility < 0.0 {
            return Err(PricingError::invalid(
                "volatility",
                self.volatility,
                "must be non-negative",
            ));
        }
        if self.now > self.maturity {
            return Err(PricingError::invalid(
                "now",
                self.now,
                "must not be after maturity",
            ));
        }
        let discount = (-self.rate * self.tau()).exp();
        if !discount.is_finite() {
            return Err(PricingError::invalid(
                "rate",
                self.rate,
                "discount factor overflows over the time to maturity",
            ));
        }
        Ok(())
    }
}

/// Analytic sensitivities of an option price.
///
/// `vega` and `rho` are per unit change (not per 1%); `theta` is the
/// derivative with respect to the valuation time `now`, per year.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub vega: f64,
    pub theta: f64,
    pub rho: f64,
}

/// Input row for batch pricing, laid out to match the CSV columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionRow {
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    pub maturity: f64,
    pub now: f64,
    /// Falls back to the configured default rate when absent
    #[serde(default)]
    pub rate: Option<f64>,
    pub volatility: f64,
    /// Observed price; when present the implied volatility is solved for
    #[serde(default)]
    pub market_price: Option<f64>,
}

impl OptionRow {
    pub fn inputs(&self, default_rate: f64) -> OptionInputs {
        OptionInputs::new(
            self.spot,
            self.strike,
            self.maturity,
            self.now,
            self.rate.unwrap_or(default_rate),
            self.volatility,
        )
    }
}

/// Result of pricing one [`OptionRow`]
#[derive(Debug, Clone, Serialize)]
pub struct PricingResult {
    pub option_type: OptionType,
    pub inputs: OptionInputs,
    pub price: f64,
    /// Implied volatility of the row's market price, if one was given and solvable
    pub implied_vol: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_type_parsing() {
        assert_eq!("call".parse::<OptionType>().unwrap(), OptionType::Call);
        assert_eq!(" PUT ".parse::<OptionType>().unwrap(), OptionType::Put);
        assert_eq!("c".parse::<OptionType>().unwrap(), OptionType::Call);
        assert!("straddle".parse::<OptionType>().is_err());
    }

    #[test]
    fn test_validate_accepts_expiry_and_zero_vol() {
        assert!(OptionInputs::new(120.0, 100.0, 1.0, 1.0, 0.05, 0.0)
            .validate()
            .is_ok());
        assert!(OptionInputs::new(100.0, 100.0, 1.0, 0.0, -0.02, 0.2)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_each_field() {
        let base = OptionInputs::new(100.0, 100.0, 1.0, 0.0, 0.05, 0.2);
        let cases = [
            (OptionInputs { spot: 0.0, ..base }, "spot"),
            (OptionInputs { strike: -5.0, ..base }, "strike"),
            (base.with_volatility(-0.1), "volatility"),
            (OptionInputs { now: 2.0, ..base }, "now"),
            (OptionInputs { rate: f64::NAN, ..base }, "rate"),
            (OptionInputs { maturity: f64::INFINITY, ..base }, "maturity"),
            (OptionInputs { rate: -800.0, ..base }, "rate"),
        ];
        for (inputs, expected) in cases {
            match inputs.validate() {
                Err(PricingError::InvalidInput { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected InvalidInput for {}, got {:?}", expected, other),
            }
        }
    }

    #[test]
    fn test_row_rate_fallback() {
        let row = OptionRow {
            option_type: OptionType::Put,
            spot: 100.0,
            strike: 95.0,
            maturity: 0.5,
            now: 0.0,
            rate: None,
            volatility: 0.3,
            market_price: None,
        };
        assert_eq!(row.inputs(0.02).rate, 0.02);
        let row = OptionRow {
            rate: Some(0.07),
            ..row
        };
        assert_eq!(row.inputs(0.02).rate, 0.07);
    }
}
