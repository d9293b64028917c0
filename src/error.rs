//! Error types for the pricing core.
//!
//! Numeric functions report failures through [`PricingError`]. Layers that
//! touch the filesystem (configuration, CSV input) wrap these in
//! `anyhow::Error` with context instead.

use thiserror::Error;

use crate::pricing::types::OptionType;

/// Failures reported by the Black-Scholes pricing functions.
///
/// # Examples
///
/// ```
/// use bs_lib::{call_price, PricingError};
///
/// let err = call_price(0.2, 1.0, 0.0, 0.0, 100.0, 0.05).unwrap_err();
/// assert!(matches!(err, PricingError::InvalidInput { field: "spot", .. }));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    /// A parameter lies outside its admissible domain.
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidInput {
        /// Name of the offending parameter
        field: &'static str,
        /// The rejected value
        value: f64,
        /// Constraint the value violated
        reason: &'static str,
    },

    /// `d1`/`d2` are undefined when `sigma * sqrt(T - t)` vanishes.
    ///
    /// Price functions never return this; they switch to the limiting
    /// closed forms instead.
    #[error("d1/d2 undefined for sigma = {sigma}, tau = {tau}")]
    DegenerateBoundary {
        /// Volatility supplied
        sigma: f64,
        /// Time to maturity `T - t`
        tau: f64,
    },

    /// Inputs passed validation but the formula overflowed.
    #[error("Non-finite {option_type} price: {value}")]
    NonFinitePrice {
        /// Call or put
        option_type: OptionType,
        /// The NaN or infinite result
        value: f64,
    },

    /// Implied volatility could not be recovered from a price.
    #[error("Implied volatility: {0}")]
    ImpliedVolatility(String),
}

impl PricingError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidInput {
            field,
            value,
            reason,
        }
    }
}
