//! # bs-lib: Closed-Form Black-Scholes Pricing
//!
//! `bs-lib` is a small reference pricer for European options under the
//! Black-Scholes model. It is meant to be used as a building block, or as an
//! analytic oracle when testing numerical pricers.
//!
//! ## Core Features
//!
//! - **Pricing**: call and put prices with `d1`/`d2` exposed as helpers
//! - **Boundary handling**: expiry and zero-volatility limits evaluated in closed form
//! - **Greeks**: delta, gamma, vega, theta and rho
//! - **Implied volatility**: Brent root finding on the pricing formula
//! - **Batch pricing**: CSV input with TOML configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use bs_lib::{call_price, put_price};
//!
//! // sigma, maturity, now, spot, strike, rate
//! let call = call_price(0.2, 1.0, 0.0, 100.0, 100.0, 0.05)?;
//! let put = put_price(0.2, 1.0, 0.0, 100.0, 100.0, 0.05)?;
//!
//! // Put-call parity: C - P = S - K·e^(-r(T-t))
//! let parity = 100.0 - 100.0 * (-0.05f64).exp();
//! assert!((call - put - parity).abs() < 1e-10);
//! # Ok::<(), bs_lib::PricingError>(())
//! ```
//!
//! ## Input Domain
//!
//! Spot and strike must be positive, volatility non-negative, and the
//! valuation time must not be after maturity. Anything else is rejected with
//! [`PricingError::InvalidInput`] rather than producing NaN.
//!
//! Scope is limited to European exercise without dividends.

// ================================================================================================
// MODULES
// ================================================================================================

pub mod error;
pub mod models;
pub mod pricing;

// ================================================================================================
// PUBLIC RE-EXPORTS
// ================================================================================================

pub use error::PricingError;

// Pricing functions
pub use models::bs::{
    call_price, d1, d2, greeks::greeks, implied_vol::implied_volatility, price, put_price,
    ZERO_VOL_THRESHOLD,
};
pub use models::utils::{norm_cdf, norm_pdf};

// Core types and configuration
pub use pricing::{
    config::{ImpliedVolConfig, PricerConfig},
    pipeline::{load_option_rows, price_csv, price_options},
    types::{Greeks, OptionInputs, OptionRow, OptionType, PricingResult},
};

// ================================================================================================
// DEFAULT CONFIGURATIONS
// ================================================================================================

/// Pre-configured batch pricing settings.
///
/// - [`lenient()`]: skip invalid rows, logging each one
/// - [`strict()`]: fail on the first invalid row
pub mod default_configs {
    use crate::pricing::config::PricerConfig;

    /// Skips invalid rows. Suitable for large, noisy input files.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bs_lib::default_configs;
    ///
    /// let config = default_configs::lenient();
    /// assert!(config.skip_invalid_rows);
    /// ```
    pub fn lenient() -> PricerConfig {
        PricerConfig::default()
    }

    /// Rejects the whole batch on the first invalid row and solves implied
    /// volatility to a tighter tolerance.
    pub fn strict() -> PricerConfig {
        PricerConfig::strict()
    }
}
