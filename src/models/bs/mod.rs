//! Closed-form Black-Scholes pricing of European options.
//!
//! With `tau = T - t`:
//!
//! ```text
//! d1 = (ln(S/K) + (r + sigma²/2)·tau) / (sigma·sqrt(tau))
//! d2 = d1 - sigma·sqrt(tau)
//! C  = Φ(d1)·S - Φ(d2)·K·e^(-r·tau)
//! P  = Φ(-d2)·K·e^(-r·tau) - Φ(-d1)·S
//! ```
//!
//! At expiry the prices collapse to intrinsic value, and when
//! `sigma·sqrt(tau)` falls below [`ZERO_VOL_THRESHOLD`] they are replaced by
//! the discounted intrinsic value of the forward.

pub mod greeks;
pub mod implied_vol;

use tracing::trace;

use crate::error::PricingError;
use crate::models::utils::norm_cdf;
use crate::pricing::types::{OptionInputs, OptionType};

/// Total volatility `sigma·sqrt(tau)` below which the zero-volatility limit is used.
pub const ZERO_VOL_THRESHOLD: f64 = 1e-10;

/// Which closed form applies to a validated parameter tuple.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Regime {
    /// `now == maturity`
    Expiry,
    /// Total volatility too small to divide by
    ZeroVol { tau: f64, discount: f64 },
    Diffusive {
        tau: f64,
        sqrt_tau: f64,
        d1: f64,
        d2: f64,
        discount: f64,
    },
}

pub(crate) fn regime(inputs: &OptionInputs) -> Result<Regime, PricingError> {
    inputs.validate()?;
    Ok(regime_unchecked(inputs))
}

/// Classify an already validated tuple.
pub(crate) fn regime_unchecked(inputs: &OptionInputs) -> Regime {
    let tau = inputs.tau();
    if tau == 0.0 {
        trace!(spot = inputs.spot, strike = inputs.strike, "pricing at expiry");
        return Regime::Expiry;
    }

    let discount = (-inputs.rate * tau).exp();
    let sqrt_tau = tau.sqrt();
    let total_vol = inputs.volatility * sqrt_tau;
    if total_vol < ZERO_VOL_THRESHOLD {
        trace!(
            sigma = inputs.volatility,
            tau,
            "total volatility below threshold, using zero-volatility limit"
        );
        return Regime::ZeroVol { tau, discount };
    }

    let d1 = ((inputs.spot / inputs.strike).ln()
        + (inputs.rate + 0.5 * inputs.volatility.powi(2)) * tau)
        / total_vol;
    Regime::Diffusive {
        tau,
        sqrt_tau,
        d1,
        d2: d1 - total_vol,
        discount,
    }
}

/// Price for a tuple already classified by [`regime_unchecked`].
pub(crate) fn value(option_type: OptionType, inputs: &OptionInputs, regime: Regime) -> f64 {
    let s = inputs.spot;
    let k = inputs.strike;
    match regime {
        Regime::Expiry => match option_type {
            OptionType::Call => (s - k).max(0.0),
            OptionType::Put => (k - s).max(0.0),
        },
        // max(S·e^(r·tau) - K, 0)·e^(-r·tau), without forming the forward
        Regime::ZeroVol { discount, .. } => match option_type {
            OptionType::Call => (s - k * discount).max(0.0),
            OptionType::Put => (k * discount - s).max(0.0),
        },
        Regime::Diffusive {
            d1, d2, discount, ..
        } => {
            let price = match option_type {
                OptionType::Call => norm_cdf(d1) * s - norm_cdf(d2) * k * discount,
                OptionType::Put => norm_cdf(-d2) * k * discount - norm_cdf(-d1) * s,
            };
            // Cancellation deep out of the money can leave a few ulps below zero.
            // NaN must pass through to the finiteness check in `price`.
            if price < 0.0 {
                0.0
            } else {
                price
            }
        }
    }
}

/// Price a European option described by `inputs`.
pub fn price(option_type: OptionType, inputs: &OptionInputs) -> Result<f64, PricingError> {
    let regime = regime(inputs)?;
    let price = value(option_type, inputs, regime);
    if !price.is_finite() {
        return Err(PricingError::NonFinitePrice {
            option_type,
            value: price,
        });
    }
    Ok(price)
}

/// `d1` of the Black-Scholes formula.
///
/// Returns [`PricingError::DegenerateBoundary`] at expiry or when
/// `sigma·sqrt(maturity - now)` is below [`ZERO_VOL_THRESHOLD`], where the
/// quantity is undefined.
pub fn d1(
    sigma: f64,
    maturity: f64,
    now: f64,
    spot: f64,
    strike: f64,
    rate: f64,
) -> Result<f64, PricingError> {
    let inputs = OptionInputs::new(spot, strike, maturity, now, rate, sigma);
    match regime(&inputs)? {
        Regime::Diffusive { d1, .. } => Ok(d1),
        _ => Err(PricingError::DegenerateBoundary {
            sigma,
            tau: inputs.tau(),
        }),
    }
}

/// `d2 = d1 - sigma·sqrt(maturity - now)`, with the same domain as [`d1`].
pub fn d2(
    sigma: f64,
    maturity: f64,
    now: f64,
    spot: f64,
    strike: f64,
    rate: f64,
) -> Result<f64, PricingError> {
    let inputs = OptionInputs::new(spot, strike, maturity, now, rate, sigma);
    match regime(&inputs)? {
        Regime::Diffusive { d2, .. } => Ok(d2),
        _ => Err(PricingError::DegenerateBoundary {
            sigma,
            tau: inputs.tau(),
        }),
    }
}

/// Price of a European call option under Black-Scholes assumptions.
///
/// # Examples
///
/// ```
/// use bs_lib::call_price;
///
/// let c = call_price(0.2, 1.0, 0.0, 100.0, 100.0, 0.05)?;
/// assert!((c - 10.4506).abs() < 1e-4);
/// # Ok::<(), bs_lib::PricingError>(())
/// ```
pub fn call_price(
    sigma: f64,
    maturity: f64,
    now: f64,
    spot: f64,
    strike: f64,
    rate: f64,
) -> Result<f64, PricingError> {
    price(
        OptionType::Call,
        &OptionInputs::new(spot, strike, maturity, now, rate, sigma),
    )
}

/// Price of a European put option under Black-Scholes assumptions.
pub fn put_price(
    sigma: f64,
    maturity: f64,
    now: f64,
    spot: f64,
    strike: f64,
    rate: f64,
) -> Result<f64, PricingError> {
    price(
        OptionType::Put,
        &OptionInputs::new(spot, strike, maturity, now, rate, sigma),
    )
}
