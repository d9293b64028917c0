use roots::{find_root_brent, SimpleConvergency};
use tracing::debug;

use crate::error::PricingError;
use crate::models::bs::{regime_unchecked, value, Regime};
use crate::pricing::config::ImpliedVolConfig;
use crate::pricing::types::{OptionInputs, OptionType};

/// Cap on how many times the upper bracket end is doubled.
const MAX_BRACKET_DOUBLINGS: usize = 64;

/// Solve for the volatility at which the Black-Scholes price equals `target_price`.
///
/// The `volatility` field of `inputs` is ignored. Prices must lie within the
/// no-arbitrage band: at or above the zero-volatility price and strictly
/// below `S` for calls or `K·e^(-r·tau)` for puts. A price at the lower
/// edge maps to zero volatility.
/// Uses Brent's method on `[0, upper]`, doubling `upper` until the root is bracketed.
pub fn implied_volatility(
    option_type: OptionType,
    target_price: f64,
    inputs: &OptionInputs,
    config: &ImpliedVolConfig,
) -> Result<f64, PricingError> {
    config.validate()?;
    let inputs = inputs.with_volatility(0.0);
    inputs.validate()?;
    if !target_price.is_finite() {
        return Err(PricingError::invalid(
            "target_price",
            target_price,
            "must be finite",
        ));
    }

    let lower_bound = match regime_unchecked(&inputs) {
        Regime::Expiry => {
            return Err(PricingError::ImpliedVolatility(
                "volatility is undetermined at expiry".to_string(),
            ))
        }
        regime => value(option_type, &inputs, regime),
    };
    let upper_bound = match option_type {
        OptionType::Call => inputs.spot,
        OptionType::Put => inputs.strike * (-inputs.rate * inputs.tau()).exp(),
    };

    if target_price < lower_bound - config.tolerance || target_price >= upper_bound {
        return Err(PricingError::ImpliedVolatility(format!(
            "price {} outside no-arbitrage bounds [{}, {})",
            target_price, lower_bound, upper_bound
        )));
    }
    if target_price <= lower_bound + config.tolerance {
        return Ok(0.0);
    }

    let objective = |sigma: f64| {
        let trial = inputs.with_volatility(sigma);
        value(option_type, &trial, regime_unchecked(&trial)) - target_price
    };

    let mut upper = config.initial_upper;
    let mut doublings = 0;
    while objective(upper) < 0.0 {
        upper *= 2.0;
        doublings += 1;
        if upper > config.max_upper || doublings >= MAX_BRACKET_DOUBLINGS {
            return Err(PricingError::ImpliedVolatility(format!(
                "no volatility below {} reproduces price {}",
                upper.min(config.max_upper),
                target_price
            )));
        }
    }

    let mut convergency = SimpleConvergency {
        eps: config.tolerance,
        max_iter: config.max_iterations,
    };
    match find_root_brent(0.0, upper, &objective, &mut convergency) {
        Ok(sigma) => Ok(sigma),
        Err(err) => {
            debug!(?err, target_price, upper, "Brent solver failed");
            Err(PricingError::ImpliedVolatility(format!(
                "root finding failed for price {}: {:?}",
                target_price, err
            )))
        }
    }
}
