use crate::error::PricingError;
use crate::models::bs::{regime, Regime};
use crate::models::utils::{norm_cdf, norm_pdf};
use crate::pricing::types::{Greeks, OptionInputs, OptionType};

/// Analytic Greeks of a European option.
///
/// In the expiry and zero-volatility limits gamma and vega vanish, delta is
/// the in-the-money indicator and theta/rho are the derivatives of the
/// limiting price.
pub fn greeks(option_type: OptionType, inputs: &OptionInputs) -> Result<Greeks, PricingError> {
    let s = inputs.spot;
    let k = inputs.strike;
    let r = inputs.rate;

    let greeks = match regime(inputs)? {
        Regime::Expiry => {
            let delta = match option_type {
                OptionType::Call if s > k => 1.0,
                OptionType::Put if s < k => -1.0,
                _ => 0.0,
            };
            Greeks {
                delta,
                ..Greeks::default()
            }
        }
        Regime::ZeroVol { tau, discount } => {
            let discounted_strike = k * discount;
            match option_type {
                // Value is S - K·e^(-r·tau) while the forward is above the strike
                OptionType::Call if s > discounted_strike => Greeks {
                    delta: 1.0,
                    theta: -r * k * discount,
                    rho: k * tau * discount,
                    ..Greeks::default()
                },
                OptionType::Put if s < discounted_strike => Greeks {
                    delta: -1.0,
                    theta: r * k * discount,
                    rho: -k * tau * discount,
                    ..Greeks::default()
                },
                _ => Greeks::default(),
            }
        }
        Regime::Diffusive {
            tau,
            sqrt_tau,
            d1,
            d2,
            discount,
        } => {
            let pdf = norm_pdf(d1);
            let sigma = inputs.volatility;
            let gamma = pdf / (s * sigma * sqrt_tau);
            let vega = s * pdf * sqrt_tau;
            let decay = -s * pdf * sigma / (2.0 * sqrt_tau);

            match option_type {
                OptionType::Call => Greeks {
                    delta: norm_cdf(d1),
                    gamma,
                    vega,
                    theta: decay - r * k * discount * norm_cdf(d2),
                    rho: k * tau * discount * norm_cdf(d2),
                },
                OptionType::Put => Greeks {
                    delta: norm_cdf(d1) - 1.0,
                    gamma,
                    vega,
                    theta: decay + r * k * discount * norm_cdf(-d2),
                    rho: -k * tau * discount * norm_cdf(-d2),
                },
            }
        }
    };
    Ok(greeks)
}
