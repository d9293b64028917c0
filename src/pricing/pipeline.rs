use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::PricingError;
use crate::models::bs::{implied_vol::implied_volatility, price};
use crate::pricing::config::PricerConfig;
use crate::pricing::types::{OptionRow, PricingResult};

/// Price a batch of option rows.
///
/// Rows without a rate use `config.default_rate`. Invalid rows are logged
/// and skipped when `config.skip_invalid_rows` is set, otherwise the first
/// one aborts the batch. Rows carrying a `market_price` also get their
/// implied volatility; a failed solve leaves it as `None`.
/// Results are sorted by strike, calls before puts.
pub fn price_options(
    rows: Vec<OptionRow>,
    config: &PricerConfig,
) -> std::result::Result<Vec<PricingResult>, PricingError> {
    let mut results = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let inputs = row.inputs(config.default_rate);
        let model_price = match price(row.option_type, &inputs) {
            Ok(p) => p,
            Err(err) if config.skip_invalid_rows => {
                warn!(row = index, %err, "skipping invalid option row");
                continue;
            }
            Err(err) => return Err(err),
        };

        let implied_vol = match row.market_price {
            Some(market_price) => {
                match implied_volatility(row.option_type, market_price, &inputs, &config.implied_vol)
                {
                    Ok(iv) => Some(iv),
                    Err(err) => {
                        debug!(row = index, %err, "implied volatility unavailable");
                        None
                    }
                }
            }
            None => None,
        };

        results.push(PricingResult {
            option_type: row.option_type,
            inputs,
            price: model_price,
            implied_vol,
        });
    }

    results.sort_by(|a, b| {
        a.inputs
            .strike
            .partial_cmp(&b.inputs.strike)
            .unwrap_or(Ordering::Equal)
            .then(a.option_type.cmp(&b.option_type))
    });
    Ok(results)
}

/// Read option rows from a CSV file with a header row.
///
/// Expected columns: `option_type,spot,strike,maturity,now,rate,volatility`
/// and optionally `market_price`. Empty `rate`/`market_price` cells are read
/// as missing.
pub fn load_option_rows<P: AsRef<Path>>(path: P) -> Result<Vec<OptionRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut rows = Vec::new();
    for (line, record) in reader.deserialize().enumerate() {
        let row: OptionRow =
            record.with_context(|| format!("Malformed row {} in {}", line + 1, path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Load rows from `path` and price them with `config`.
pub fn price_csv<P: AsRef<Path>>(path: P, config: &PricerConfig) -> Result<Vec<PricingResult>> {
    let rows = load_option_rows(path)?;
    Ok(price_options(rows, config)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::OptionType;
    use approx::assert_abs_diff_eq;

    fn row(option_type: OptionType, spot: f64, strike: f64) -> OptionRow {
        OptionRow {
            option_type,
            spot,
            strike,
            maturity: 1.0,
            now: 0.0,
            rate: Some(0.05),
            volatility: 0.2,
            market_price: None,
        }
    }

    #[test]
    fn test_results_sorted_by_strike_then_type() {
        let rows = vec![
            row(OptionType::Put, 100.0, 110.0),
            row(OptionType::Call, 100.0, 90.0),
            row(OptionType::Put, 100.0, 90.0),
            row(OptionType::Call, 100.0, 110.0),
        ];
        let results = price_options(rows, &PricerConfig::default()).unwrap();
        let order: Vec<(f64, OptionType)> = results
            .iter()
            .map(|r| (r.inputs.strike, r.option_type))
            .collect();
        assert_eq!(
            order,
            vec![
                (90.0, OptionType::Call),
                (90.0, OptionType::Put),
                (110.0, OptionType::Call),
                (110.0, OptionType::Put),
            ]
        );
    }

    #[test]
    fn test_invalid_rows_skipped_or_fatal() {
        let rows = vec![
            row(OptionType::Call, 100.0, 100.0),
            row(OptionType::Call, 0.0, 100.0),
        ];
        let results = price_options(rows.clone(), &PricerConfig::default()).unwrap();
        assert_eq!(results.len(), 1);

        let err = price_options(rows, &PricerConfig::strict()).unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput { field: "spot", .. }));
    }

    #[test]
    fn test_market_price_yields_implied_vol() {
        let mut priced = row(OptionType::Call, 100.0, 100.0);
        priced.market_price = Some(10.450583572185572);
        let mut unsolvable = row(OptionType::Put, 100.0, 100.0);
        unsolvable.market_price = Some(500.0);

        let results = price_options(vec![priced, unsolvable], &PricerConfig::default()).unwrap();
        assert_abs_diff_eq!(results[0].implied_vol.unwrap(), 0.2, epsilon = 1e-8);
        assert_eq!(results[1].implied_vol, None);
    }

    #[test]
    fn test_default_rate_applied() {
        let mut r = row(OptionType::Call, 100.0, 100.0);
        r.rate = None;
        let config = PricerConfig {
            default_rate: 0.05,
            ..PricerConfig::default()
        };
        let results = price_options(vec![r], &config).unwrap();
        assert_eq!(results[0].inputs.rate, 0.05);
        assert_abs_diff_eq!(results[0].price, 10.4506, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_csv_is_error() {
        assert!(load_option_rows("does/not/exist.csv").is_err());
    }
}
