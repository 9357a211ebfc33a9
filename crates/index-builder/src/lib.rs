//! Synthetic index construction: blends a set of constituent price series
//! into one weighted aggregate, normalized to a base level of 100 so that
//! absolute price levels cannot distort the mix. Square-root-of-cap is the
//! preferred default here: it keeps an industry index from being a proxy
//! for its one or two largest names.

use std::collections::HashSet;

use chrono::NaiveDate;

use rotation_core::{IndexSeries, PricePoint, PriceSeries, RotationConfig, Security, WeightScheme};

/// Normalized weights (summing to 1.0) for a set of surviving constituents.
pub fn weights(constituents: &[(Security, PriceSeries)], scheme: WeightScheme) -> Vec<(String, f64)> {
    let raw: Vec<f64> = constituents
        .iter()
        .map(|(security, _)| match scheme {
            WeightScheme::CapWeight => security.market_cap,
            WeightScheme::SqrtCapWeight => security.market_cap.sqrt(),
            WeightScheme::EqualWeight => 1.0,
        })
        .collect();

    let total: f64 = raw.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }

    constituents
        .iter()
        .zip(raw.iter())
        .map(|((security, _), value)| (security.symbol.clone(), value / total))
        .collect()
}

/// Blend several series into one by weighted sum over their common dates
/// (inner join; dates missing from any part are dropped, never filled).
/// `None` when there is nothing to blend or the result is identically zero.
pub fn blend_weighted(parts: &[(f64, &PriceSeries)]) -> Option<PriceSeries> {
    let (_, first) = parts.first()?;

    let mut common: Vec<NaiveDate> = first.dates();
    for (_, series) in &parts[1..] {
        let keep: HashSet<NaiveDate> = series.dates().into_iter().collect();
        common.retain(|d| keep.contains(d));
    }
    if common.is_empty() {
        return None;
    }

    let points: Vec<PricePoint> = common
        .iter()
        .map(|&date| {
            let close = parts
                .iter()
                .map(|(weight, series)| weight * series.get(date).unwrap_or(0.0))
                .sum();
            PricePoint { date, close }
        })
        .collect();

    if points.iter().map(|p| p.close).sum::<f64>() == 0.0 {
        return None;
    }
    Some(PriceSeries::from_points(points))
}

/// Build a synthetic index from constituent (security, price series) pairs.
///
/// Constituents with no price history, a non-positive market cap (under the
/// cap-based schemes), or a latest close below the configured price floor
/// are discarded first. Survivors are rebased to 100 at their first common
/// date and blended under the scheme's weights; the raw (non-rebased)
/// cap-proportional blend is available by turning `rebase_constituents`
/// off under `CapWeight`.
pub fn build(
    constituents: &[(Security, PriceSeries)],
    scheme: WeightScheme,
    config: &RotationConfig,
) -> Option<IndexSeries> {
    let needs_cap = matches!(scheme, WeightScheme::CapWeight | WeightScheme::SqrtCapWeight);

    let mut survivors: Vec<(Security, PriceSeries)> = constituents
        .iter()
        .filter(|(security, series)| {
            if series.is_empty() {
                return false;
            }
            if needs_cap && security.market_cap <= 0.0 {
                return false;
            }
            if config.min_price > 0.0 {
                match series.last_close() {
                    Some(close) if close >= config.min_price => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();

    let rebase = config.rebase_constituents || scheme != WeightScheme::CapWeight;

    // A constituent with no usable level on the base date cannot be rebased;
    // dropping one can only widen the common calendar, so re-derive it until
    // the survivor set is stable.
    let base_date = loop {
        if survivors.is_empty() {
            return None;
        }
        let base = first_common_date(&survivors)?;
        if !rebase {
            break base;
        }
        let before = survivors.len();
        survivors.retain(|(_, series)| series.get(base).is_some_and(|close| close > 0.0));
        if survivors.len() == before {
            break base;
        }
    };

    let weighted = weights(&survivors, scheme);
    if weighted.is_empty() {
        return None;
    }

    let scaled: Vec<PriceSeries> = survivors
        .iter()
        .map(|(_, series)| {
            if rebase {
                let base = series.get(base_date).unwrap_or(0.0);
                scale(series, 100.0 / base)
            } else {
                series.clone()
            }
        })
        .collect();

    let parts: Vec<(f64, &PriceSeries)> = weighted
        .iter()
        .zip(scaled.iter())
        .map(|((_, weight), series)| (*weight, series))
        .collect();

    let series = blend_weighted(&parts)?;
    Some(IndexSeries {
        series,
        scheme,
        base_date: rebase.then_some(base_date),
    })
}

fn first_common_date(constituents: &[(Security, PriceSeries)]) -> Option<NaiveDate> {
    let (_, first) = constituents.first()?;
    let mut common: Vec<NaiveDate> = first.dates();
    for (_, series) in &constituents[1..] {
        let keep: HashSet<NaiveDate> = series.dates().into_iter().collect();
        common.retain(|d| keep.contains(d));
    }
    common.first().copied()
}

fn scale(series: &PriceSeries, factor: f64) -> PriceSeries {
    PriceSeries::from_points(
        series
            .points()
            .iter()
            .map(|p| PricePoint {
                date: p.date,
                close: p.close * factor,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn security(symbol: &str, market_cap: f64) -> Security {
        Security {
            symbol: symbol.to_string(),
            display_name: symbol.to_string(),
            market_cap,
        }
    }

    fn flat_series(start: NaiveDate, n: usize, close: f64) -> PriceSeries {
        PriceSeries::from_points(
            (0..n)
                .map(|i| PricePoint {
                    date: start + Duration::days(i as i64),
                    close,
                })
                .collect(),
        )
    }

    fn ramp_series(start: NaiveDate, n: usize, base: f64, step: f64) -> PriceSeries {
        PriceSeries::from_points(
            (0..n)
                .map(|i| PricePoint {
                    date: start + Duration::days(i as i64),
                    close: base + step * i as f64,
                })
                .collect(),
        )
    }

    #[test]
    fn test_weights_sum_to_one() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 100.0), flat_series(start, 30, 10.0)),
            (security("B", 400.0), flat_series(start, 30, 20.0)),
            (security("C", 900.0), flat_series(start, 30, 30.0)),
        ];

        for scheme in [
            WeightScheme::CapWeight,
            WeightScheme::SqrtCapWeight,
            WeightScheme::EqualWeight,
        ] {
            let w = weights(&constituents, scheme);
            let total: f64 = w.iter().map(|(_, v)| v).sum();
            assert!((total - 1.0).abs() < 1e-9, "{}: {total}", scheme.name());
        }
    }

    #[test]
    fn test_sqrt_cap_quadruple_cap_doubles_weight() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("SMALL", 100.0), flat_series(start, 30, 10.0)),
            (security("BIG", 400.0), flat_series(start, 30, 20.0)),
        ];

        let w = weights(&constituents, WeightScheme::SqrtCapWeight);
        assert!((w[1].1 - 2.0 * w[0].1).abs() < 1e-9);
    }

    #[test]
    fn test_sqrt_cap_weight_ratios() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 100.0), flat_series(start, 30, 10.0)),
            (security("B", 400.0), flat_series(start, 30, 20.0)),
            (security("C", 900.0), flat_series(start, 30, 30.0)),
        ];

        // sqrt(100) : sqrt(400) : sqrt(900) = 10 : 20 : 30
        let w = weights(&constituents, WeightScheme::SqrtCapWeight);
        assert!((w[0].1 - 1.0 / 6.0).abs() < 1e-9);
        assert!((w[1].1 - 2.0 / 6.0).abs() < 1e-9);
        assert!((w[2].1 - 3.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_cap_constituent_discarded_under_cap_scheme() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("GOOD", 100.0), ramp_series(start, 30, 50.0, 1.0)),
            (security("BAD", 0.0), ramp_series(start, 30, 10.0, 1.0)),
        ];
        let config = RotationConfig::default();

        let index = build(&constituents, WeightScheme::SqrtCapWeight, &config).unwrap();
        // Only GOOD survives, so the rebased index is GOOD rebased to 100.
        assert!((index.series.closes()[0] - 100.0).abs() < 1e-9);
        assert_eq!(index.base_date, Some(start));
        assert!((index.series.closes()[29] - 100.0 * 79.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_floor_discards_penny_constituent() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 100.0), ramp_series(start, 30, 50.0, 1.0)),
            (security("PENNY", 100.0), flat_series(start, 30, 2.0)),
        ];
        let config = RotationConfig {
            min_price: 5.0,
            ..Default::default()
        };

        let index = build(&constituents, WeightScheme::EqualWeight, &config).unwrap();
        assert!((index.series.closes()[29] - 100.0 * 79.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rebased_index_starts_at_100() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 100.0), ramp_series(start, 40, 1000.0, 5.0)),
            (security("B", 100.0), ramp_series(start, 40, 3.0, 0.1)),
        ];
        let config = RotationConfig::default();

        let index = build(&constituents, WeightScheme::EqualWeight, &config).unwrap();
        assert!((index.series.closes()[0] - 100.0).abs() < 1e-9);
        assert_eq!(index.base_date, Some(start));
    }

    #[test]
    fn test_inner_join_drops_uncommon_dates() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 100.0), ramp_series(start, 40, 10.0, 1.0)),
            (
                security("B", 100.0),
                ramp_series(start + Duration::days(10), 40, 10.0, 1.0),
            ),
        ];
        let config = RotationConfig::default();

        let index = build(&constituents, WeightScheme::EqualWeight, &config).unwrap();
        assert_eq!(index.series.len(), 30);
        assert_eq!(index.series.first_date(), Some(start + Duration::days(10)));
    }

    #[test]
    fn test_raw_cap_weight_blends_price_levels() {
        let start = date(2024, 1, 1);
        let constituents = vec![
            (security("A", 300.0), flat_series(start, 30, 10.0)),
            (security("B", 100.0), flat_series(start, 30, 50.0)),
        ];
        let config = RotationConfig {
            rebase_constituents: false,
            ..Default::default()
        };

        let index = build(&constituents, WeightScheme::CapWeight, &config).unwrap();
        // 0.75 * 10 + 0.25 * 50 = 20
        assert!((index.series.closes()[0] - 20.0).abs() < 1e-9);
        assert_eq!(index.base_date, None);
    }

    #[test]
    fn test_degenerate_inputs_yield_none() {
        let start = date(2024, 1, 1);
        let config = RotationConfig::default();

        assert!(build(&[], WeightScheme::EqualWeight, &config).is_none());

        // All-zero closes cannot be rebased, and the raw blend sums to zero.
        let zeros = vec![(security("Z", 100.0), flat_series(start, 30, 0.0))];
        assert!(build(&zeros, WeightScheme::EqualWeight, &config).is_none());

        let raw_config = RotationConfig {
            rebase_constituents: false,
            ..Default::default()
        };
        assert!(build(&zeros, WeightScheme::CapWeight, &raw_config).is_none());

        // Disjoint calendars leave nothing to blend.
        let disjoint = vec![
            (security("A", 100.0), flat_series(start, 10, 5.0)),
            (
                security("B", 100.0),
                flat_series(start + Duration::days(100), 10, 5.0),
            ),
        ];
        assert!(build(&disjoint, WeightScheme::EqualWeight, &config).is_none());
    }
}
