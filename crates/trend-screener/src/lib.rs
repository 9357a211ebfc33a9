//! Long-term uptrend qualification: a seven-condition moving-average and
//! 52-week-range screen evaluated at the latest close (after Minervini's
//! Stage 2 template).

use rotation_core::stats::sma;
use rotation_core::PriceSeries;

/// One trading year of observations required before screening.
const LOOKBACK: usize = 252;
/// Slope test offset for the long moving average (~1 month).
const SLOPE_OFFSET: usize = 21;

/// Number of the seven trend conditions met at the latest date, or `None`
/// when fewer than a year of observations is available.
pub fn trend_score(series: &PriceSeries) -> Option<u8> {
    let closes = series.closes();
    if closes.len() < LOOKBACK {
        return None;
    }

    let last = *closes.last()?;

    let sma_50 = sma(&closes, 50);
    let sma_150 = sma(&closes, 150);
    let sma_200 = sma(&closes, 200);

    let sma_50_now = *sma_50.last()?;
    let sma_150_now = *sma_150.last()?;
    let sma_200_now = *sma_200.last()?;
    if sma_200.len() <= SLOPE_OFFSET {
        return None;
    }
    let sma_200_prev = sma_200[sma_200.len() - 1 - SLOPE_OFFSET];

    let year = &closes[closes.len() - LOOKBACK..];
    let low_52w = year.iter().copied().fold(f64::INFINITY, f64::min);
    let high_52w = year.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if ![last, sma_50_now, sma_150_now, sma_200_now, sma_200_prev, low_52w, high_52w]
        .iter()
        .all(|v| v.is_finite())
    {
        return None;
    }

    let conditions = [
        last > sma_150_now && last > sma_200_now,
        sma_150_now > sma_200_now,
        sma_200_now > sma_200_prev,
        sma_50_now > sma_150_now && sma_50_now > sma_200_now,
        last > sma_50_now,
        last >= 1.30 * low_52w,
        last >= 0.75 * high_52w,
    ];

    Some(conditions.iter().filter(|&&met| met).count() as u8)
}

/// Whether the series is in a qualifying long-term uptrend: all seven
/// conditions must hold. Every failure path — short history, degenerate
/// values — is `false`, never an error.
pub fn is_qualifying_trend(series: &PriceSeries) -> bool {
    trend_score(series) == Some(7)
}
