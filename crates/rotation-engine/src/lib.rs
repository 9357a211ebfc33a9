//! Relative Rotation calculation: the normalized relative-strength ratio of
//! an instrument against a benchmark (RS-Ratio) and its normalized rate of
//! change (RS-Momentum), both centered at 100. The double z-score keeps the
//! two axes comparable across instruments of very different price levels and
//! volatility, which is what makes quadrant comparison meaningful.

use chrono::NaiveDate;

use rotation_core::stats::{rolling_mean, rolling_std_pop};
use rotation_core::{align, Frequency, PriceSeries, RotationPoint, RotationSeries};

/// Compute the rotation trajectory of `instrument` against `benchmark`.
///
/// Returns the trailing `tail + 1` points at the requested frequency, in
/// ascending date order. Any degenerate input — too little overlap, too few
/// resampled points, a flat relative-strength line — yields an empty series;
/// this function never fails upward, since one bad instrument must not
/// abort a batch.
pub fn compute(
    instrument: &PriceSeries,
    benchmark: &PriceSeries,
    frequency: Frequency,
    window: usize,
    tail: usize,
) -> RotationSeries {
    if window < 2 || tail == 0 {
        return Vec::new();
    }

    let (instrument, benchmark) = match align(instrument, benchmark) {
        Ok(pair) => pair,
        Err(_) => return Vec::new(),
    };

    let instrument = instrument.resample(frequency);
    let benchmark = benchmark.resample(frequency);

    // Aligned inputs resample onto identical buckets, but re-join on dates
    // so a gap in either side drops the row instead of shifting the math.
    let rows = join_on_dates(&instrument, &benchmark);
    if rows.len() < window {
        return Vec::new();
    }

    // Relative strength, missing where the benchmark has no usable level.
    let rs: Vec<Option<f64>> = rows
        .iter()
        .map(|(_, inst, bench)| {
            if *bench > 0.0 {
                let value = 100.0 * inst / bench;
                value.is_finite().then_some(value)
            } else {
                None
            }
        })
        .collect();

    let ratio = rolling_zscore(&rs, window);

    // First difference of the ratio, then the same normalization again.
    let mut roc: Vec<Option<f64>> = vec![None; ratio.len()];
    for i in 1..ratio.len() {
        if let (Some(prev), Some(current)) = (ratio[i - 1], ratio[i]) {
            roc[i] = Some(current - prev);
        }
    }
    let momentum = rolling_zscore(&roc, window);

    let mut points: Vec<RotationPoint> = rows
        .iter()
        .enumerate()
        .filter_map(|(i, (date, _, _))| match (ratio[i], momentum[i]) {
            (Some(x), Some(y)) => Some(RotationPoint {
                date: *date,
                x: round2(x),
                y: round2(y),
            }),
            _ => None,
        })
        .collect();

    if points.len() > tail + 1 {
        points = points.split_off(points.len() - (tail + 1));
    }
    points
}

/// Rolling z-score centered at 100. Missing where the window is incomplete,
/// contains a gap, or has zero population standard deviation (a flat window
/// carries no signal, not an infinite one).
fn rolling_zscore(data: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let means = rolling_mean(data, window);
    let stds = rolling_std_pop(data, window);

    data.iter()
        .zip(means.iter().zip(stds.iter()))
        .map(|(value, (mean, std))| match (value, mean, std) {
            (Some(v), Some(m), Some(s)) if *s > 0.0 => Some(100.0 + (v - m) / s),
            _ => None,
        })
        .collect()
}

/// Inner join of two sorted series on date.
fn join_on_dates(a: &PriceSeries, b: &PriceSeries) -> Vec<(NaiveDate, f64, f64)> {
    let a = a.points();
    let b = b.points();
    let mut rows = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                rows.push((a[i].date, a[i].close, b[j].close));
                i += 1;
                j += 1;
            }
        }
    }
    rows
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
