use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::RotationError;
use crate::types::Frequency;

/// Minimum number of common dates required to align two series.
pub const MIN_OVERLAP: usize = 20;

/// One daily closing observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// An ordered, date-keyed sequence of daily closes: strictly increasing
/// dates, no duplicates, no negative or non-finite values. Immutable once
/// constructed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    /// Build a series from raw observations. Points are sorted by date,
    /// non-finite and negative closes are dropped, and for a duplicated
    /// date the last value supplied wins.
    pub fn from_points(points: Vec<PricePoint>) -> Self {
        let mut points: Vec<PricePoint> = points
            .into_iter()
            .filter(|p| p.close.is_finite() && p.close >= 0.0)
            .collect();
        points.sort_by_key(|p| p.date);

        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self(deduped)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.0.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.0.iter().map(|p| p.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.0.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.0.last().map(|p| p.date)
    }

    pub fn last_close(&self) -> Option<f64> {
        self.0.last().map(|p| p.close)
    }

    /// Close on a specific date, if present.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.0
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.0[i].close)
    }

    /// Reduce to the requested sampling frequency: weekly keeps the last
    /// observation of each Mon–Fri week stamped on that week's Friday,
    /// monthly keeps the last observation of each calendar month.
    pub fn resample(&self, frequency: Frequency) -> PriceSeries {
        match frequency {
            Frequency::Daily => self.clone(),
            Frequency::Weekly => {
                let mut out: Vec<PricePoint> = Vec::new();
                for point in &self.0 {
                    let friday = week_friday(point.date);
                    match out.last_mut() {
                        Some(last) if last.date == friday => last.close = point.close,
                        _ => out.push(PricePoint {
                            date: friday,
                            close: point.close,
                        }),
                    }
                }
                PriceSeries(out)
            }
            Frequency::Monthly => {
                let mut out: Vec<PricePoint> = Vec::new();
                for point in &self.0 {
                    match out.last_mut() {
                        Some(last)
                            if last.date.year() == point.date.year()
                                && last.date.month() == point.date.month() =>
                        {
                            *last = *point;
                        }
                        _ => out.push(*point),
                    }
                }
                PriceSeries(out)
            }
        }
    }

    /// Restrict to the dates present in `keep`, preserving order.
    fn restrict(&self, keep: &HashSet<NaiveDate>) -> PriceSeries {
        PriceSeries(
            self.0
                .iter()
                .filter(|p| keep.contains(&p.date))
                .copied()
                .collect(),
        )
    }
}

/// The Friday of the Mon–Fri trading week containing `date`. Weekend
/// observations fall back to the Friday just passed.
fn week_friday(date: NaiveDate) -> NaiveDate {
    let weekday = date.weekday().num_days_from_monday() as i64;
    date + Duration::days(4 - weekday)
}

/// Restrict two series to their common trading calendar.
///
/// Pure: inputs are borrowed and never mutated, so the same series can be
/// aligned against several benchmarks. Fails with `InsufficientOverlap`
/// below [`MIN_OVERLAP`] common dates.
pub fn align(
    a: &PriceSeries,
    b: &PriceSeries,
) -> Result<(PriceSeries, PriceSeries), RotationError> {
    let b_dates: HashSet<NaiveDate> = b.0.iter().map(|p| p.date).collect();
    let common: HashSet<NaiveDate> = a
        .0
        .iter()
        .map(|p| p.date)
        .filter(|d| b_dates.contains(d))
        .collect();

    if common.len() < MIN_OVERLAP {
        return Err(RotationError::InsufficientOverlap {
            required: MIN_OVERLAP,
            got: common.len(),
        });
    }

    Ok((a.restrict(&common), b.restrict(&common)))
}
