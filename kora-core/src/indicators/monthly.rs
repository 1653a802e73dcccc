//! Calendar-month bucketing of daily closes.

use std::collections::BTreeMap;

use super::round_half_up;
use crate::domain::{PricePoint, YearMonth};

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAverage {
    pub month: YearMonth,
    /// Rounded mean close of the month.
    pub average: f64,
    pub samples: usize,
}

/// Group closes by `YYYY-MM` and average each bucket, oldest month first.
///
/// Points whose date does not parse are skipped rather than failing the chart.
pub fn monthly_averages(history: &[PricePoint]) -> Vec<MonthlyAverage> {
    let mut buckets: BTreeMap<YearMonth, (f64, usize)> = BTreeMap::new();
    for point in history {
        if let Some(month) = point.month() {
            let entry = buckets.entry(month).or_insert((0.0, 0));
            entry.0 += point.close;
            entry.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(month, (sum, samples))| MonthlyAverage {
            month,
            average: round_half_up(sum / samples as f64),
            samples,
        })
        .collect()
}
