//! Price-series indicators used by the report chart.
//!
//! All outputs are rounded to whole currency units the way the chart shows
//! them; `None` marks positions where the indicator is not yet defined.

pub mod monthly;

pub use monthly::{monthly_averages, MonthlyAverage};

/// Moving-average windows drawn on the one-year chart.
pub const CHART_MA_WINDOWS: [usize; 3] = [5, 20, 60];

/// Round half up, matching how prices are rounded for display (`-2.5 → -2`).
pub fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

/// Trailing simple moving average over `window` closes.
///
/// Position `i` is `None` until `window` closes are available, then the
/// rounded mean of closes `i + 1 - window ..= i`. A zero window yields no values.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; closes.len()];
    if window == 0 || closes.len() < window {
        return result;
    }

    let mut sum: f64 = closes[..window].iter().sum();
    result[window - 1] = Some(round_half_up(sum / window as f64));

    for i in window..closes.len() {
        sum += closes[i] - closes[i - window];
        result[i] = Some(round_half_up(sum / window as f64));
    }

    result
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ma3_over_one_to_five() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn window_longer_than_series_is_all_none() {
        assert_eq!(moving_average(&[1.0, 2.0], 5), vec![None, None]);
        assert!(moving_average(&[], 5).is_empty());
    }

    #[test]
    fn window_zero_is_all_none() {
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn window_one_is_rounded_close() {
        assert_eq!(
            moving_average(&[100.4, 100.5, 99.5], 1),
            vec![Some(100.0), Some(101.0), Some(100.0)]
        );
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(2.49), 2.0);
    }

    #[test]
    fn mean_rounds_to_whole_units() {
        // (10 + 11) / 2 = 10.5 → 11
        assert_eq!(moving_average(&[10.0, 11.0], 2), vec![None, Some(11.0)]);
    }
}
