//! Piecewise-linear forward path to the 3/6/12-month AI price targets.
//!
//! Months 1-3 run from the last known price to the 3-month target, months 4-6
//! from the 3-month to the 6-month target, and months 7-12 from the 6-month to
//! the 12-month target.

use crate::domain::PriceForecast;
use crate::indicators::round_half_up;

pub const FORECAST_HORIZON_MONTHS: u32 = 12;

/// The three targets, present only when all of them are usable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastTargets {
    pub three_month: f64,
    pub six_month: f64,
    pub twelve_month: f64,
}

impl ForecastTargets {
    /// A missing, zero or negative target suppresses the whole overlay.
    pub fn from_forecast(forecast: &PriceForecast) -> Option<Self> {
        let usable = |v: Option<f64>| v.filter(|x| x.is_finite() && *x > 0.0);
        Some(Self {
            three_month: usable(forecast.three_month)?,
            six_month: usable(forecast.six_month)?,
            twelve_month: usable(forecast.twelve_month)?,
        })
    }
}

/// Forecast price `month` months ahead (1..=12), rounded.
pub fn interpolate(last_price: f64, targets: &ForecastTargets, month: u32) -> f64 {
    let m = month.clamp(1, FORECAST_HORIZON_MONTHS) as f64;
    let price = if m <= 3.0 {
        last_price + (targets.three_month - last_price) * (m / 3.0)
    } else if m <= 6.0 {
        targets.three_month + (targets.six_month - targets.three_month) * ((m - 3.0) / 3.0)
    } else {
        targets.six_month + (targets.twelve_month - targets.six_month) * ((m - 6.0) / 6.0)
    };
    round_half_up(price)
}

/// Forecast prices for months 1 through 12.
pub fn forecast_path(last_price: f64, targets: &ForecastTargets) -> Vec<f64> {
    (1..=FORECAST_HORIZON_MONTHS)
        .map(|m| interpolate(last_price, targets, m))
        .collect()
}
