//! Price chart series for the two render modes.
//!
//! `1y` plots daily closes with 5/20/60-day moving averages. `forecast` plots
//! monthly average closes and, when all three AI targets are usable, a dashed
//! forward path that starts on the last historical bucket.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{PriceForecast, PricePoint};
use crate::forecast::{forecast_path, ForecastTargets, FORECAST_HORIZON_MONTHS};
use crate::indicators::monthly::monthly_averages;
use crate::indicators::{moving_average, CHART_MA_WINDOWS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartMode {
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "forecast")]
    Forecast,
}

impl ChartMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartMode::OneYear => "1y",
            ChartMode::Forecast => "forecast",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ChartMode::OneYear => ChartMode::Forecast,
            ChartMode::Forecast => ChartMode::OneYear,
        }
    }
}

impl fmt::Display for ChartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(ChartMode::OneYear),
            "forecast" => Ok(ChartMode::Forecast),
            other => Err(format!("unknown chart mode '{other}' (expected 1y or forecast)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Close,
    MovingAverage(usize),
    Forecast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub label: String,
    pub kind: SeriesKind,
    /// One value per label; `None` leaves a gap.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub mode: ChartMode,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
    /// Disclaimer under the chart is shown only with a forecast overlay.
    pub show_disclaimer: bool,
}

impl ChartView {
    /// Min and max over every plotted value.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    pub fn series(&self, kind: SeriesKind) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Build the chart for `mode`. Empty history (or, in forecast mode, history
/// with no parseable dates) yields `None`: there is nothing to draw.
pub fn build_chart(
    mode: ChartMode,
    history: &[PricePoint],
    forecast: Option<&PriceForecast>,
) -> Option<ChartView> {
    if history.is_empty() {
        return None;
    }
    match mode {
        ChartMode::OneYear => Some(one_year_chart(history)),
        ChartMode::Forecast => forecast_chart(history, forecast),
    }
}

fn one_year_chart(history: &[PricePoint]) -> ChartView {
    let labels = history.iter().map(|p| p.date.clone()).collect();
    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();

    let mut series = vec![ChartSeries {
        label: "종가".to_string(),
        kind: SeriesKind::Close,
        values: closes.iter().copied().map(Some).collect(),
    }];
    for window in CHART_MA_WINDOWS {
        series.push(ChartSeries {
            label: format!("{window}일선"),
            kind: SeriesKind::MovingAverage(window),
            values: moving_average(&closes, window),
        });
    }

    ChartView {
        mode: ChartMode::OneYear,
        labels,
        series,
        show_disclaimer: false,
    }
}

fn forecast_chart(history: &[PricePoint], forecast: Option<&PriceForecast>) -> Option<ChartView> {
    let months = monthly_averages(history);
    let last = months.last()?;
    let targets = forecast.and_then(ForecastTargets::from_forecast);

    let mut labels: Vec<String> = months.iter().map(|m| m.month.to_string()).collect();
    let mut actual: Vec<Option<f64>> = months.iter().map(|m| Some(m.average)).collect();
    let mut series = Vec::with_capacity(2);

    if let Some(targets) = targets {
        let horizon = FORECAST_HORIZON_MONTHS as usize;
        labels.extend((1..=FORECAST_HORIZON_MONTHS).map(|n| last.month.plus_months(n).to_string()));
        actual.extend(std::iter::repeat(None).take(horizon));

        let mut projected: Vec<Option<f64>> = vec![None; months.len() - 1];
        projected.push(Some(last.average));
        projected.extend(forecast_path(last.average, &targets).into_iter().map(Some));

        series.push(ChartSeries {
            label: "실제 주가".to_string(),
            kind: SeriesKind::Close,
            values: actual,
        });
        series.push(ChartSeries {
            label: "AI 예측".to_string(),
            kind: SeriesKind::Forecast,
            values: projected,
        });
    } else {
        series.push(ChartSeries {
            label: "실제 주가".to_string(),
            kind: SeriesKind::Close,
            values: actual,
        });
    }

    Some(ChartView {
        mode: ChartMode::Forecast,
        labels,
        show_disclaimer: targets.is_some(),
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::daily_history;

    fn forecast(three: f64, six: f64, twelve: f64) -> PriceForecast {
        PriceForecast {
            three_month: Some(three),
            six_month: Some(six),
            twelve_month: Some(twelve),
            ..PriceForecast::default()
        }
    }

    #[test]
    fn empty_history_draws_nothing() {
        assert!(build_chart(ChartMode::OneYear, &[], None).is_none());
        assert!(build_chart(ChartMode::Forecast, &[], None).is_none());
    }

    #[test]
    fn one_year_has_close_and_three_averages() {
        let closes: Vec<f64> = (1..=70).map(|i| i as f64).collect();
        let chart = build_chart(ChartMode::OneYear, &daily_history(&closes), None).unwrap();
        assert_eq!(chart.len(), 70);
        let labels: Vec<&str> = chart.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["종가", "5일선", "20일선", "60일선"]);

        let ma60 = chart.series(SeriesKind::MovingAverage(60)).unwrap();
        assert!(ma60.values[58].is_none());
        assert_eq!(ma60.values[59], Some(31.0)); // mean of 1..=60 is 30.5
        assert!(!chart.show_disclaimer);
    }

    #[test]
    fn forecast_joins_the_last_bucket() {
        let history = vec![
            PricePoint::new("2024-01-15", 90.0),
            PricePoint::new("2024-02-15", 100.0),
        ];
        let chart = build_chart(
            ChartMode::Forecast,
            &history,
            Some(&forecast(130.0, 160.0, 220.0)),
        )
        .unwrap();

        assert_eq!(chart.len(), 2 + 12);
        assert_eq!(chart.labels[1], "2024-02");
        assert_eq!(chart.labels[2], "2024-03");
        assert_eq!(chart.labels[13], "2025-02");

        let actual = chart.series(SeriesKind::Close).unwrap();
        assert_eq!(actual.values[1], Some(100.0));
        assert!(actual.values[2..].iter().all(Option::is_none));

        let projected = chart.series(SeriesKind::Forecast).unwrap();
        assert_eq!(projected.values[0], None);
        assert_eq!(projected.values[1], Some(100.0));
        assert_eq!(projected.values[2], Some(110.0));
        assert_eq!(projected.values[4], Some(130.0));
        assert_eq!(projected.values[10], Some(190.0));
        assert_eq!(projected.values[13], Some(220.0));
        assert!(chart.show_disclaimer);
    }

    #[test]
    fn missing_target_suppresses_overlay() {
        let history = vec![PricePoint::new("2024-02-15", 100.0)];
        let mut partial = forecast(130.0, 160.0, 220.0);
        partial.six_month = None;
        let chart = build_chart(ChartMode::Forecast, &history, Some(&partial)).unwrap();
        assert_eq!(chart.len(), 1);
        assert_eq!(chart.series.len(), 1);
        assert!(chart.series(SeriesKind::Forecast).is_none());
        assert!(!chart.show_disclaimer);
    }

    #[test]
    fn mode_names() {
        assert_eq!("1y".parse::<ChartMode>().unwrap(), ChartMode::OneYear);
        assert_eq!("Forecast".parse::<ChartMode>().unwrap(), ChartMode::Forecast);
        assert!("5y".parse::<ChartMode>().is_err());
        assert_eq!(serde_json::to_string(&ChartMode::OneYear).unwrap(), "\"1y\"");
        assert_eq!(ChartMode::OneYear.toggled(), ChartMode::Forecast);
    }

    #[test]
    fn bounds_ignore_gaps() {
        let history = daily_history(&[10.0, 30.0, 20.0, 25.0, 15.0]);
        let chart = build_chart(ChartMode::OneYear, &history, None).unwrap();
        assert_eq!(chart.y_bounds(), Some((10.0, 30.0)));
    }
}
