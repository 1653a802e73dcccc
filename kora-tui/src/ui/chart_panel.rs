//! Price chart — daily closes with moving averages, or monthly averages with
//! the AI forecast path.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Chart, Dataset, GraphType, Paragraph};
use ratatui::Frame;

use kora_core::format::format_price;
use kora_core::view::{ChartMode, ChartSeries, ChartView, SeriesKind};

use crate::theme;

pub fn render(f: &mut Frame, area: Rect, chart: Option<&ChartView>, mode: ChartMode) {
    match chart {
        Some(view) if !view.is_empty() => render_chart(f, area, view),
        _ => render_empty(f, area, mode),
    }
}

fn render_empty(f: &mut Frame, area: Rect, mode: ChartMode) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("주가 데이터가 없습니다 ({mode})"),
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines), area);
}

/// Plot points for the values that exist; gaps are skipped.
pub fn series_points(series: &ChartSeries) -> Vec<(f64, f64)> {
    series
        .values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|y| (i as f64, y)))
        .collect()
}

fn series_color(kind: SeriesKind, index: usize) -> Color {
    match kind {
        SeriesKind::Close => theme::ACCENT,
        SeriesKind::Forecast => theme::WARNING,
        SeriesKind::MovingAverage(_) => match index % 3 {
            0 => theme::POSITIVE,
            1 => theme::NEUTRAL,
            _ => theme::NEGATIVE,
        },
    }
}

fn render_chart(f: &mut Frame, area: Rect, view: &ChartView) {
    let points: Vec<Vec<(f64, f64)>> = view.series.iter().map(series_points).collect();

    let datasets: Vec<Dataset> = view
        .series
        .iter()
        .zip(points.iter())
        .enumerate()
        .map(|(i, (series, data))| {
            let marker = match series.kind {
                SeriesKind::Forecast => symbols::Marker::Dot,
                _ => symbols::Marker::Braille,
            };
            Dataset::default()
                .name(series.label.clone())
                .marker(marker)
                .style(Style::default().fg(series_color(series.kind, i)))
                .graph_type(GraphType::Line)
                .data(data)
        })
        .collect();

    let (y_min, y_max) = view.y_bounds().unwrap_or((0.0, 1.0));
    let padding = ((y_max - y_min).abs() * 0.05).max(1.0);
    let x_max = view.len().saturating_sub(1) as f64;

    let first = view.labels.first().cloned().unwrap_or_default();
    let middle = view.labels.get(view.len() / 2).cloned().unwrap_or_default();
    let last = view.labels.last().cloned().unwrap_or_default();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(middle, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min - padding, y_max + padding])
                .labels(vec![
                    Span::styled(format_price(Some(y_min)), theme::muted()),
                    Span::styled(format_price(Some(y_max)), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_are_skipped_and_indices_kept() {
        let series = ChartSeries {
            label: "AI 예측".into(),
            kind: SeriesKind::Forecast,
            values: vec![None, None, Some(10.0), Some(12.0)],
        };
        assert_eq!(series_points(&series), vec![(2.0, 10.0), (3.0, 12.0)]);
    }

    #[test]
    fn forecast_uses_warning_colour() {
        assert_eq!(series_color(SeriesKind::Forecast, 0), theme::WARNING);
        assert_eq!(series_color(SeriesKind::Close, 0), theme::ACCENT);
    }
}
