//! Loading overlay — rotating message, stage list and progress gauge.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};
use ratatui::Frame;

use kora_core::LoadingStage;

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(60, 50, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" 보고서 생성 중 ")
        .title_style(theme::accent_bold());
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(LoadingStage::ALL.len() as u16 + 1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let message = Paragraph::new(Line::from(Span::styled(
        app.loading_message(),
        theme::text(),
    )));
    f.render_widget(message, rows[0]);

    let current = app.loading.stage;
    let stages: Vec<Line> = LoadingStage::ALL
        .iter()
        .map(|stage| {
            let (marker, style) = match current {
                Some(c) if *stage < c => ("✓", theme::positive()),
                Some(c) if *stage == c => ("●", theme::accent_bold()),
                _ => ("○", theme::muted()),
            };
            Line::from(vec![
                Span::styled(format!(" {marker} "), style),
                Span::styled(stage.label(), style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(stages), rows[1]);

    let percent = app.loading_percent().min(100);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::ACCENT).bg(theme::MUTED))
        .percent(percent)
        .label(format!("{percent}%"));
    f.render_widget(gauge, rows[2]);
}
