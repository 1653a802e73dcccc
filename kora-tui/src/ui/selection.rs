//! Company selection form and recent companies.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, FormField};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_form(f, cols[0], app);
    render_recent(f, cols[1], app);
}

fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(" 기업 선택 ")
        .title_style(theme::panel_title(true));

    let mut lines = vec![Line::from("")];
    for field in FormField::ALL {
        let focused = field == app.form.focus;
        let marker = if focused { "▶ " } else { "  " };
        let value = app.form.field(field);
        let value_style = if focused { theme::accent_bold() } else { theme::text() };
        let mut spans = vec![
            Span::styled(marker, theme::accent()),
            Span::styled(format!("{:<6} ", field.label()), theme::secondary()),
            Span::styled(value.to_string(), value_style),
        ];
        if focused {
            spans.push(Span::styled("_", theme::accent()));
        }
        lines.push(Line::from(spans));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "[Enter] report  [Tab] next field  [PgUp/PgDn] recent  [Esc] quit",
        theme::muted(),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_recent(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(" 최근 조회 ")
        .title_style(theme::panel_title(false));

    let lines: Vec<Line> = if app.recent.is_empty() {
        vec![Line::from(Span::styled("조회 기록이 없습니다.", theme::muted()))]
    } else {
        app.recent
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let style = if app.form.recent_cursor == Some(i) {
                    theme::accent_bold()
                } else {
                    theme::secondary()
                };
                Line::from(vec![
                    Span::styled(format!("{:>2}. ", i + 1), theme::muted()),
                    Span::styled(format!("{} ({}, {})", c.name, c.ticker, c.market), style),
                ])
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}
