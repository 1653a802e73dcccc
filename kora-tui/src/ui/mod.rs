//! Top-level UI layout — report (or selection form), chat sidebar, status bar.

pub mod chart_panel;
pub mod chat_panel;
pub mod loading;
pub mod report_panel;
pub mod selection;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, Focus, Screen};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());
    let main_area = chunks[0];

    match app.screen {
        Screen::Selection => selection::render(f, main_area, app),
        Screen::Report => draw_report_screen(f, main_area, app),
    }

    status_bar::render(f, chunks[1], app);

    if app.screen == Screen::Report && app.chrome.overlay_visible {
        loading::render(f, main_area, app);
    }
    if let Some(message) = &app.alert {
        render_alert(f, main_area, message);
    }
}

fn draw_report_screen(f: &mut Frame, area: Rect, app: &AppState) {
    let (report_area, chat_area) = if app.chrome.sidebar_visible {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(area);
        (cols[0], Some(cols[1]))
    } else {
        (area, None)
    };

    let title = match &app.report.company {
        Some(c) => format!(" {} ({}) AI 투자 분석 보고서 ", c.name, c.ticker),
        None => " AI 투자 분석 보고서 ".to_string(),
    };
    let active = app.focus == Focus::Report;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(title)
        .title_style(theme::panel_title(active));
    let inner = block.inner(report_area);
    f.render_widget(block, report_area);
    report_panel::render(f, inner, app);

    if let Some(chat_area) = chat_area {
        chat_panel::render(f, chat_area, app);
    }
}

fn render_alert(f: &mut Frame, area: Rect, message: &str) {
    let popup = centered_rect(60, 30, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(" 알림 ")
        .title_style(theme::negative());

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, theme::text())),
        Line::from(""),
        Line::from(Span::styled("[Enter] 확인", theme::muted())),
    ];
    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), popup);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
