//! One-line status bar: key hints, credits, latest status message.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use kora_core::PipelineState;

use crate::app::{AppState, Focus, Screen, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans = vec![Span::styled(format!(" {} ", key_hints(app)), theme::muted())];

    if let Some(remaining) = app.credits {
        spans.push(Span::styled(format!("│ 크레딧 {remaining:.0} "), theme::secondary()));
    }
    spans.push(Span::styled(
        format!("│ {} ", state_label(app.pipeline_state)),
        theme::secondary(),
    ));

    if let Some((message, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(format!("│ {message}"), style));
    }

    let bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    f.render_widget(bar, area);
}

fn key_hints(app: &AppState) -> &'static str {
    match (app.screen, app.focus) {
        (Screen::Selection, _) => "Enter 보고서  Tab 이동  Esc 종료",
        (Screen::Report, Focus::Chat) => "Enter 전송  Esc 보고서로",
        (Screen::Report, Focus::Report) => "c 차트  p 내보내기  s 상담창  i 질문  r 재실행  b 뒤로  q 종료",
    }
}

fn state_label(state: PipelineState) -> String {
    match state {
        PipelineState::Idle => "대기".to_string(),
        PipelineState::Loading(stage) => format!("{} {}%", stage.label(), stage.percent()),
        PipelineState::Ready => "완료".to_string(),
        PipelineState::Failed => "실패".to_string(),
    }
}
