//! Chat sidebar: transcript plus input line.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use kora_runner::{ChatMessage, Speaker};

use crate::app::{AppState, Focus};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let active = app.focus == Focus::Chat;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(" AI 상담 ")
        .title_style(theme::panel_title(active));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    let lines = transcript_lines(app.chat.messages());
    // Keep the newest messages in view.
    let skip = scroll_offset(lines.len(), rows[0].height);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).scroll((skip, 0)),
        rows[0],
    );

    let prompt_style = if active { theme::accent_bold() } else { theme::muted() };
    let mut input = vec![
        Span::styled("> ", prompt_style),
        Span::styled(app.chat_input.clone(), theme::text()),
    ];
    if active {
        input.push(Span::styled("_", theme::accent()));
    }
    let input_block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme::muted());
    f.render_widget(Paragraph::new(Line::from(input)).block(input_block), rows[1]);
}

/// Rows to scroll so the last line sits at the bottom; saturates at `u16::MAX`.
fn scroll_offset(line_count: usize, height: u16) -> u16 {
    u16::try_from(line_count.saturating_sub(usize::from(height))).unwrap_or(u16::MAX)
}

pub fn transcript_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    if messages.is_empty() {
        return vec![Line::from(Span::styled(
            "보고서에 대해 질문해 보세요.",
            theme::muted(),
        ))];
    }
    let mut lines = Vec::with_capacity(messages.len() * 2);
    for m in messages {
        let (who, who_style) = match m.speaker {
            Speaker::User => ("나", theme::accent_bold()),
            Speaker::Bot => ("KORA", theme::positive()),
        };
        let body_style = if m.pending {
            theme::muted().add_modifier(Modifier::ITALIC)
        } else {
            theme::text()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{who}: "), who_style),
            Span::styled(m.text.clone(), body_style),
        ]));
    }
    lines
}
