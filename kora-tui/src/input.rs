//! Keyboard input dispatch — alert → global keys → screen-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use kora_core::PipelineState;

use crate::app::{AppState, Focus, Screen};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. An alert blocks everything until dismissed.
    if app.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.alert = None;
        }
        return;
    }

    // 2. Global keys.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return;
    }

    // 3. Screen-specific keys.
    match app.screen {
        Screen::Selection => handle_selection_key(app, key),
        Screen::Report => match app.focus {
            Focus::Chat => handle_chat_key(app, key),
            Focus::Report => handle_report_key(app, key),
        },
    }
}

fn handle_selection_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.running = false,
        KeyCode::Tab | KeyCode::Down => {
            app.form.recent_cursor = None;
            app.form.focus = app.form.focus.next();
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.form.recent_cursor = None;
            app.form.focus = app.form.focus.prev();
        }
        KeyCode::PageDown => {
            if !app.recent.is_empty() {
                let next = app.form.recent_cursor.map_or(0, |i| (i + 1) % app.recent.len());
                app.form.recent_cursor = Some(next);
                let company = app.recent[next].clone();
                app.form.fill_from(&company);
            }
        }
        KeyCode::PageUp => {
            if !app.recent.is_empty() {
                let len = app.recent.len();
                let prev = app.form.recent_cursor.map_or(len - 1, |i| (i + len - 1) % len);
                app.form.recent_cursor = Some(prev);
                let company = app.recent[prev].clone();
                app.form.fill_from(&company);
            }
        }
        KeyCode::Enter => app.start_report(),
        KeyCode::Backspace => {
            let focus = app.form.focus;
            app.form.field_mut(focus).pop();
        }
        KeyCode::Char(c) => {
            let focus = app.form.focus;
            app.form.field_mut(focus).push(c);
        }
        _ => {}
    }
}

fn handle_report_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Esc | KeyCode::Char('b') => app.back_to_selection(),
        KeyCode::Char('c') => app.toggle_chart(),
        KeyCode::Char('p') => app.export(),
        KeyCode::Char('s') => app.chrome.sidebar_visible = !app.chrome.sidebar_visible,
        KeyCode::Char('r') => {
            if app.pipeline_state.is_terminal() || app.pipeline_state == PipelineState::Idle {
                app.start_report();
            }
        }
        KeyCode::Tab | KeyCode::Char('i') => {
            if app.chrome.sidebar_visible {
                app.focus = Focus::Chat;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.report.scroll = app.report.scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.report.scroll = app.report.scroll.saturating_sub(1);
        }
        KeyCode::PageDown => app.report.scroll = app.report.scroll.saturating_add(10),
        KeyCode::PageUp => app.report.scroll = app.report.scroll.saturating_sub(10),
        KeyCode::Home => app.report.scroll = 0,
        _ => {}
    }
}

fn handle_chat_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Tab => app.focus = Focus::Report,
        KeyCode::Enter => app.send_chat(),
        KeyCode::Backspace => {
            app.chat_input.pop();
        }
        KeyCode::Char(c) => app.chat_input.push(c),
        _ => {}
    }
}
