//! App state persistence — JSON save/load across restarts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use kora_core::view::ChartMode;
use kora_core::CompanyRef;

use crate::app::AppState;

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub recent_companies: Vec<CompanyRef>,
    pub chart_mode: ChartMode,
    pub chat_sidebar_visible: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            recent_companies: Vec::new(),
            chart_mode: ChartMode::OneYear,
            chat_sidebar_visible: true,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        recent_companies: app.recent.clone(),
        chart_mode: app.report.chart_mode,
        chat_sidebar_visible: app.chrome.sidebar_visible,
    }
}

pub fn apply(app: &mut AppState, state: PersistedState) {
    app.recent = state.recent_companies;
    app.report.chart_mode = state.chart_mode;
    app.chrome.sidebar_visible = state.chat_sidebar_visible;
    if let Some(last) = app.recent.first() {
        app.form.fill_from(last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let state = PersistedState {
            recent_companies: vec![CompanyRef::new("삼성전자", "005930")],
            chart_mode: ChartMode::Forecast,
            chat_sidebar_visible: false,
        };

        save(&path, &state).unwrap();
        let loaded = load(&path);

        assert_eq!(loaded.recent_companies.len(), 1);
        assert_eq!(loaded.chart_mode, ChartMode::Forecast);
        assert!(!loaded.chat_sidebar_visible);
    }

    #[test]
    fn missing_file_returns_defaults() {
        let loaded = load(Path::new("/nonexistent/path/state.json"));
        assert!(loaded.recent_companies.is_empty());
        assert!(loaded.chat_sidebar_visible);
    }

    #[test]
    fn corrupt_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not valid json {{{").unwrap();

        let loaded = load(&path);
        assert!(loaded.recent_companies.is_empty());
    }

    #[test]
    fn chart_mode_is_stored_by_its_label() {
        let json = serde_json::to_string(&PersistedState::default()).unwrap();
        assert!(json.contains("\"1y\""));
    }
}
