//! KORA Runner — report pipeline orchestration on top of `kora-core`.
//!
//! This crate provides:
//! - The backend contract and its HTTP client (collect, analyze, answer, save, chat)
//! - The sequential report pipeline with per-step failure policy
//! - Loading-message rotation and the single-instance chart slot
//! - The chat sidebar session with correlated replies
//! - Client configuration from TOML and environment
//! - Markdown export of a finished report

pub mod backend;
pub mod chart_slot;
pub mod chat;
pub mod config;
pub mod export;
pub mod pipeline;
pub mod sink;
pub mod ticker;

pub use backend::{
    AnswerRequest, BackendError, ChatRequest, CollectRequest, Endpoint, HttpBackend,
    ReportBackend, SaveReceipt, SaveRequest,
};
pub use chart_slot::{ChartInstance, ChartSlot};
pub use chat::{ChatMessage, ChatSession, PendingReply, Speaker};
pub use config::{ClientConfig, ConfigError, LoadingConfig};
pub use export::{export_file_name, with_chrome_hidden, write_report, ExportChrome, ExportError};
pub use pipeline::{
    report_context_json, PipelineError, ReportPipeline, RunSummary, RunToken, SaveOutcome,
    StepOutcome,
};
pub use sink::{CancelGate, NullSink, PipelineEvent, RecordingSink, ReportSink};
pub use ticker::LoadingTicker;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn pipeline_is_send() {
        assert_send::<ReportPipeline>();
    }

    #[test]
    fn http_backend_is_send_sync() {
        assert_send::<HttpBackend>();
        assert_sync::<HttpBackend>();
    }

    #[test]
    fn events_are_send_sync() {
        assert_send::<PipelineEvent>();
        assert_sync::<PipelineEvent>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ClientConfig>();
        assert_sync::<ClientConfig>();
        assert_send::<LoadingConfig>();
        assert_sync::<LoadingConfig>();
    }

    #[test]
    fn run_token_is_send_sync() {
        assert_send::<RunToken>();
        assert_sync::<RunToken>();
    }

    #[test]
    fn chat_session_is_send_sync() {
        assert_send::<ChatSession>();
        assert_sync::<ChatSession>();
    }
}
