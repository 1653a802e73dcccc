//! Render events emitted by the pipeline and the sinks that receive them.
//!
//! The pipeline never draws anything itself. It emits view-model snapshots in
//! the order a page would apply them; adapters subscribe through a
//! [`ReportSink`].

use kora_core::view::{AnalysisView, BaseFactsView, ChartMode, ChartView, Section};
use kora_core::{LoadingStage, PipelineState};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use crate::pipeline::RunToken;

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StateChanged(PipelineState),
    LoadingShown,
    LoadingMessage { index: usize, text: &'static str },
    StageEntered(LoadingStage),
    BaseFactsRendered(Box<BaseFactsView>),
    AnalysisRendered(Box<AnalysisView>),
    /// The analysis step failed; AI sections keep their placeholders.
    AnalysisSkipped { reason: String },
    ChartDestroyed { id: u64 },
    ChartCreated { id: u64, view: Box<ChartView> },
    ChartModeChanged(ChartMode),
    AnswerPending,
    AnswerRendered { text: String },
    CreditsUpdated { remaining: f64 },
    LoadingHidden,
    PdfEnabled,
    SectionRevealed(Section),
    /// Blocking, user-visible failure message.
    Alert { message: String },
    RedirectToSelection,
}

impl PipelineEvent {
    /// Short name for logs and test assertions.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineEvent::StateChanged(_) => "state",
            PipelineEvent::LoadingShown => "loading_shown",
            PipelineEvent::LoadingMessage { .. } => "loading_message",
            PipelineEvent::StageEntered(_) => "stage",
            PipelineEvent::BaseFactsRendered(_) => "base_facts",
            PipelineEvent::AnalysisRendered(_) => "analysis",
            PipelineEvent::AnalysisSkipped { .. } => "analysis_skipped",
            PipelineEvent::ChartDestroyed { .. } => "chart_destroyed",
            PipelineEvent::ChartCreated { .. } => "chart_created",
            PipelineEvent::ChartModeChanged(_) => "chart_mode",
            PipelineEvent::AnswerPending => "answer_pending",
            PipelineEvent::AnswerRendered { .. } => "answer",
            PipelineEvent::CreditsUpdated { .. } => "credits",
            PipelineEvent::LoadingHidden => "loading_hidden",
            PipelineEvent::PdfEnabled => "pdf_enabled",
            PipelineEvent::SectionRevealed(_) => "section",
            PipelineEvent::Alert { .. } => "alert",
            PipelineEvent::RedirectToSelection => "redirect",
        }
    }
}

/// Receiver of pipeline events.
///
/// Takes `&self` so one sink can be shared between the pipeline and the
/// loading ticker thread.
pub trait ReportSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forward events to another thread. A closed receiver drops events silently:
/// the page is gone.
impl ReportSink for mpsc::Sender<PipelineEvent> {
    fn emit(&self, event: PipelineEvent) {
        let _ = self.send(event);
    }
}

/// Discards everything; for headless runs that only want the summary.
pub struct NullSink;

impl ReportSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Passes events through until its run is cancelled, then drops them all.
/// A superseded run can still be mid-request when it is cancelled; nothing it
/// produces afterwards reaches the page.
pub struct CancelGate {
    inner: Arc<dyn ReportSink>,
    token: RunToken,
}

impl CancelGate {
    pub fn new(inner: Arc<dyn ReportSink>, token: RunToken) -> Self {
        Self { inner, token }
    }
}

impl ReportSink for CancelGate {
    fn emit(&self, event: PipelineEvent) {
        if !self.token.is_cancelled() {
            self.inner.emit(event);
        }
    }
}

/// Keeps every event in order.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(PipelineEvent::kind).collect()
    }

    /// Position of the first event of `kind`.
    pub fn position(&self, kind: &str) -> Option<usize> {
        self.kinds().iter().position(|k| *k == kind)
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl ReportSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.emit(PipelineEvent::LoadingShown);
        sink.emit(PipelineEvent::PdfEnabled);
        sink.emit(PipelineEvent::LoadingHidden);
        assert_eq!(sink.kinds(), vec!["loading_shown", "pdf_enabled", "loading_hidden"]);
        assert_eq!(sink.position("loading_hidden"), Some(2));
        sink.clear();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::channel();
        tx.emit(PipelineEvent::PdfEnabled);
        assert_eq!(rx.recv().unwrap(), PipelineEvent::PdfEnabled);
        drop(rx);
        tx.emit(PipelineEvent::PdfEnabled);
    }

    #[test]
    fn cancel_gate_drops_events_after_cancel() {
        let recording = Arc::new(RecordingSink::new());
        let token = RunToken::new();
        let gate = CancelGate::new(recording.clone(), token.clone());
        gate.emit(PipelineEvent::LoadingShown);
        token.cancel();
        gate.emit(PipelineEvent::LoadingHidden);
        assert_eq!(recording.kinds(), vec!["loading_shown"]);
    }
}
