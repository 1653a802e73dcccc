//! Background worker thread — the report pipeline runs here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. The worker
//! owns the `ReportPipeline`; pipeline events are forwarded to the UI as they
//! are emitted. Chat requests run on their own short-lived threads so replies
//! can arrive in any order.
//!
//! Every run carries a run id chosen by the UI. Pipeline events and the
//! final `RunFinished` are tagged with it so the UI can drop anything that
//! belongs to a run it has already replaced.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use kora_core::view::ChartMode;
use kora_core::CompanyRef;
use kora_runner::{
    write_report, BackendError, ChatRequest, LoadingConfig, PipelineError, PipelineEvent,
    ReportBackend, ReportPipeline, ReportSink, RunSummary, RunToken,
};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Run {
        run_id: u64,
        company: CompanyRef,
        token: RunToken,
    },
    ToggleChart(ChartMode),
    Chat {
        id: u64,
        request: ChatRequest,
    },
    Export {
        dir: PathBuf,
        generated: NaiveDateTime,
        reply: Sender<Result<PathBuf, String>>,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Event {
        run_id: u64,
        event: PipelineEvent,
    },
    RunFinished {
        run_id: u64,
        summary: Option<Box<RunSummary>>,
        /// JSON context for chat; set whenever a company was loaded.
        report_context: Option<String>,
    },
    ChatReply {
        id: u64,
        result: Result<String, BackendError>,
    },
}

/// Forwards pipeline events to the UI thread, tagged with the run they belong to.
struct ChannelSink {
    tx: Sender<WorkerResponse>,
    run_id: Arc<AtomicU64>,
}

impl ReportSink for ChannelSink {
    fn emit(&self, event: PipelineEvent) {
        let run_id = self.run_id.load(Ordering::SeqCst);
        let _ = self.tx.send(WorkerResponse::Event { run_id, event });
    }
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    backend: Arc<dyn ReportBackend>,
    loading: LoadingConfig,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("kora-worker".into())
        .spawn(move || {
            let run_id = Arc::new(AtomicU64::new(0));
            let sink = Arc::new(ChannelSink {
                tx: tx.clone(),
                run_id: Arc::clone(&run_id),
            });
            let mut pipeline = ReportPipeline::new(backend, sink, loading);
            worker_loop(&mut pipeline, &run_id, rx, tx);
        })
}

fn worker_loop(
    pipeline: &mut ReportPipeline,
    run_id: &AtomicU64,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => handle_command(pipeline, run_id, cmd, &tx),
        }
    }
    debug!("worker stopped");
}

fn handle_command(
    pipeline: &mut ReportPipeline,
    current_run: &AtomicU64,
    cmd: WorkerCommand,
    tx: &Sender<WorkerResponse>,
) {
    match cmd {
        WorkerCommand::Run {
            run_id,
            company,
            token,
        } => {
            current_run.store(run_id, Ordering::SeqCst);
            let result = pipeline.run(company, &token);
            let report_context = pipeline.company().map(|_| pipeline.report_context());
            let summary = match result {
                Ok(summary) => Some(Box::new(summary)),
                Err(PipelineError::Cancelled) => None,
                Err(e) => {
                    warn!(error = %e, "report run failed");
                    None
                }
            };
            let _ = tx.send(WorkerResponse::RunFinished {
                run_id,
                summary,
                report_context,
            });
        }
        WorkerCommand::ToggleChart(mode) => pipeline.toggle_chart_mode(mode),
        WorkerCommand::Chat { id, request } => spawn_chat(pipeline.backend(), id, request, tx.clone()),
        WorkerCommand::Export {
            dir,
            generated,
            reply,
        } => {
            let result = write_report(&dir, pipeline, generated).map_err(|e| e.to_string());
            let _ = reply.send(result);
        }
        WorkerCommand::Shutdown => {} // handled in loop
    }
}

fn spawn_chat(backend: Arc<dyn ReportBackend>, id: u64, request: ChatRequest, tx: Sender<WorkerResponse>) {
    let spawned = thread::Builder::new()
        .name(format!("kora-chat-{id}"))
        .spawn(move || {
            let result = backend.chat(&request);
            let _ = tx.send(WorkerResponse::ChatReply { id, result });
        });
    if let Err(e) = spawned {
        warn!(id, error = %e, "could not spawn chat thread");
    }
}
