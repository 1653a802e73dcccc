//! The report pipeline: collect → base facts → analyze → chart → answer →
//! save → reveal.
//!
//! Steps run strictly in sequence on the calling thread. Each step owns its
//! failure policy:
//! - collect failure is fatal: overlay hidden, alert shown, state `Failed`
//! - analyze failure is degraded: AI sections keep their placeholders
//! - answer and save failures are soft: logged, the report still reveals
//!
//! All state lives in one `ReportPipeline` per page. A session-scoped save
//! guard keeps `save` to at most one call per company.

use crate::backend::{AnswerRequest, BackendError, CollectRequest, ReportBackend, SaveRequest};
use crate::chart_slot::ChartSlot;
use crate::config::LoadingConfig;
use crate::sink::{CancelGate, PipelineEvent, ReportSink};
use crate::ticker::LoadingTicker;
use kora_core::domain::CompanyError;
use kora_core::view::{build_chart, Section};
use kora_core::{
    AiAnalysis, AnalysisView, BaseFactsView, ChartMode, CompanyRef, LoadingStage, PipelineState,
    ReportData,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ALERT_PREFIX: &str = "보고서 생성 중 오류가 발생했습니다: ";
pub const MISSING_COMPANY_ALERT: &str = "기업 정보가 없습니다. 기업을 다시 선택해주세요.";
pub const ANSWER_FAILED: &str = "답변을 생성하지 못했습니다. 잠시 후 다시 시도해주세요.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing company reference: {0}")]
    MissingCompany(#[from] CompanyError),

    #[error("data collection failed: {0}")]
    Collect(#[source] BackendError),

    #[error("run cancelled")]
    Cancelled,
}

/// Cancellation handle for one `run`. Checked between steps; a cancelled run
/// stops silently and emits nothing further.
#[derive(Debug, Clone, Default)]
pub struct RunToken(Arc<AtomicBool>);

impl RunToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Completed,
    Failed(String),
}

impl StepOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepOutcome::Completed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved { credits_remaining: Option<f64> },
    Failed(String),
    /// The save guard already saw this company in this session.
    AlreadySaved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub company: String,
    pub analysis: StepOutcome,
    /// `None` when there was no request text.
    pub answer: Option<StepOutcome>,
    pub save: SaveOutcome,
    pub chart_rendered: bool,
    pub elapsed: Duration,
}

pub struct ReportPipeline {
    backend: Arc<dyn ReportBackend>,
    sink: Arc<dyn ReportSink>,
    loading: LoadingConfig,
    state: PipelineState,
    company: Option<CompanyRef>,
    report_data: Option<ReportData>,
    analysis: Option<AiAnalysis>,
    answer: Option<String>,
    chart_mode: ChartMode,
    chart: ChartSlot,
    saved: HashSet<String>,
}

impl ReportPipeline {
    pub fn new(
        backend: Arc<dyn ReportBackend>,
        sink: Arc<dyn ReportSink>,
        loading: LoadingConfig,
    ) -> Self {
        Self {
            backend,
            sink,
            loading,
            state: PipelineState::Idle,
            company: None,
            report_data: None,
            analysis: None,
            answer: None,
            chart_mode: ChartMode::default(),
            chart: ChartSlot::new(),
            saved: HashSet::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn company(&self) -> Option<&CompanyRef> {
        self.company.as_ref()
    }

    pub fn report_data(&self) -> Option<&ReportData> {
        self.report_data.as_ref()
    }

    pub fn analysis(&self) -> Option<&AiAnalysis> {
        self.analysis.as_ref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn chart_mode(&self) -> ChartMode {
        self.chart_mode
    }

    pub fn chart(&self) -> &ChartSlot {
        &self.chart
    }

    pub fn backend(&self) -> Arc<dyn ReportBackend> {
        Arc::clone(&self.backend)
    }

    /// Base facts for the current data, if collected.
    pub fn base_facts(&self) -> Option<BaseFactsView> {
        let company = self.company.as_ref()?;
        let data = self.report_data.as_ref()?;
        Some(BaseFactsView::build(company, data))
    }

    pub fn analysis_view(&self) -> Option<AnalysisView> {
        let analysis = self.analysis.as_ref()?;
        let current = self.report_data.as_ref().and_then(|d| d.current_price());
        Some(AnalysisView::build(analysis, current))
    }

    /// `report_context` sent with chat and answer calls: a JSON string with
    /// the company name and the analysis (or `null`).
    pub fn report_context(&self) -> String {
        let company = self.company.as_ref().map(|c| c.name.as_str()).unwrap_or("");
        report_context_json(company, self.analysis.as_ref().map(|a| a.raw()))
    }

    /// Run the whole pipeline for `company`.
    ///
    /// Every event of this run, including the loading ticker and the chart
    /// slot, goes through a gate tied to `token`: once the token is cancelled
    /// nothing more is emitted, even from a request already in flight.
    pub fn run(&mut self, company: CompanyRef, token: &RunToken) -> Result<RunSummary, PipelineError> {
        let outer = Arc::clone(&self.sink);
        self.sink = Arc::new(CancelGate::new(Arc::clone(&outer), token.clone()));
        let result = self.run_steps(company, token);
        self.sink = outer;
        result
    }

    fn run_steps(&mut self, company: CompanyRef, token: &RunToken) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();

        if let Err(e) = company.validate() {
            warn!(error = %e, "report requested without a company reference");
            self.emit(PipelineEvent::Alert {
                message: MISSING_COMPANY_ALERT.to_string(),
            });
            self.emit(PipelineEvent::RedirectToSelection);
            return Err(PipelineError::MissingCompany(e));
        }

        info!(company = %company.name, ticker = %company.ticker, "report run started");
        self.company = Some(company.clone());
        self.report_data = None;
        self.analysis = None;
        self.answer = None;

        self.emit(PipelineEvent::LoadingShown);
        let mut ticker = LoadingTicker::start(Arc::clone(&self.sink), self.loading.message_interval());

        // Step 2: collect (fatal on failure)
        self.enter_stage(LoadingStage::CollectingData, &ticker);
        let step_started = Instant::now();
        let request = CollectRequest {
            company_name: company.name.clone(),
            ticker: company.ticker.clone(),
            corp_code: company.corp_code.clone(),
        };
        let data = match self.backend.collect(&request) {
            Ok(data) => data,
            Err(e) => {
                warn!(company = %company.name, step = "collect", error = %e, "data collection failed");
                drop(ticker);
                checkpoint(token)?;
                self.emit(PipelineEvent::LoadingHidden);
                self.emit(PipelineEvent::Alert {
                    message: format!("{ALERT_PREFIX}{e}"),
                });
                self.set_state(PipelineState::Failed);
                return Err(PipelineError::Collect(e));
            }
        };
        info!(step = "collect", elapsed_ms = elapsed_ms(step_started), "data collected");
        checkpoint(token)?;

        self.emit(PipelineEvent::BaseFactsRendered(Box::new(BaseFactsView::build(
            &company, &data,
        ))));
        let current_price = data.current_price();
        self.report_data = Some(data);

        // Step 3: analyze (degraded on failure)
        self.enter_stage(LoadingStage::Analyzing, &ticker);
        let step_started = Instant::now();
        let analyzed = self.analyze();
        checkpoint(token)?;
        let analysis_outcome = match analyzed {
            Ok(analysis) => {
                self.emit(PipelineEvent::AnalysisRendered(Box::new(AnalysisView::build(
                    &analysis,
                    current_price,
                ))));
                self.analysis = Some(analysis);
                info!(step = "analyze", elapsed_ms = elapsed_ms(step_started), "analysis rendered");
                StepOutcome::Completed
            }
            Err(e) => {
                warn!(company = %company.name, step = "analyze", error = %e, "analysis failed; AI sections skipped");
                self.emit(PipelineEvent::AnalysisSkipped {
                    reason: e.to_string(),
                });
                StepOutcome::Failed(e.to_string())
            }
        };
        checkpoint(token)?;

        // Step 4: chart
        self.enter_stage(LoadingStage::RenderingChart, &ticker);
        self.render_chart();
        let chart_rendered = self.chart.current().is_some();
        debug!(step = "chart", rendered = chart_rendered, mode = %self.chart_mode);
        checkpoint(token)?;

        // Step 5: free-text answer (soft)
        let answer_outcome = match company.request() {
            Some(text) => Some(self.request_answer(&company, text)),
            None => None,
        };
        checkpoint(token)?;

        // Step 6: save and deduct credits (soft, guarded)
        self.enter_stage(LoadingStage::Finishing, &ticker);
        let save_outcome = self.save(&company);
        checkpoint(token)?;

        // Step 7: reveal
        pause(self.loading.settle());
        ticker.finish();
        drop(ticker);
        self.emit(PipelineEvent::LoadingHidden);
        self.set_state(PipelineState::Ready);
        self.emit(PipelineEvent::PdfEnabled);
        let has_answer = answer_outcome.is_some();
        for section in Section::ALL {
            if section == Section::RequestAnswer && !has_answer {
                continue;
            }
            self.emit(PipelineEvent::SectionRevealed(section));
            pause(self.loading.reveal_delay());
        }

        let elapsed = started.elapsed();
        info!(
            company = %company.name,
            elapsed_ms = elapsed.as_millis() as u64,
            analysis = analysis_outcome.is_completed(),
            "report ready"
        );

        Ok(RunSummary {
            company: company.name,
            analysis: analysis_outcome,
            answer: answer_outcome,
            save: save_outcome,
            chart_rendered,
            elapsed,
        })
    }

    /// Switch chart mode and redraw from stored data. No network call.
    pub fn toggle_chart_mode(&mut self, mode: ChartMode) {
        self.chart_mode = mode;
        self.emit(PipelineEvent::ChartModeChanged(mode));
        self.render_chart();
    }

    /// Destroy the current chart and draw a fresh one for the current mode.
    pub fn render_chart(&mut self) {
        let forecast = self.analysis.as_ref().map(|a| &a.price_forecast);
        let view = self
            .report_data
            .as_ref()
            .and_then(|d| build_chart(self.chart_mode, d.price_history(), forecast));
        self.chart.render(view, self.sink.as_ref());
    }

    fn analyze(&self) -> Result<AiAnalysis, BackendError> {
        match self.report_data.as_ref() {
            Some(data) => self.backend.analyze(data),
            None => Err(BackendError::Decode("no report data to analyze".into())),
        }
    }

    fn request_answer(&mut self, company: &CompanyRef, text: &str) -> StepOutcome {
        self.emit(PipelineEvent::AnswerPending);
        let request = AnswerRequest {
            company_name: company.name.clone(),
            request_text: text.to_string(),
            report_context: self.report_context(),
        };
        let (shown, outcome) = match self.backend.answer(&request) {
            Ok(answer) => (answer, StepOutcome::Completed),
            Err(e) => {
                warn!(step = "answer", error = %e, "free-text answer failed");
                (ANSWER_FAILED.to_string(), StepOutcome::Failed(e.to_string()))
            }
        };
        self.answer = Some(shown.clone());
        self.emit(PipelineEvent::AnswerRendered { text: shown });
        outcome
    }

    fn save(&mut self, company: &CompanyRef) -> SaveOutcome {
        let key = company.session_key();
        if !self.saved.insert(key) {
            info!(company = %company.name, "report already saved this session; skipping save");
            return SaveOutcome::AlreadySaved;
        }
        let Some(data) = self.report_data.as_ref() else {
            return SaveOutcome::Failed("no report data".into());
        };

        let request = SaveRequest {
            company_name: company.name.clone(),
            ticker: company.ticker.clone(),
            market: company.market.clone(),
            analysis: self.analysis.as_ref().map(|a| a.raw().clone()),
            raw_data: data.raw().clone(),
        };
        match self.backend.save(&request) {
            Ok(receipt) => {
                info!(step = "save", report_id = ?receipt.report_id, "report saved");
                if let Some(remaining) = receipt.credits_remaining {
                    self.emit(PipelineEvent::CreditsUpdated { remaining });
                }
                SaveOutcome::Saved {
                    credits_remaining: receipt.credits_remaining,
                }
            }
            Err(e) => {
                warn!(step = "save", error = %e, "report save failed");
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    fn enter_stage(&mut self, stage: LoadingStage, ticker: &LoadingTicker) {
        self.set_state(PipelineState::Loading(stage));
        self.emit(PipelineEvent::StageEntered(stage));
        ticker.show(stage.message_index());
    }

    fn set_state(&mut self, state: PipelineState) {
        self.state = state;
        self.emit(PipelineEvent::StateChanged(state));
    }

    fn emit(&self, event: PipelineEvent) {
        self.sink.emit(event);
    }
}

/// Chat/answer context for `company`; `analysis` is `null` until one exists.
pub fn report_context_json(company: &str, analysis: Option<&Value>) -> String {
    json!({ "company": company, "analysis": analysis.cloned().unwrap_or(Value::Null) }).to_string()
}

fn checkpoint(token: &RunToken) -> Result<(), PipelineError> {
    if token.is_cancelled() {
        info!("report run cancelled");
        Err(PipelineError::Cancelled)
    } else {
        Ok(())
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
