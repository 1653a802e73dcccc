//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels;
//! [`AppState::apply_event`] folds pipeline events into what the UI draws.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chrono::NaiveDateTime;

use kora_core::progress::LOADING_MESSAGES;
use kora_core::view::{AnalysisView, BaseFactsView, ChartMode, ChartView, Section};
use kora_core::{CompanyRef, LoadingStage, PipelineState};
use kora_runner::{
    report_context_json, with_chrome_hidden, ChatSession, ExportChrome, PipelineEvent, RunToken,
};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Company selection form; also the redirect target.
    Selection,
    Report,
}

/// Which pane receives typed keys on the report screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Report,
    Chat,
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Fields of the selection form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Ticker,
    CorpCode,
    Market,
    Request,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Name,
        FormField::Ticker,
        FormField::CorpCode,
        FormField::Market,
        FormField::Request,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Name => "기업명",
            FormField::Ticker => "종목코드",
            FormField::CorpCode => "고유번호",
            FormField::Market => "시장",
            FormField::Request => "요청사항",
        }
    }

    pub fn next(self) -> FormField {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> FormField {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone)]
pub struct SelectionForm {
    pub name: String,
    pub ticker: String,
    pub corp_code: String,
    pub market: String,
    pub request: String,
    pub focus: FormField,
    /// Cursor into the recent-companies list, if the user is browsing it.
    pub recent_cursor: Option<usize>,
}

impl Default for SelectionForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            ticker: String::new(),
            corp_code: String::new(),
            market: kora_core::domain::company::DEFAULT_MARKET.to_string(),
            request: String::new(),
            focus: FormField::Name,
            recent_cursor: None,
        }
    }
}

impl SelectionForm {
    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Ticker => &mut self.ticker,
            FormField::CorpCode => &mut self.corp_code,
            FormField::Market => &mut self.market,
            FormField::Request => &mut self.request,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Ticker => &self.ticker,
            FormField::CorpCode => &self.corp_code,
            FormField::Market => &self.market,
            FormField::Request => &self.request,
        }
    }

    pub fn fill_from(&mut self, company: &CompanyRef) {
        self.name = company.name.clone();
        self.ticker = company.ticker.clone();
        self.corp_code = company.corp_code.clone();
        self.market = company.market.clone();
        self.request = company.request_text.clone().unwrap_or_default();
    }

    pub fn to_company(&self) -> CompanyRef {
        let mut company = CompanyRef::new(self.name.trim(), self.ticker.trim())
            .with_corp_code(self.corp_code.trim());
        if !self.market.trim().is_empty() {
            company = company.with_market(self.market.trim());
        }
        if !self.request.trim().is_empty() {
            company = company.with_request_text(self.request.trim());
        }
        company
    }
}

/// Loading overlay content.
#[derive(Debug, Clone, Default)]
pub struct LoadingOverlay {
    pub message: &'static str,
    pub stage: Option<LoadingStage>,
}

/// Visibility of the transient chrome hidden during export.
#[derive(Debug, Clone, Copy)]
pub struct Chrome {
    pub overlay_visible: bool,
    pub sidebar_visible: bool,
}

impl ExportChrome for Chrome {
    fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }
    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }
    fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }
    fn set_sidebar_visible(&mut self, visible: bool) {
        self.sidebar_visible = visible;
    }
}

/// Everything the report screen draws, rebuilt from pipeline events.
#[derive(Debug, Clone, Default)]
pub struct ReportState {
    pub company: Option<CompanyRef>,
    pub base: Option<BaseFactsView>,
    pub analysis: Option<AnalysisView>,
    pub analysis_note: Option<String>,
    pub chart: Option<ChartView>,
    pub chart_mode: ChartMode,
    pub chart_instance: Option<u64>,
    pub answer: Option<String>,
    pub answer_pending: bool,
    pub revealed: Vec<Section>,
    pub export_enabled: bool,
    pub scroll: u16,
}

/// Top-level application state.
pub struct AppState {
    pub screen: Screen,
    pub focus: Focus,
    pub running: bool,

    pub form: SelectionForm,
    pub recent: Vec<CompanyRef>,

    pub pipeline_state: PipelineState,
    pub loading: LoadingOverlay,
    pub chrome: Chrome,
    pub report: ReportState,
    pub credits: Option<f64>,
    pub chat: ChatSession,
    pub chat_input: String,
    /// Blocking message shown until dismissed.
    pub alert: Option<String>,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub run_token: Option<RunToken>,
    /// Id of the latest run; responses tagged with any other id are stale.
    pub current_run: u64,

    pub status_message: Option<(String, StatusLevel)>,
    pub log_lines: VecDeque<(NaiveDateTime, String)>,

    pub export_dir: PathBuf,
}

const LOG_CAPACITY: usize = 50;
const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

impl AppState {
    pub fn new(worker_tx: Sender<WorkerCommand>, worker_rx: Receiver<WorkerResponse>) -> Self {
        Self {
            screen: Screen::Selection,
            focus: Focus::Report,
            running: true,
            form: SelectionForm::default(),
            recent: Vec::new(),
            pipeline_state: PipelineState::Idle,
            loading: LoadingOverlay::default(),
            chrome: Chrome {
                overlay_visible: false,
                sidebar_visible: true,
            },
            report: ReportState::default(),
            credits: None,
            chat: ChatSession::default(),
            chat_input: String::new(),
            alert: None,
            worker_tx,
            worker_rx,
            run_token: None,
            current_run: 0,
            status_message: None,
            log_lines: VecDeque::with_capacity(LOG_CAPACITY),
            export_dir: PathBuf::from("."),
        }
    }

    /// Start a report for the form's company.
    pub fn start_report(&mut self) {
        let company = self.form.to_company();
        if let Some(token) = self.run_token.take() {
            token.cancel();
        }
        let token = RunToken::new();
        self.report = ReportState {
            company: Some(company.clone()),
            chart_mode: self.report.chart_mode,
            ..ReportState::default()
        };
        self.chat = ChatSession::new(report_context_json(&company.name, None));
        self.screen = Screen::Report;
        self.focus = Focus::Report;
        remember(&mut self.recent, &company);
        self.run_token = Some(token.clone());
        self.current_run += 1;
        let run_id = self.current_run;
        if self
            .worker_tx
            .send(WorkerCommand::Run {
                run_id,
                company,
                token,
            })
            .is_err()
        {
            self.set_error("worker is not running");
        }
    }

    /// Leave the report and cancel any run still in flight.
    pub fn back_to_selection(&mut self) {
        if let Some(token) = self.run_token.take() {
            token.cancel();
        }
        self.chrome.overlay_visible = false;
        self.screen = Screen::Selection;
    }

    pub fn toggle_chart(&mut self) {
        if !self.report.revealed.contains(&Section::PriceChart) {
            return;
        }
        let mode = self.report.chart_mode.toggled();
        let _ = self.worker_tx.send(WorkerCommand::ToggleChart(mode));
    }

    /// Write the markdown export with the overlay and sidebar hidden.
    pub fn export(&mut self) {
        if !self.report.export_enabled {
            self.set_warning("보고서가 아직 준비되지 않았습니다");
            return;
        }
        let (reply_tx, reply_rx) = mpsc::channel();
        let tx = self.worker_tx.clone();
        let dir = self.export_dir.clone();
        let generated = chrono::Local::now().naive_local();

        let result = with_chrome_hidden(&mut self.chrome, || -> Result<PathBuf, String> {
            tx.send(WorkerCommand::Export {
                dir,
                generated,
                reply: reply_tx,
            })
            .map_err(|_| "worker is not running".to_string())?;
            reply_rx
                .recv_timeout(EXPORT_TIMEOUT)
                .map_err(|e| e.to_string())?
        });

        match result {
            Ok(path) => self.set_status(format!("내보내기 완료: {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.set_error(format!("내보내기 실패: {e}"));
            }
        }
    }

    /// Send the chat input. Blank input is ignored.
    pub fn send_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        if let Some(pending) = self.chat.begin(&text) {
            let _ = self.worker_tx.send(WorkerCommand::Chat {
                id: pending.id,
                request: pending.request,
            });
        }
    }

    pub fn handle_worker_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Event { run_id, event } => {
                if run_id == self.current_run {
                    self.apply_event(event);
                } else {
                    tracing::debug!(run_id, current = self.current_run, "dropping stale event");
                }
            }
            WorkerResponse::RunFinished { run_id, .. } if run_id != self.current_run => {
                tracing::debug!(run_id, current = self.current_run, "dropping stale run result");
            }
            WorkerResponse::RunFinished {
                summary,
                report_context,
                ..
            } => {
                if let Some(ctx) = report_context {
                    self.chat.set_context(ctx);
                }
                if let Some(summary) = summary {
                    self.set_status(format!(
                        "{} 보고서 완료 ({:.1}s)",
                        summary.company,
                        summary.elapsed.as_secs_f64()
                    ));
                }
                self.run_token = None;
            }
            WorkerResponse::ChatReply { id, result } => {
                self.chat.resolve(id, result);
            }
        }
    }

    /// Fold one pipeline event into the UI state.
    pub fn apply_event(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StateChanged(state) => self.pipeline_state = state,
            PipelineEvent::LoadingShown => {
                self.chrome.overlay_visible = true;
                self.loading = LoadingOverlay::default();
            }
            PipelineEvent::LoadingMessage { text, .. } => self.loading.message = text,
            PipelineEvent::StageEntered(stage) => self.loading.stage = Some(stage),
            PipelineEvent::BaseFactsRendered(view) => self.report.base = Some(*view),
            PipelineEvent::AnalysisRendered(view) => self.report.analysis = Some(*view),
            PipelineEvent::AnalysisSkipped { reason } => {
                self.push_log(format!("AI 분석 실패: {reason}"));
                self.report.analysis_note = Some(reason);
            }
            PipelineEvent::ChartDestroyed { id } => {
                if self.report.chart_instance == Some(id) {
                    self.report.chart_instance = None;
                    self.report.chart = None;
                }
            }
            PipelineEvent::ChartCreated { id, view } => {
                self.report.chart_instance = Some(id);
                self.report.chart = Some(*view);
            }
            PipelineEvent::ChartModeChanged(mode) => self.report.chart_mode = mode,
            PipelineEvent::AnswerPending => self.report.answer_pending = true,
            PipelineEvent::AnswerRendered { text } => {
                self.report.answer_pending = false;
                self.report.answer = Some(text);
            }
            PipelineEvent::CreditsUpdated { remaining } => self.credits = Some(remaining),
            PipelineEvent::LoadingHidden => self.chrome.overlay_visible = false,
            PipelineEvent::PdfEnabled => self.report.export_enabled = true,
            PipelineEvent::SectionRevealed(section) => {
                if !self.report.revealed.contains(&section) {
                    self.report.revealed.push(section);
                }
            }
            PipelineEvent::Alert { message } => {
                self.push_log(message.clone());
                self.alert = Some(message);
            }
            PipelineEvent::RedirectToSelection => self.back_to_selection(),
        }
    }

    /// Progress gauge value for the overlay.
    pub fn loading_percent(&self) -> u16 {
        u16::from(self.pipeline_state.percent())
    }

    pub fn loading_message(&self) -> &'static str {
        if self.loading.message.is_empty() {
            LOADING_MESSAGES[0]
        } else {
            self.loading.message
        }
    }

    pub fn push_log(&mut self, line: String) {
        self.log_lines
            .push_front((chrono::Local::now().naive_local(), line));
        if self.log_lines.len() > LOG_CAPACITY {
            self.log_lines.pop_back();
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}

const RECENT_LIMIT: usize = 10;

/// Move `company` to the front of the recent list, without its request text.
pub fn remember(recent: &mut Vec<CompanyRef>, company: &CompanyRef) {
    let mut entry = company.clone();
    entry.request_text = None;
    recent.retain(|c| c.session_key() != entry.session_key());
    recent.insert(0, entry);
    recent.truncate(RECENT_LIMIT);
}
