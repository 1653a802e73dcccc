//! Pipeline progress markers and loading-overlay copy.
//!
//! Progress drives UI text only. Correctness comes from running the steps in
//! order, not from inspecting this state.

use serde::{Deserialize, Serialize};

/// Status lines cycled on the loading overlay. The last entry is reserved for
/// the moment loading ends.
pub const LOADING_MESSAGES: [&str; 7] = [
    "보고서를 불러오고 있어요",
    "주가 데이터를 수집하고 있어요",
    "재무 정보를 분석하고 있어요",
    "뉴스를 수집하고 있어요",
    "AI가 분석하고 있어요",
    "보고서를 작성하고 있어요",
    "거의 완료되었어요",
];

/// Index of the message shown once loading is over.
pub const FINAL_MESSAGE_INDEX: usize = LOADING_MESSAGES.len() - 1;

/// Next message in the idle rotation; never lands on the final message.
pub fn next_message_index(current: usize) -> usize {
    (current + 1) % FINAL_MESSAGE_INDEX
}

/// The four discrete stages of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoadingStage {
    CollectingData,
    Analyzing,
    RenderingChart,
    Finishing,
}

impl LoadingStage {
    pub const ALL: [LoadingStage; 4] = [
        LoadingStage::CollectingData,
        LoadingStage::Analyzing,
        LoadingStage::RenderingChart,
        LoadingStage::Finishing,
    ];

    pub fn percent(self) -> u8 {
        match self {
            LoadingStage::CollectingData => 25,
            LoadingStage::Analyzing => 50,
            LoadingStage::RenderingChart => 75,
            LoadingStage::Finishing => 100,
        }
    }

    /// Loading message the overlay jumps to when this stage begins.
    pub fn message_index(self) -> usize {
        match self {
            LoadingStage::CollectingData => 1,
            LoadingStage::Analyzing => 4,
            LoadingStage::RenderingChart | LoadingStage::Finishing => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoadingStage::CollectingData => "KRX/DART/뉴스 데이터 수집",
            LoadingStage::Analyzing => "AI 종합 분석",
            LoadingStage::RenderingChart => "차트 생성",
            LoadingStage::Finishing => "보고서 저장",
        }
    }
}

/// Outer state of a report page.
///
/// `Idle → Loading(stage) → Ready` on success, `Idle → Loading → Failed` when
/// data collection fails. `Ready` and `Failed` are terminal for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Loading(LoadingStage),
    Ready,
    Failed,
}

impl PipelineState {
    pub fn percent(self) -> u8 {
        match self {
            PipelineState::Idle | PipelineState::Failed => 0,
            PipelineState::Loading(stage) => stage.percent(),
            PipelineState::Ready => 100,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Ready | PipelineState::Failed)
    }
}
