//! Render-ready view models.
//!
//! Each view is a plain snapshot derived from domain data. Adapters (terminal
//! UI, CLI, markdown export) draw these without touching the domain types.

pub mod analysis;
pub mod base;
pub mod chart;
pub mod ratios;
pub mod statements;

pub use analysis::{AnalysisView, BreakdownBar, DetailItem, ForecastReadout};
pub use base::{
    BaseFactsView, DisclosureRow, IndicatorCard, InfoRow, MovingAverageCard, NewsRow, PriceCard,
    ValuationRow,
};
pub use chart::{build_chart, ChartMode, ChartSeries, ChartView, SeriesKind};
pub use ratios::{RatioView, FINANCIAL_RATIOS};
pub use statements::{StatementRow, StatementsView};

/// Report sections in page order, revealed one after another when loading ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Summary,
    PriceChart,
    Technical,
    Financials,
    DetailEvaluation,
    Forecast,
    RequestAnswer,
    News,
    CompanyInfo,
}

impl Section {
    pub const ALL: [Section; 9] = [
        Section::Summary,
        Section::PriceChart,
        Section::Technical,
        Section::Financials,
        Section::DetailEvaluation,
        Section::Forecast,
        Section::RequestAnswer,
        Section::News,
        Section::CompanyInfo,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Summary => "투자 요약",
            Section::PriceChart => "주가 차트",
            Section::Technical => "기술적 지표",
            Section::Financials => "재무 분석",
            Section::DetailEvaluation => "상세 평가",
            Section::Forecast => "주가 전망",
            Section::RequestAnswer => "요청 답변",
            Section::News => "뉴스 & 공시",
            Section::CompanyInfo => "기업 정보",
        }
    }
}
