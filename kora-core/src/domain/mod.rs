//! Domain types for a single report session.
//!
//! Everything here is transient: created when a pipeline run starts, assigned
//! at most once, and dropped with the session.

pub mod analysis;
pub mod collected;
pub mod company;
pub mod lenient;
pub mod payload;
pub mod price;

pub use analysis::{Analysis, NewsAnalysis, NewsSentiment, PriceForecast, ScoreCard};
pub use collected::{
    CollectedData, CompanyInfo, CurrentPrice, DartData, Disclosure, FinancialIndexItem,
    Financials, KeyAccount, KrxData, MovingAverageSnapshot, MovingAverages, NewsData, NewsItem,
    SignalReading, Valuation, YearlyTrend,
};
pub use company::{CompanyError, CompanyRef};
pub use payload::Payload;
pub use price::{PricePoint, YearMonth};

/// Aggregated external facts returned by the collect-data endpoint.
pub type ReportData = Payload<CollectedData>;

/// AI analysis returned by the analyze endpoint.
pub type AiAnalysis = Payload<Analysis>;
