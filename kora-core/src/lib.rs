//! KORA Core — domain types, chart math, classifiers and view models for the
//! AI investment report.
//!
//! This crate performs no I/O:
//! - Domain types for the collected data and the AI analysis payloads
//! - Moving averages, monthly bucketing and forecast interpolation
//! - Classifiers for valuation, score bands, opinions, signals and ratios
//! - Display formatting shared by every adapter
//! - Render-ready view models consumed by the terminal UI, CLI and export

pub mod classify;
pub mod domain;
pub mod forecast;
pub mod format;
pub mod indicators;
pub mod progress;
pub mod view;

pub use domain::{AiAnalysis, Analysis, CollectedData, CompanyRef, PricePoint, ReportData};
pub use progress::{LoadingStage, PipelineState};
pub use view::{AnalysisView, BaseFactsView, ChartMode, ChartView, Section};
