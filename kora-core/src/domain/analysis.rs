//! Analysis — the AI document returned by the analyze endpoint.

use serde::Deserialize;
use std::collections::BTreeMap;

use super::lenient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "lenient::number")]
    pub fair_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub fair_price_reason: Option<String>,
    /// Short "저평가/적정/고평가" verdict shown under the opinion badge.
    #[serde(default, deserialize_with = "lenient::text")]
    pub current_vs_fair: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub investment_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub investment_grade: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub investment_opinion: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub financial_health: ScoreCard,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub growth_potential: ScoreCard,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub profitability: ScoreCard,
    #[serde(default, deserialize_with = "lenient::text_list")]
    pub detail_key_list: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::text_map")]
    pub detail_evaluations: Option<BTreeMap<String, String>>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub price_forecast: PriceForecast,
    #[serde(default, deserialize_with = "lenient::text")]
    pub business_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub request_answer: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub news_analysis: NewsAnalysis,
    #[serde(default, deserialize_with = "lenient::text")]
    pub evaluation_summary: Option<String>,
}

/// Sub-score with a letter grade (financial health, growth, profitability).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreCard {
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub grade: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceForecast {
    #[serde(default, rename = "3month", deserialize_with = "lenient::number")]
    pub three_month: Option<f64>,
    #[serde(default, rename = "6month", deserialize_with = "lenient::number")]
    pub six_month: Option<f64>,
    #[serde(default, rename = "12month", deserialize_with = "lenient::number")]
    pub twelve_month: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub confidence: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsAnalysis {
    #[serde(default, deserialize_with = "lenient::number")]
    pub overall_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub overall_sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub top_news: Vec<NewsSentiment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsSentiment {
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
}
