//! AI-dependent summary: valuation badge, score gauge, opinion, breakdown,
//! detail evaluations and the forecast readout.

use crate::classify::{sentiment_tone, GradeTone, Opinion, ScoreGauge, Tone, ValuationBadge};
use crate::domain::{Analysis, ScoreCard};
use crate::format::{format_price, text_or_placeholder, PLACEHOLDER};
use crate::indicators::round_half_up;

pub const OPINION_PENDING: &str = "분석 중";
pub const SUMMARY_UNAVAILABLE: &str = "AI 분석을 완료하지 못했습니다.";
pub const DETAILS_UNAVAILABLE: &str = "상세 평가를 불러올 수 없습니다.";
pub const DETAIL_MISSING: &str = "평가 내용 없음";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub fair_price: String,
    pub valuation: ValuationBadge,
    pub score_text: String,
    pub gauge: ScoreGauge,
    pub grade: String,
    pub opinion: String,
    pub opinion_class: Opinion,
    /// Short current-vs-fair verdict under the opinion badge; may be empty.
    pub opinion_sub: String,
    pub news_score: String,
    pub news_sentiment: String,
    /// Sentiment tone per headline, in the order the news list is shown.
    pub news_tones: Vec<Tone>,
    pub evaluation_summary: String,
    pub breakdown: [BreakdownBar; 3],
    /// `None` when either the key list or the evaluations map is missing.
    pub details: Option<Vec<DetailItem>>,
    pub forecast: ForecastReadout,
    pub business_summary: Option<String>,
    pub request_answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownBar {
    pub label: &'static str,
    /// Bar width in percent; `None` leaves the bar empty.
    pub width_pct: Option<f64>,
    pub grade: Option<String>,
    pub grade_tone: GradeTone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailItem {
    pub key: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastReadout {
    pub three_month: String,
    pub six_month: String,
    pub twelve_month: String,
    pub confidence: Option<String>,
    pub disclaimer: Option<String>,
}

impl AnalysisView {
    /// `current_price` comes from the collected data; the badge degrades to
    /// "적정 수준" when it is unknown.
    pub fn build(analysis: &Analysis, current_price: Option<f64>) -> Self {
        let fair = analysis.fair_price.unwrap_or(0.0);
        let score = analysis.investment_score.unwrap_or(0.0);
        let opinion = analysis
            .investment_opinion
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(OPINION_PENDING)
            .to_string();

        let news = &analysis.news_analysis;
        let forecast = &analysis.price_forecast;

        Self {
            fair_price: format_price(Some(fair)),
            valuation: ValuationBadge::classify(fair, current_price.unwrap_or(0.0)),
            score_text: score_text(score),
            gauge: ScoreGauge::new(score),
            grade: text_or_placeholder(analysis.investment_grade.as_deref()),
            opinion_class: Opinion::classify(&opinion),
            opinion,
            opinion_sub: analysis.current_vs_fair.clone().unwrap_or_default(),
            news_score: news
                .overall_score
                .map(score_text)
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            news_sentiment: text_or_placeholder(news.overall_sentiment.as_deref()),
            news_tones: news
                .top_news
                .iter()
                .map(|n| sentiment_tone(n.sentiment.as_deref()))
                .collect(),
            evaluation_summary: analysis
                .evaluation_summary
                .clone()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| SUMMARY_UNAVAILABLE.to_string()),
            breakdown: [
                breakdown_bar("재무 건전성", &analysis.financial_health),
                breakdown_bar("성장 잠재력", &analysis.growth_potential),
                breakdown_bar("수익성", &analysis.profitability),
            ],
            details: detail_items(analysis),
            forecast: ForecastReadout {
                three_month: format_price(forecast.three_month),
                six_month: format_price(forecast.six_month),
                twelve_month: format_price(forecast.twelve_month),
                confidence: forecast.confidence.clone(),
                disclaimer: forecast.disclaimer.clone(),
            },
            business_summary: analysis.business_summary.clone(),
            request_answer: analysis.request_answer.clone(),
        }
    }

    /// Accordion body lines, falling back to the unavailable notice.
    pub fn detail_lines(&self) -> Vec<(String, String)> {
        match &self.details {
            Some(items) => items.iter().map(|d| (d.key.clone(), d.body.clone())).collect(),
            None => vec![(String::new(), DETAILS_UNAVAILABLE.to_string())],
        }
    }
}

fn score_text(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{}", score as i64)
    } else {
        format!("{}", round_half_up(score * 10.0) / 10.0)
    }
}

fn breakdown_bar(label: &'static str, card: &ScoreCard) -> BreakdownBar {
    let grade = card.grade.clone().filter(|g| !g.trim().is_empty());
    BreakdownBar {
        label,
        width_pct: card.score.filter(|s| *s > 0.0).map(|s| s.min(100.0)),
        grade_tone: grade.as_deref().map(GradeTone::of).unwrap_or(GradeTone::Unknown),
        grade,
    }
}

fn detail_items(analysis: &Analysis) -> Option<Vec<DetailItem>> {
    let keys = analysis.detail_key_list.as_ref()?;
    let evaluations = analysis.detail_evaluations.as_ref()?;
    Some(
        keys.iter()
            .map(|key| DetailItem {
                key: key.clone(),
                body: evaluations
                    .get(key)
                    .filter(|s| !s.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| DETAIL_MISSING.to_string()),
            })
            .collect(),
    )
}
