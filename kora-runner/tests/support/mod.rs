//! Scripted backend and fixtures shared by the integration tests.

#![allow(dead_code)]

use kora_core::domain::Payload;
use kora_core::{AiAnalysis, CompanyRef, ReportData};
use kora_runner::{
    AnswerRequest, BackendError, ChatRequest, CollectRequest, LoadingConfig, RecordingSink,
    ReportBackend, ReportPipeline, RunToken, SaveReceipt, SaveRequest,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Backend whose answers are fixed up front and whose calls are recorded.
pub struct ScriptedBackend {
    pub collect: Result<Value, BackendError>,
    pub analyze: Result<Value, BackendError>,
    pub answer: Result<String, BackendError>,
    pub save: Result<SaveReceipt, BackendError>,
    pub chat: Result<String, BackendError>,
    /// Cancelled as soon as `collect` is called.
    pub cancel_on_collect: Option<RunToken>,
    /// Cancelled as soon as `analyze` is called.
    pub cancel_on_analyze: Option<RunToken>,
    pub calls: Mutex<Vec<&'static str>>,
    pub saves: Mutex<Vec<SaveRequest>>,
    pub answers: Mutex<Vec<AnswerRequest>>,
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self {
            collect: Ok(collected_json()),
            analyze: Ok(analysis_json()),
            answer: Ok("배당 성향은 안정적입니다.".into()),
            save: Ok(SaveReceipt {
                report_id: Some(json!(42)),
                credits_remaining: Some(9.0),
            }),
            chat: Ok("네, 설명드리겠습니다.".into()),
            cancel_on_collect: None,
            cancel_on_analyze: None,
            calls: Mutex::new(Vec::new()),
            saves: Mutex::new(Vec::new()),
            answers: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedBackend {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| ***c == *call).count()
    }

    pub fn saves(&self) -> Vec<SaveRequest> {
        self.saves.lock().unwrap().clone()
    }

    pub fn answers(&self) -> Vec<AnswerRequest> {
        self.answers.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

impl ReportBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn collect(&self, _request: &CollectRequest) -> Result<ReportData, BackendError> {
        self.record("collect");
        if let Some(token) = &self.cancel_on_collect {
            token.cancel();
        }
        let raw = self.collect.clone()?;
        Payload::from_raw(raw).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn analyze(&self, _report: &ReportData) -> Result<AiAnalysis, BackendError> {
        self.record("analyze");
        if let Some(token) = &self.cancel_on_analyze {
            token.cancel();
        }
        let raw = self.analyze.clone()?;
        Payload::from_raw(raw).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn answer(&self, request: &AnswerRequest) -> Result<String, BackendError> {
        self.record("answer");
        self.answers.lock().unwrap().push(request.clone());
        self.answer.clone()
    }

    fn save(&self, request: &SaveRequest) -> Result<SaveReceipt, BackendError> {
        self.record("save");
        self.saves.lock().unwrap().push(request.clone());
        self.save.clone()
    }

    fn chat(&self, _request: &ChatRequest) -> Result<String, BackendError> {
        self.record("chat");
        self.chat.clone()
    }
}

pub fn samsung() -> CompanyRef {
    CompanyRef::new("삼성전자", "005930").with_corp_code("00126380")
}

/// Pipeline with no pauses, recording into a fresh sink.
pub fn pipeline(backend: ScriptedBackend) -> (ReportPipeline, Arc<ScriptedBackend>, Arc<RecordingSink>) {
    let backend = Arc::new(backend);
    let sink = Arc::new(RecordingSink::new());
    let pipeline = ReportPipeline::new(backend.clone(), sink.clone(), LoadingConfig::instant());
    (pipeline, backend, sink)
}

/// 60 trading days of history starting in January 2024.
pub fn price_history() -> Value {
    let points: Vec<Value> = (0..60)
        .map(|i| {
            let month = 1 + i / 20;
            let day = 1 + i % 20;
            json!({ "date": format!("2024-{month:02}-{day:02}"), "close": 70_000 + i * 100 })
        })
        .collect();
    Value::Array(points)
}

pub fn collected_json() -> Value {
    json!({
        "company_name": "삼성전자",
        "krx": {
            "current_price": { "close": 75_900, "change_rate": 1.25 },
            "valuation": { "per": 13.2, "pbr": 1.1, "eps": 5_750, "bps": 69_000, "div_yield": 1.9 },
            "yearly_trend": { "high_price": 88_000, "low_price": 65_000 },
            "rsi": { "value": 55.4, "signal": "중립" },
            "mfi": { "value": 72.1, "signal": "과매수" },
            "moving_averages": {
                "current": { "ma5": 75_000, "ma20": 74_000, "ma60": 72_000, "ma120": 70_000 },
                "trend": "상승"
            },
            "price_history": price_history()
        },
        "dart": {
            "company_info": { "corp_name": "삼성전자(주)", "ceo_nm": "한종희" },
            "financial_index": {
                "수익성지표": [{ "idx_nm": "ROE", "idx_val": 8.5 }]
            },
            "financials": {
                "type": "연결",
                "year": "2023",
                "key_accounts": {
                    "자산총계": { "current": 4.5e14, "previous": 4.4e14, "change_rate": 2.3 },
                    "영업이익": { "current": 6.5e12, "previous": 4.3e13, "change_rate": -84.9 }
                }
            },
            "disclosures": [
                { "rcept_dt": "20240315", "report_nm": "사업보고서", "rcept_no": "20240315000123" }
            ]
        },
        "news": {
            "total": 1,
            "items": [{ "title": "반도체 업황 회복", "link": "https://news.example/1", "pub_date": "2024-03-20", "source": "연합뉴스" }]
        }
    })
}

pub fn analysis_json() -> Value {
    json!({
        "fair_price": 95_000,
        "investment_score": 78,
        "investment_grade": "A",
        "investment_opinion": "매수",
        "financial_health": { "score": 80, "grade": "A" },
        "growth_potential": { "score": 70, "grade": "B+" },
        "profitability": { "score": 65, "grade": "B" },
        "detail_key_list": ["재무 안정성"],
        "detail_evaluations": { "재무 안정성": "부채비율이 낮습니다." },
        "price_forecast": { "3month": 80_000, "6month": 85_000, "12month": 95_000, "confidence": "중간" },
        "news_analysis": { "overall_score": 62, "overall_sentiment": "긍정", "top_news": [] },
        "evaluation_summary": "견조한 재무 구조"
    })
}
