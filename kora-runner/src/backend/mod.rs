//! Backend trait and the JSON contracts of the report endpoints.
//!
//! The `ReportBackend` trait abstracts over the KORA REST API so the pipeline
//! can be driven by the HTTP client in production and by a scripted backend in
//! tests. Every endpoint answers with an envelope `{success, error, ...}`;
//! [`open_envelope`] turns that into a typed result.

pub mod http;

pub use http::HttpBackend;

use kora_core::domain::lenient;
use kora_core::{AiAnalysis, ReportData};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Structured errors for backend calls.
///
/// `Rejected` carries the backend's own `error` string, which is shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Rejected(String),

    #[error("network unreachable: {0}")]
    Transport(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// The five backend calls, used for logging, timeouts and fallback messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Collect,
    Analyze,
    Answer,
    Save,
    Chat,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::Collect => "collect",
            Endpoint::Analyze => "analyze",
            Endpoint::Answer => "answer",
            Endpoint::Save => "save",
            Endpoint::Chat => "chat",
        }
    }

    /// Message used when the backend reports failure without an `error` text.
    pub fn fallback_error(self) -> &'static str {
        match self {
            Endpoint::Collect => "데이터 수집 실패",
            Endpoint::Analyze => "AI 분석 실패",
            Endpoint::Answer => "답변 생성 실패",
            Endpoint::Save => "보고서 저장 실패",
            Endpoint::Chat => "응답 생성 실패",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Request bodies ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectRequest {
    pub company_name: String,
    pub ticker: String,
    pub corp_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub all_data: &'a ReportData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRequest {
    pub company_name: String,
    pub request_text: String,
    /// Serialized JSON string, not a nested object.
    pub report_context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub company_name: String,
    pub ticker: String,
    pub market: String,
    /// `null` when the analysis step failed.
    pub analysis: Option<Value>,
    pub raw_data: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub report_context: String,
}

// ── Responses ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SaveReceipt {
    #[serde(default)]
    pub report_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub credits_remaining: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Check the `success` flag and hand back the whole document.
///
/// `success:false` becomes [`BackendError::Rejected`] with the backend's
/// `error` text, or the endpoint's fallback message when there is none.
pub fn open_envelope(endpoint: Endpoint, body: Value) -> Result<Value, BackendError> {
    let envelope = Envelope::deserialize(&body)
        .map_err(|e| BackendError::Decode(format!("{endpoint}: {e}")))?;
    if envelope.success {
        Ok(body)
    } else {
        let message = envelope
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| endpoint.fallback_error().to_string());
        Err(BackendError::Rejected(message))
    }
}

/// Take a required field out of a successful envelope.
pub fn take_field(endpoint: Endpoint, mut body: Value, field: &str) -> Result<Value, BackendError> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Null) | None => Err(BackendError::Decode(format!(
            "{endpoint}: response has no '{field}'"
        ))),
        Some(value) => Ok(value),
    }
}

pub fn take_text(endpoint: Endpoint, body: Value, field: &str) -> Result<String, BackendError> {
    match take_field(endpoint, body, field)? {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// The KORA report API.
///
/// Implementations handle transport and envelope decoding; callers decide
/// whether a failure is fatal, degraded or soft.
pub trait ReportBackend: Send + Sync {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    fn collect(&self, request: &CollectRequest) -> Result<ReportData, BackendError>;

    fn analyze(&self, report: &ReportData) -> Result<AiAnalysis, BackendError>;

    fn answer(&self, request: &AnswerRequest) -> Result<String, BackendError>;

    fn save(&self, request: &SaveRequest) -> Result<SaveReceipt, BackendError>;

    fn chat(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

/// Decode a typed payload, keeping the raw document.
pub(crate) fn decode_payload<T: serde::de::DeserializeOwned>(
    endpoint: Endpoint,
    raw: Value,
) -> Result<kora_core::domain::Payload<T>, BackendError> {
    kora_core::domain::Payload::from_raw(raw)
        .map_err(|e| BackendError::Decode(format!("{endpoint}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_keeps_backend_message() {
        let err = open_envelope(
            Endpoint::Collect,
            json!({"success": false, "error": "종목을 찾을 수 없습니다"}),
        )
        .unwrap_err();
        assert_eq!(err, BackendError::Rejected("종목을 찾을 수 없습니다".into()));
        assert_eq!(err.to_string(), "종목을 찾을 수 없습니다");
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let err = open_envelope(Endpoint::Collect, json!({"success": false})).unwrap_err();
        assert_eq!(err.to_string(), "데이터 수집 실패");
    }

    #[test]
    fn missing_success_flag_is_failure() {
        assert!(open_envelope(Endpoint::Chat, json!({"response": "hi"})).is_err());
    }

    #[test]
    fn fields_are_taken_from_success() {
        let body = open_envelope(Endpoint::Chat, json!({"success": true, "response": "안녕하세요"}))
            .unwrap();
        assert_eq!(take_text(Endpoint::Chat, body, "response").unwrap(), "안녕하세요");

        let body = json!({"success": true, "data": null});
        assert!(matches!(
            take_field(Endpoint::Collect, body, "data"),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn save_request_serializes_null_analysis() {
        let req = SaveRequest {
            company_name: "삼성전자".into(),
            ticker: "005930".into(),
            market: "KOSPI".into(),
            analysis: None,
            raw_data: json!({"krx": {}}),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["analysis"], Value::Null);
        assert_eq!(value["raw_data"]["krx"], json!({}));
    }

    #[test]
    fn receipt_reads_lenient_credits() {
        let receipt: SaveReceipt =
            serde_json::from_value(json!({"report_id": 17, "credits_remaining": "42"})).unwrap();
        assert_eq!(receipt.credits_remaining, Some(42.0));
    }
}
