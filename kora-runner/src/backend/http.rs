//! Blocking reqwest client for the KORA REST API.
//!
//! Each call is a JSON POST with its own timeout taken from [`Timeouts`].
//! Non-2xx responses that still carry an envelope surface the backend's error
//! text; anything else is reported as an HTTP status error.

use super::{
    decode_payload, open_envelope, take_field, take_text, AnalyzeRequest, AnswerRequest,
    BackendError, ChatRequest, CollectRequest, Endpoint, ReportBackend, SaveReceipt, SaveRequest,
};
use crate::config::ClientConfig;
use kora_core::{AiAnalysis, ReportData};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Longest response body echoed into an error message.
const ERROR_BODY_LIMIT: usize = 200;

pub struct HttpBackend {
    client: reqwest::blocking::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("kora-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn path(&self, endpoint: Endpoint) -> &str {
        let e = &self.config.endpoints;
        match endpoint {
            Endpoint::Collect => &e.collect,
            Endpoint::Analyze => &e.analyze,
            Endpoint::Answer => &e.answer,
            Endpoint::Save => &e.save,
            Endpoint::Chat => &e.chat,
        }
    }

    fn timeout_secs(&self, endpoint: Endpoint) -> u64 {
        let t = &self.config.timeouts;
        match endpoint {
            Endpoint::Collect => t.collect,
            Endpoint::Analyze => t.analyze,
            Endpoint::Answer => t.answer,
            Endpoint::Save => t.save,
            Endpoint::Chat => t.chat,
        }
    }

    /// POST `body` and return the opened envelope.
    fn post<T: Serialize + ?Sized>(&self, endpoint: Endpoint, body: &T) -> Result<Value, BackendError> {
        let url = self.config.url(self.path(endpoint));
        let timeout = self.timeout_secs(endpoint);
        let started = Instant::now();
        debug!(endpoint = %endpoint, url = %url, "POST");

        let resp = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(timeout))
            .json(body)
            .send()
            .map_err(|e| transport_error(e, timeout))?;

        let status = resp.status();
        let text = resp.text().map_err(|e| transport_error(e, timeout))?;
        debug!(
            endpoint = %endpoint,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response"
        );

        let parsed: Result<Value, _> = serde_json::from_str(&text);
        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "backend returned an error status");
            if let Ok(body) = parsed {
                if body.get("success").is_some() {
                    open_envelope(endpoint, body)?;
                }
            }
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        let body = parsed.map_err(|e| BackendError::Decode(format!("{endpoint}: {e}")))?;
        open_envelope(endpoint, body)
    }
}

impl ReportBackend for HttpBackend {
    fn name(&self) -> &str {
        "kora_http"
    }

    fn collect(&self, request: &CollectRequest) -> Result<ReportData, BackendError> {
        let body = self.post(Endpoint::Collect, request)?;
        let data = take_field(Endpoint::Collect, body, "data")?;
        decode_payload(Endpoint::Collect, data)
    }

    fn analyze(&self, report: &ReportData) -> Result<AiAnalysis, BackendError> {
        let body = self.post(Endpoint::Analyze, &AnalyzeRequest { all_data: report })?;
        let analysis = take_field(Endpoint::Analyze, body, "analysis")?;
        decode_payload(Endpoint::Analyze, analysis)
    }

    fn answer(&self, request: &AnswerRequest) -> Result<String, BackendError> {
        let body = self.post(Endpoint::Answer, request)?;
        take_text(Endpoint::Answer, body, "answer")
    }

    fn save(&self, request: &SaveRequest) -> Result<SaveReceipt, BackendError> {
        let body = self.post(Endpoint::Save, request)?;
        serde_json::from_value(body).map_err(|e| BackendError::Decode(format!("save: {e}")))
    }

    fn chat(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let body = self.post(Endpoint::Chat, request)?;
        take_text(Endpoint::Chat, body, "response")
    }
}

fn transport_error(e: reqwest::Error, timeout_secs: u64) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(timeout_secs)
    } else if e.is_decode() {
        BackendError::Decode(e.to_string())
    } else {
        BackendError::Transport(e.to_string())
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_follow_config() {
        let mut config = ClientConfig::default();
        config.set_base_url("http://kora.local:8000/").unwrap();
        config.endpoints.chat = "/v2/chat".into();
        let backend = HttpBackend::new(config).unwrap();
        assert_eq!(
            backend.config().url(backend.path(Endpoint::Chat)),
            "http://kora.local:8000/v2/chat"
        );
        assert_eq!(backend.timeout_secs(Endpoint::Analyze), 180);
    }

    #[test]
    fn unreachable_backend_is_a_transport_error() {
        let mut config = ClientConfig::default();
        // Port 9 (discard) on loopback is closed on test machines.
        config.set_base_url("http://127.0.0.1:9").unwrap();
        config.timeouts.chat = 2;
        let backend = HttpBackend::new(config).unwrap();
        let err = backend
            .chat(&ChatRequest {
                message: "hi".into(),
                report_context: "{}".into(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            BackendError::Transport(_) | BackendError::Timeout(_)
        ));
    }

    #[test]
    fn truncates_on_char_boundary() {
        assert_eq!(truncate("가나다라", 2), "가나…");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
