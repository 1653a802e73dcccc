//! CompanyRef — the report target, fixed for the whole session.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Market used when the caller does not name one.
pub const DEFAULT_MARKET: &str = "KOSPI";

/// Reference to the company a report is generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRef {
    pub name: String,
    pub ticker: String,
    #[serde(default)]
    pub corp_code: String,
    #[serde(default = "default_market")]
    pub market: String,
    /// Free-text question answered in its own report section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_text: Option<String>,
}

fn default_market() -> String {
    DEFAULT_MARKET.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanyError {
    #[error("company name is required")]
    MissingName,
    #[error("ticker is required")]
    MissingTicker,
}

impl CompanyRef {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
            corp_code: String::new(),
            market: default_market(),
            request_text: None,
        }
    }

    pub fn with_corp_code(mut self, corp_code: impl Into<String>) -> Self {
        self.corp_code = corp_code.into();
        self
    }

    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = market.into();
        self
    }

    pub fn with_request_text(mut self, text: impl Into<String>) -> Self {
        self.request_text = Some(text.into());
        self
    }

    /// Name and ticker must both be present before anything is fetched.
    pub fn validate(&self) -> Result<(), CompanyError> {
        if self.name.trim().is_empty() {
            return Err(CompanyError::MissingName);
        }
        if self.ticker.trim().is_empty() {
            return Err(CompanyError::MissingTicker);
        }
        Ok(())
    }

    /// The trimmed request text, if any is left after trimming.
    pub fn request(&self) -> Option<&str> {
        self.request_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Key used to recognise the same company across runs in one session.
    pub fn session_key(&self) -> String {
        format!("{}:{}:{}", self.market, self.ticker.trim(), self.corp_code.trim())
    }
}
