//! Chat sidebar transcript.
//!
//! Sending appends the user message and a "generating" placeholder at once.
//! The placeholder is tagged with a correlation id and replaced in place when
//! its reply arrives, so the transcript keeps send order even when replies
//! complete out of order. The transcript is append-only for the session.

use crate::backend::{BackendError, ChatRequest, ReportBackend};
use tracing::{debug, warn};

pub const CHAT_PENDING: &str = "답변 생성 중...";
/// Backend answered with `success:false`.
pub const CHAT_FAILED: &str = "죄송합니다. 응답을 생성하지 못했습니다.";
/// Transport or decoding failure.
pub const CHAT_ERROR: &str = "오류가 발생했습니다. 다시 시도해주세요.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub speaker: Speaker,
    pub text: String,
    pub pending: bool,
}

/// A reply that has been requested but not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingReply {
    /// Correlation id of the placeholder message.
    pub id: u64,
    pub request: ChatRequest,
}

#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
    report_context: String,
}

impl ChatSession {
    pub fn new(report_context: impl Into<String>) -> Self {
        Self {
            report_context: report_context.into(),
            ..Self::default()
        }
    }

    /// Context sent with later messages; earlier requests keep theirs.
    pub fn set_context(&mut self, report_context: impl Into<String>) {
        self.report_context = report_context.into();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.pending).count()
    }

    /// Append the user's message and a placeholder. Blank input is ignored.
    pub fn begin(&mut self, text: &str) -> Option<PendingReply> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        self.push(Speaker::User, message.to_string(), false);
        let id = self.push(Speaker::Bot, CHAT_PENDING.to_string(), true);
        debug!(id, "chat message queued");
        Some(PendingReply {
            id,
            request: ChatRequest {
                message: message.to_string(),
                report_context: self.report_context.clone(),
            },
        })
    }

    /// Replace the placeholder `id` with the reply. Returns false when there
    /// is no such pending placeholder.
    pub fn resolve(&mut self, id: u64, result: Result<String, BackendError>) -> bool {
        let Some(slot) = self.messages.iter_mut().find(|m| m.id == id && m.pending) else {
            return false;
        };
        if let Err(e) = &result {
            warn!(id, error = %e, "chat reply failed");
        }
        slot.text = reply_text(result);
        slot.pending = false;
        true
    }

    /// Send and wait for the reply on the calling thread.
    pub fn send(&mut self, backend: &dyn ReportBackend, text: &str) -> Option<&ChatMessage> {
        let pending = self.begin(text)?;
        let result = backend.chat(&pending.request);
        self.resolve(pending.id, result);
        self.messages.iter().find(|m| m.id == pending.id)
    }

    fn push(&mut self, speaker: Speaker, text: String, pending: bool) -> u64 {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_id,
            speaker,
            text,
            pending,
        });
        self.next_id
    }
}

/// Text shown in place of the placeholder.
pub fn reply_text(result: Result<String, BackendError>) -> String {
    match result {
        Ok(text) => text,
        Err(BackendError::Rejected(_)) => CHAT_FAILED.to_string(),
        Err(_) => CHAT_ERROR.to_string(),
    }
}
