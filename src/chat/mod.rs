//! League chat.
//!
//! Questions go to a remote chat backend first. When it is not configured,
//! times out, errors, or returns no answer, a local pattern-matching
//! responder answers from the league's own rows. Callers always get a reply.

pub mod backend;
pub mod fallback;
pub mod service;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use backend::HttpChatBackend;
pub use fallback::{LeagueSnapshot, LocalResponder};
pub use service::ChatService;

/// Errors from a chat backend. Never surfaced past [`ChatService`].
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Chat backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Chat backend returned {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("Chat response unparseable: {0}")]
    ResponseParseError(String),

    #[error("Chat backend returned no answer")]
    EmptyAnswer,
}

/// Context tag used when neither the request nor the config names one.
pub const DEFAULT_CONTEXT: &str = "coaching_chatbot";

/// A league question, as sent to the backend and accepted by the API.
///
/// A missing `context` is filled in by [`ChatService`] from `[chat] context`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    pub league_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>, league_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            league_id: league_id.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether the caller named a non-blank context.
    pub fn has_context(&self) -> bool {
        self.context.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

/// A link offered alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationButton {
    pub label: String,
    pub path: String,
}

impl NavigationButton {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// Who produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplySource {
    Backend,
    Local,
}

/// An answer to a league question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "response")]
    pub content: String,

    #[serde(default)]
    pub suggestions: Vec<String>,

    #[serde(default)]
    pub buttons: Vec<NavigationButton>,

    pub source: ReplySource,
}

impl ChatReply {
    pub fn local(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            suggestions: Vec::new(),
            buttons: Vec::new(),
            source: ReplySource::Local,
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn with_buttons(mut self, buttons: Vec<NavigationButton>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// A remote question-answering service.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &'static str;

    /// Ask one question.
    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}
