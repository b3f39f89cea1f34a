//! HTTP chat backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{ChatBackend, ChatError, ChatReply, ChatRequest, NavigationButton, ReplySource};
use crate::config::ChatConfig;

/// Client for `POST {base_url}/api/chat/league`.
pub struct HttpChatBackend {
    client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
}

impl HttpChatBackend {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ChatError::BackendUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_seconds,
        })
    }

    /// Build a backend if a URL is configured.
    pub fn from_config(config: &ChatConfig) -> Result<Option<Self>, ChatError> {
        config
            .backend_url
            .as_deref()
            .map(|url| Self::new(url, config.timeout_seconds))
            .transpose()
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/chat/league", self.base_url)
    }
}

/// Response body. Older deployments answer in `answer` instead of
/// `response`.
#[derive(Debug, Deserialize)]
struct BackendResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    buttons: Vec<NavigationButton>,
}

impl BackendResponse {
    fn into_reply(self) -> Result<ChatReply, ChatError> {
        let content = [self.response, self.answer]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .ok_or(ChatError::EmptyAnswer)?;

        Ok(ChatReply {
            content,
            suggestions: self.suggestions,
            buttons: self.buttons,
            source: ReplySource::Backend,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn ask(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let url = self.endpoint();
        debug!("Sending chat request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout(self.timeout_seconds)
                } else {
                    ChatError::BackendUnavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: BackendResponse = response
            .json()
            .await
            .map_err(|e| ChatError::ResponseParseError(e.to_string()))?;

        body.into_reply()
    }
}

/// Scripted backend for tests.
#[cfg(test)]
pub struct MockBackend {
    reply: Option<String>,
}

#[cfg(test)]
impl MockBackend {
    pub fn answering(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }

    pub fn failing() -> Self {
        Self { reply: None }
    }
}

#[cfg(test)]
#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn ask(&self, _request: &ChatRequest) -> Result<ChatReply, ChatError> {
        match &self.reply {
            Some(content) => Ok(ChatReply {
                content: content.clone(),
                suggestions: vec!["Who is the best team?".to_string()],
                buttons: Vec::new(),
                source: ReplySource::Backend,
            }),
            None => Err(ChatError::Timeout(10)),
        }
    }
}
