//! Chat service: remote backend with local fallback.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use super::{ChatBackend, ChatReply, ChatRequest, LeagueSnapshot, LocalResponder, DEFAULT_CONTEXT};
use crate::calculate::GamesRule;
use crate::config::ChatConfig;
use crate::reconcile::Reconciler;
use crate::storage::LeagueStore;

/// Callback invoked with every reply.
pub type ReplyObserver = Arc<dyn Fn(&ChatReply) + Send + Sync>;

/// Answers league questions. Never fails.
#[derive(Clone)]
pub struct ChatService {
    backend: Option<Arc<dyn ChatBackend>>,
    store: LeagueStore,
    responder: LocalResponder,
    reconciler: Reconciler,
    rule: GamesRule,
    context: String,
    league_names: Arc<HashMap<String, String>>,
    observer: Option<ReplyObserver>,
}

impl ChatService {
    pub fn new(
        backend: Option<Arc<dyn ChatBackend>>,
        store: LeagueStore,
        reconciler: Reconciler,
        rule: GamesRule,
    ) -> Self {
        Self {
            backend,
            store,
            responder: LocalResponder::new(reconciler),
            reconciler,
            rule,
            context: DEFAULT_CONTEXT.to_string(),
            league_names: Arc::new(HashMap::new()),
            observer: None,
        }
    }

    /// Apply `[chat]` settings: the default context tag and league
    /// display names.
    pub fn with_chat_config(mut self, config: &ChatConfig) -> Self {
        self.context = config.context.clone();
        self.league_names = Arc::new(config.league_names.clone());
        self
    }

    /// Register a callback that sees every reply, backend or local.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ChatReply) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Answer a question, falling back to local data on any backend failure.
    pub async fn answer(&self, request: &ChatRequest) -> ChatReply {
        let request = self.with_default_context(request);
        let reply = match self.ask_backend(&request).await {
            Some(reply) => reply,
            None => self.answer_locally(&request).await,
        };

        if let Some(observer) = &self.observer {
            observer(&reply);
        }
        reply
    }

    fn with_default_context(&self, request: &ChatRequest) -> ChatRequest {
        if request.has_context() {
            request.clone()
        } else {
            request.clone().with_context(self.context.clone())
        }
    }

    async fn ask_backend(&self, request: &ChatRequest) -> Option<ChatReply> {
        let Some(backend) = &self.backend else {
            info!("No chat backend configured, answering locally");
            return None;
        };

        match backend.ask(request).await {
            Ok(reply) => {
                info!("Chat backend '{}' answered", backend.name());
                Some(reply)
            }
            Err(e) => {
                warn!(
                    "Chat backend '{}' failed, falling back to local answer: {}",
                    backend.name(),
                    e
                );
                None
            }
        }
    }

    async fn answer_locally(&self, request: &ChatRequest) -> ChatReply {
        let (records, games) = tokio::join!(
            self.store.player_stats(&request.league_id),
            self.store.games(&request.league_id)
        );

        let mut snapshot =
            LeagueSnapshot::build(&request.league_id, &records, &games, self.rule, &self.reconciler);
        if let Some(name) = self.league_names.get(&request.league_id) {
            snapshot = snapshot.with_league_name(name.clone());
        }
        self.responder.answer(&request.question, &snapshot)
    }
}
