use std::sync::Arc;

use crate::chat::{ChatBackend, ChatError, ChatService, HttpChatBackend};
use crate::config::AppConfig;
use crate::reconcile::Reconciler;
use crate::storage::{LeagueStore, StorageConfig};

#[derive(Clone)]
pub struct AppState {
    pub store: LeagueStore,
    pub config: Arc<AppConfig>,
    pub reconciler: Reconciler,
    pub chat: ChatService,
}

impl AppState {
    /// Build state from a validated config, wiring the HTTP chat backend
    /// when one is configured.
    pub fn from_config(config: AppConfig) -> Result<Self, ChatError> {
        let backend = HttpChatBackend::from_config(&config.chat)?
            .map(|b| Arc::new(b) as Arc<dyn ChatBackend>);
        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: AppConfig, backend: Option<Arc<dyn ChatBackend>>) -> Self {
        let store = LeagueStore::new(StorageConfig::new(config.data_dir.clone()));
        let reconciler = Reconciler::from_config(&config.matching);
        let chat = ChatService::new(
            backend,
            store.clone(),
            reconciler,
            config.aggregation.games_rule,
        )
        .with_chat_config(&config.chat)
        .with_observer(|reply| {
            tracing::debug!(
                source = ?reply.source,
                suggestions = reply.suggestions.len(),
                "Chat reply sent"
            );
        });

        Self {
            store,
            config: Arc::new(config),
            reconciler,
            chat,
        }
    }
}
