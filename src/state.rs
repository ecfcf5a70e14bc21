//! Application state: configuration, the shared gateway and the session registry.
//!
//! Each player session is an independent `GameSession`; the registry only
//! hands out `Arc`s and never holds its lock across a session operation.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::QuizConfig;
use crate::gateway::{BankGateway, GatewayError, HttpGateway, QuizGateway};
use crate::session::{GameSession, SessionError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<QuizConfig>,
    pub gateway: Arc<dyn QuizGateway>,
    sessions: Arc<RwLock<HashMap<String, Arc<GameSession>>>>,
}

impl AppState {
    pub fn new(config: QuizConfig, gateway: Arc<dyn QuizGateway>) -> Self {
        Self {
            config: Arc::new(config),
            gateway,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Remote gateway when a base URL is configured, otherwise the in-memory bank.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(config: QuizConfig) -> Result<Self, GatewayError> {
        let gateway: Arc<dyn QuizGateway> = match HttpGateway::from_config(&config.gateway)? {
            Some(http) => {
                info!(target: "million", base_url = %http.base_url, timeout_secs = config.gateway.timeout_secs, "Using remote quiz services");
                Arc::new(http)
            }
            None => {
                info!(target: "million", "No gateway base URL configured; serving the local question bank");
                Arc::new(BankGateway::from_config(&config))
            }
        };
        Ok(Self::new(config, gateway))
    }

    #[instrument(level = "info", skip(self))]
    pub async fn create_session(&self) -> Result<(String, Arc<GameSession>), SessionError> {
        let mut sessions = self.sessions.write().await;
        let limit = self.config.server.max_sessions;
        if sessions.len() >= limit {
            warn!(target: "million", limit, "Session limit reached");
            return Err(SessionError::TooManySessions(limit));
        }

        let id = Uuid::new_v4().to_string();
        let session = Arc::new(GameSession::new(
            id.clone(),
            self.gateway.clone(),
            self.config.server.max_questions,
        ));
        sessions.insert(id.clone(), session.clone());
        info!(target: "million", %id, gateway = self.gateway.name(), active = sessions.len(), "Session created");
        Ok((id, session))
    }

    pub async fn get_session(&self, id: &str) -> Result<Arc<GameSession>, SessionError> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::SessionNotFound(id.to_string()))
    }

    #[instrument(level = "info", skip(self))]
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            info!(target: "million", %id, "Session removed");
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
