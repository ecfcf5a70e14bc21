//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AnswerId, Category, Question};
use crate::gateway::GatewayError;
use crate::session::{AnswerOutcome, GameState, SessionError, SessionState};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    /// Load the first category unless one is already set.
    LoadCategory,
    LoadNextCategory,
    LoadQuestions,
    /// Load category and questions, whichever is missing.
    PrepareRound,
    SubmitAnswer {
        #[serde(rename = "answerId")]
        answer_id: AnswerId,
    },
    Reset,
    GetState,
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Session {
        #[serde(rename = "sessionId")]
        session_id: String,
        state: SessionState,
    },
    State {
        state: SessionState,
    },
    AnswerResult {
        outcome: AnswerOutcome,
        #[serde(rename = "gameState")]
        game_state: GameState,
    },
    Error {
        code: &'static str,
        message: String,
    },
}

impl ServerWsMessage {
    pub fn error(e: &SessionError) -> Self {
        let (_, code) = error_status(e);
        ServerWsMessage::Error { code, message: e.to_string() }
    }
}

/// HTTP status and stable error code for a session error.
pub fn error_status(e: &SessionError) -> (u16, &'static str) {
    match e {
        SessionError::SessionNotFound(_) => (404, "session_not_found"),
        SessionError::GameOver => (409, "game_over"),
        SessionError::MissingQuestion { .. } => (409, "missing_question"),
        SessionError::UnknownAnswer { .. } => (400, "unknown_answer"),
        SessionError::TooManySessions(_) => (503, "too_many_sessions"),
        SessionError::Gateway(GatewayError::NotFound(_)) => (404, "not_found"),
        SessionError::Gateway(_) => (502, "gateway_error"),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub state: SessionState,
}

#[derive(Serialize)]
pub struct CategoryOut {
    pub category: Option<Category>,
}

#[derive(Serialize)]
pub struct QuestionsOut {
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "answerId")]
    pub answer_id: AnswerId,
}

#[derive(Serialize)]
pub struct AnswerOut {
    pub outcome: AnswerOutcome,
    #[serde(rename = "gameState")]
    pub game_state: GameState,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}
