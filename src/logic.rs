//! View bindings shared by both HTTP and WebSocket handlers.
//!
//! The session core never decides on its own to load something; these
//! helpers read the current state and trigger the load a screen needs.

use tracing::{debug, instrument};

use crate::domain::{AnswerId, Category};
use crate::protocol::AnswerOut;
use crate::session::{GameSession, SessionError};

/// The category a question screen shows: load the first one if none is set.
#[instrument(level = "info", skip(session), fields(session = %session.id()))]
pub async fn ensure_category(session: &GameSession) -> Result<Category, SessionError> {
  if let Some(category) = session.snapshot().category {
    return Ok(category);
  }
  debug!(target: "session", session = %session.id(), "No category yet; loading first");
  session.load_first_category().await
}

/// Load questions when a category is set but its questions are not.
#[instrument(level = "info", skip(session), fields(session = %session.id()))]
pub async fn ensure_questions(session: &GameSession) -> Result<(), SessionError> {
  let snap = session.snapshot();
  if snap.category.is_some() && snap.questions.is_empty() {
    session.load_questions().await?;
  }
  Ok(())
}

/// Category and questions, loading whatever is missing.
pub async fn prepare_round(session: &GameSession) -> Result<(), SessionError> {
  ensure_category(session).await?;
  ensure_questions(session).await
}

#[instrument(level = "info", skip(session), fields(session = %session.id()))]
pub async fn submit_answer(session: &GameSession, answer_id: AnswerId) -> Result<AnswerOut, SessionError> {
  let outcome = session.validate_answer(answer_id).await?;
  Ok(AnswerOut { outcome, game_state: session.game_state() })
}
