//! HTTP endpoint handlers. These are thin wrappers that forward to the session
//! core and the view bindings in `logic`.

use std::sync::Arc;

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::logic::{ensure_category, prepare_round, submit_answer};
use crate::protocol::*;
use crate::session::{GameState, SessionError, SessionState};
use crate::state::AppState;

/// `SessionError` at the HTTP edge: status from `error_status`, JSON body.
pub struct ApiError(pub SessionError);

impl From<SessionError> for ApiError {
  fn from(e: SessionError) -> Self {
    ApiError(e)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, code) = error_status(&self.0);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
      warn!(target: "million", %status, code, error = %self.0, "Request failed");
    }
    let body = ErrorOut { error: ErrorBody { code, message: self.0.to_string() } };
    (status, Json(body)).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state))]
pub async fn http_create_session(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
  let (session_id, session) = state.create_session().await?;
  Ok((StatusCode::CREATED, Json(SessionOut { session_id, state: session.snapshot() })))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<SessionState> {
  let session = state.get_session(&id).await?;
  Ok(Json(session.snapshot()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_delete_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
  if state.remove_session(&id).await {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(SessionError::SessionNotFound(id).into())
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_game_state(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<GameState> {
  let session = state.get_session(&id).await?;
  Ok(Json(session.game_state()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_category(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<CategoryOut> {
  let session = state.get_session(&id).await?;
  let category = ensure_category(&session).await?;
  Ok(Json(CategoryOut { category: Some(category) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_load_first_category(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<CategoryOut> {
  let session = state.get_session(&id).await?;
  let category = session.load_first_category().await?;
  Ok(Json(CategoryOut { category: Some(category) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_load_next_category(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<CategoryOut> {
  let session = state.get_session(&id).await?;
  let category = session.load_next_category().await?;
  Ok(Json(CategoryOut { category: Some(category) }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_load_questions(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<QuestionsOut> {
  let session = state.get_session(&id).await?;
  session.load_questions().await?;
  Ok(Json(QuestionsOut { questions: session.snapshot().questions }))
}

/// Load whatever the question screen still needs and return the full state.
#[instrument(level = "info", skip(state))]
pub async fn http_prepare_round(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<SessionState> {
  let session = state.get_session(&id).await?;
  prepare_round(&session).await?;
  Ok(Json(session.snapshot()))
}

#[instrument(level = "info", skip(state, body), fields(answer_id = body.answer_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<AnswerIn>,
) -> ApiResult<AnswerOut> {
  let session = state.get_session(&id).await?;
  let out = submit_answer(&session, body.answer_id).await?;
  info!(target: "session", session = %id, answer_id = body.answer_id, score = out.game_state.score, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<SessionState> {
  let session = state.get_session(&id).await?;
  session.reset().await;
  Ok(Json(session.snapshot()))
}
