//! WebSocket upgrade + message loop.
//!
//! Each connection owns one session, created on connect and dropped on
//! disconnect. Client messages are parsed as JSON and forwarded to the view
//! bindings; every committed state change is pushed as a `state` message.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::{ensure_category, prepare_round, submit_answer};
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::GameSession;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "million", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn send_json(socket: &mut WebSocket, msg: &ServerWsMessage) -> Result<(), axum::Error> {
  let out = serde_json::to_string(msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "code": "internal", "message": format!("Serialization error: {}", e) }).to_string()
  });
  socket.send(Message::Text(out)).await
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  let (session_id, session) = match state.create_session().await {
    Ok(created) => created,
    Err(e) => {
      error!(target: "million", error = %e, "WebSocket session could not be created");
      let _ = send_json(&mut socket, &ServerWsMessage::error(&e)).await;
      return;
    }
  };
  info!(target: "million", session = %session_id, "WebSocket connected");

  let mut changes = session.subscribe();
  let hello = ServerWsMessage::Session { session_id: session_id.clone(), state: changes.borrow_and_update().clone() };
  if send_json(&mut socket, &hello).await.is_ok() {
    loop {
      tokio::select! {
        incoming = socket.recv() => {
          let Some(Ok(msg)) = incoming else { break };
          let reply = match msg {
            Message::Text(txt) => match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(cmd) => {
                debug!(target: "million", session = %session_id, "WS received: {:?}", &cmd);
                handle_client_ws(cmd, &session).await
              }
              Err(e) => Some(ServerWsMessage::Error { code: "invalid_message", message: format!("Invalid JSON: {}", e) }),
            },
            Message::Ping(payload) => {
              let _ = socket.send(Message::Pong(payload)).await;
              None
            }
            Message::Close(_) => break,
            _ => None,
          };
          if let Some(reply) = reply {
            if let Err(e) = send_json(&mut socket, &reply).await {
              error!(target: "million", session = %session_id, error = %e, "WS send error");
              break;
            }
          }
        }
        changed = changes.changed() => {
          if changed.is_err() {
            break;
          }
          let state_msg = ServerWsMessage::State { state: changes.borrow_and_update().clone() };
          if let Err(e) = send_json(&mut socket, &state_msg).await {
            error!(target: "million", session = %session_id, error = %e, "WS send error");
            break;
          }
        }
      }
    }
  }

  state.remove_session(&session_id).await;
  info!(target: "million", session = %session_id, "WebSocket disconnected");
}

/// Run one client command. Mutations are reported through the change stream,
/// so only pings, reads, answers and errors get a direct reply.
#[instrument(level = "info", skip(session), fields(session = %session.id()))]
async fn handle_client_ws(msg: ClientWsMessage, session: &GameSession) -> Option<ServerWsMessage> {
  let result = match msg {
    ClientWsMessage::Ping => return Some(ServerWsMessage::Pong),
    ClientWsMessage::GetState => return Some(ServerWsMessage::State { state: session.snapshot() }),
    ClientWsMessage::LoadCategory => ensure_category(session).await.map(|_| None),
    ClientWsMessage::LoadNextCategory => session.load_next_category().await.map(|_| None),
    ClientWsMessage::LoadQuestions => session.load_questions().await.map(|_| None),
    ClientWsMessage::PrepareRound => prepare_round(session).await.map(|_| None),
    ClientWsMessage::SubmitAnswer { answer_id } => submit_answer(session, answer_id)
      .await
      .map(|out| Some(ServerWsMessage::AnswerResult { outcome: out.outcome, game_state: out.game_state })),
    ClientWsMessage::Reset => {
      session.reset().await;
      Ok(None)
    }
  };
  result.unwrap_or_else(|e| Some(ServerWsMessage::error(&e)))
}
