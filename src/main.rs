//! Million · Trivia Quiz Front-End Service
//!
//! - Document shell for the browser client + static client assets
//! - Per-player game sessions over an HTTP + WebSocket API
//! - Categories/questions from the remote quiz services, or from a local bank
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   QUIZ_CONFIG_PATH  : path to TOML config (server, gateway, document, optional bank)
//!   QUIZ_GATEWAY_URL  : base URL of the remote quiz services (overrides the TOML value)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod gateway;
mod session;
mod state;
mod protocol;
mod logic;
mod document;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::load_config_from_env;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, gateway (remote or bank) and the session registry.
  let state = Arc::new(AppState::from_config(load_config_from_env())?);

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "million", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "million", active_sessions = state.session_count().await, "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "million", error = %e, "Could not listen for ctrl-c; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "million", "Shutdown signal received");
}
