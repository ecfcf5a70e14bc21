//! Minimal client for the remote category/question services.
//!
//! Layout relative to the configured base URL:
//!   GET  /categories/first
//!   GET  /categories/next?difficulty={d}
//!   GET  /categories/{id}/questions
//!   POST /answers/{id}/validate
//!
//! Calls are instrumented and log status, latency and body sizes (not contents).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{GatewayError, QuizGateway};
use crate::config::GatewayConfig;
use crate::domain::{AnswerId, Category, CategoryId, Question};
use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct HttpGateway {
  pub client: reqwest::Client,
  pub base_url: String,
  pub user_agent: String,
}

/// The validation endpoint answers either a bare boolean or an object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ValidateOut {
  Flag(bool),
  Obj {
    #[serde(alias = "result", alias = "valid")]
    correct: bool,
  },
}

impl HttpGateway {
  pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, GatewayError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.trim_end_matches('/').to_string(),
      user_agent: user_agent.to_string(),
    })
  }

  /// Construct the client if a base URL is configured; otherwise return Ok(None).
  pub fn from_config(cfg: &GatewayConfig) -> Result<Option<Self>, GatewayError> {
    match cfg.base_url.as_deref().map(str::trim) {
      Some(url) if !url.is_empty() => {
        Self::new(url, Duration::from_secs(cfg.timeout_secs), &cfg.user_agent).map(Some)
      }
      _ => Ok(None),
    }
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  /// Send, check the status and decode a JSON body into T.
  /// `what` names the requested resource for NotFound errors.
  async fn send_json<T: for<'a> Deserialize<'a>>(&self, req: RequestBuilder, what: String) -> Result<T, GatewayError> {
    let start = Instant::now();
    let res = req
      .header(USER_AGENT, &self.user_agent)
      .header(ACCEPT, "application/json")
      .send()
      .await?;

    let status = res.status();
    let body = res.text().await?;
    debug!(target: "gateway", %status, elapsed = ?start.elapsed(), body_len = body.len(), "Gateway response");

    if status == StatusCode::NOT_FOUND {
      return Err(GatewayError::NotFound(what));
    }
    if !status.is_success() {
      let message = extract_error_message(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      warn!(target: "gateway", %status, %message, "Gateway returned an error status");
      return Err(GatewayError::Status { status: status.as_u16(), message });
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
      warn!(target: "gateway", error = %e, body = %trunc_for_log(&body, 200), "Undecodable gateway body");
      GatewayError::Decode(e.to_string())
    })
  }
}

#[async_trait]
impl QuizGateway for HttpGateway {
  fn name(&self) -> &'static str {
    "http"
  }

  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn fetch_first(&self) -> Result<Category, GatewayError> {
    let req = self.client.get(self.url("/categories/first"));
    self.send_json(req, "first category".into()).await
  }

  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn fetch_next(&self, difficulty: u32) -> Result<Category, GatewayError> {
    let req = self
      .client
      .get(self.url("/categories/next"))
      .query(&[("difficulty", difficulty)]);
    self.send_json(req, format!("category after difficulty {difficulty}")).await
  }

  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn fetch_by_category(&self, category_id: CategoryId) -> Result<Vec<Question>, GatewayError> {
    let req = self.client.get(self.url(&format!("/categories/{category_id}/questions")));
    self.send_json(req, format!("category {category_id}")).await
  }

  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn validate_answer(&self, answer_id: AnswerId) -> Result<bool, GatewayError> {
    let req = self.client.post(self.url(&format!("/answers/{answer_id}/validate")));
    let out: ValidateOut = self.send_json(req, format!("answer {answer_id}")).await?;
    Ok(match out {
      ValidateOut::Flag(b) => b,
      ValidateOut::Obj { correct } => correct,
    })
  }
}

/// Try to extract a clean error message from an error body:
/// `{"error":{"message":..}}`, `{"error":".."}` or `{"message":..}`.
fn extract_error_message(body: &str) -> Option<String> {
  let v: serde_json::Value = serde_json::from_str(body).ok()?;
  let msg = v
    .pointer("/error/message")
    .or_else(|| v.get("error"))
    .or_else(|| v.get("message"))?;
  msg.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::{
    extract::{Path, Query},
    http::StatusCode as AxStatus,
    routing::{get, post},
    Json, Router,
  };
  use std::collections::HashMap;

  /// Serve a fake remote on an ephemeral port and return its base URL.
  async fn spawn_remote() -> String {
    let app = Router::new()
      .route(
        "/api/categories/first",
        get(|| async { Json(serde_json::json!({"id": 1, "difficulty": 1, "name": "Warmup"})) }),
      )
      .route(
        "/api/categories/next",
        get(|Query(q): Query<HashMap<String, String>>| async move {
          match q.get("difficulty").map(String::as_str) {
            Some("1") => Ok(Json(serde_json::json!({"id": 2, "difficulty": 2, "name": "Harder"}))),
            _ => Err(AxStatus::NOT_FOUND),
          }
        }),
      )
      .route(
        "/api/categories/:id/questions",
        get(|Path(id): Path<u64>| async move {
          if id == 1 {
            Ok(Json(serde_json::json!([
              {"id": 11, "prompt": "2+2?", "answers": [{"id": 111, "text": "4"}], "reward": 10, "categoryId": 1}
            ])))
          } else {
            Err((AxStatus::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"error": {"message": "db down"}}))))
          }
        }),
      )
      .route(
        "/api/answers/:id/validate",
        post(|Path(id): Path<u64>| async move {
          match id {
            111 => Json(serde_json::json!(true)),
            112 => Json(serde_json::json!({"correct": false})),
            _ => Json(serde_json::json!("garbage")),
          }
        }),
      );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/")
  }

  fn gateway(base: &str) -> HttpGateway {
    HttpGateway::new(base, Duration::from_secs(5), "million-quiz/test").unwrap()
  }

  #[tokio::test]
  async fn fetches_categories_and_questions() {
    let gw = gateway(&spawn_remote().await);

    let first = gw.fetch_first().await.unwrap();
    assert_eq!((first.id, first.difficulty), (1, 1));

    let next = gw.fetch_next(1).await.unwrap();
    assert_eq!(next.name, "Harder");

    let questions = gw.fetch_by_category(1).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].reward, 10);
  }

  #[tokio::test]
  async fn maps_error_statuses() {
    let gw = gateway(&spawn_remote().await);

    assert!(matches!(gw.fetch_next(9).await, Err(GatewayError::NotFound(_))));
    match gw.fetch_by_category(2).await {
      Err(GatewayError::Status { status, message }) => {
        assert_eq!(status, 500);
        assert_eq!(message, "db down");
      }
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[tokio::test]
  async fn validate_accepts_bool_or_object_and_rejects_garbage() {
    let gw = gateway(&spawn_remote().await);

    assert!(gw.validate_answer(111).await.unwrap());
    assert!(!gw.validate_answer(112).await.unwrap());
    assert!(matches!(gw.validate_answer(999).await, Err(GatewayError::Decode(_))));
  }

  #[tokio::test]
  async fn unreachable_remote_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let gw = gateway(&format!("http://{addr}"));
    assert!(matches!(gw.fetch_first().await, Err(GatewayError::Network(_))));
  }

  #[test]
  fn from_config_requires_a_base_url() {
    let mut cfg = GatewayConfig::default();
    assert!(HttpGateway::from_config(&cfg).unwrap().is_none());
    cfg.base_url = Some("http://example.test/".into());
    let gw = HttpGateway::from_config(&cfg).unwrap().unwrap();
    assert_eq!(gw.base_url, "http://example.test");
  }

  #[test]
  fn extracts_error_messages_from_common_shapes() {
    assert_eq!(extract_error_message(r#"{"error":{"message":"a"}}"#).as_deref(), Some("a"));
    assert_eq!(extract_error_message(r#"{"error":"b"}"#).as_deref(), Some("b"));
    assert_eq!(extract_error_message(r#"{"message":"c"}"#).as_deref(), Some("c"));
    assert_eq!(extract_error_message("plain text"), None);
  }
}
