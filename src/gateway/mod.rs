//! Boundary to the category/question services.
//!
//! The session core only ever talks to a `QuizGateway`. Two implementations:
//!   - `HttpGateway`: the remote services over HTTP/JSON
//!   - `BankGateway`: an in-memory bank (built-in seeds or the TOML bank)

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AnswerId, Category, CategoryId, Question};

pub mod bank;
pub mod http;

pub use bank::BankGateway;
pub use http::HttpGateway;

/// Failures reported by a gateway. The core does not classify them further.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
  #[error("gateway request failed: {0}")]
  Network(#[from] reqwest::Error),
  #[error("{0} not found")]
  NotFound(String),
  #[error("gateway returned HTTP {status}: {message}")]
  Status { status: u16, message: String },
  #[error("gateway response could not be decoded: {0}")]
  Decode(String),
}

#[async_trait]
pub trait QuizGateway: Send + Sync {
  /// Short label used in logs.
  fn name(&self) -> &'static str;

  async fn fetch_first(&self) -> Result<Category, GatewayError>;

  async fn fetch_next(&self, difficulty: u32) -> Result<Category, GatewayError>;

  async fn fetch_by_category(&self, category_id: CategoryId) -> Result<Vec<Question>, GatewayError>;

  /// `true` when the answer is correct.
  async fn validate_answer(&self, answer_id: AnswerId) -> Result<bool, GatewayError>;
}
