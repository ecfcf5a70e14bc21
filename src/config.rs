//! Loading service configuration (server limits, gateway, document shell and an
//! optional question bank) from TOML, with environment overrides.
//!
//! See `QuizConfig` for the expected schema. Every section is optional.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{AnswerId, Category, CategoryId, QuestionId};

/// Questions answered per category before rolling into the next one.
pub const DEFAULT_MAX_QUESTIONS: u32 = 5;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct QuizConfig {
  #[serde(default)]
  pub server: ServerConfig,
  #[serde(default)]
  pub gateway: GatewayConfig,
  #[serde(default)]
  pub document: DocumentConfig,
  /// Local bank. Used only when no remote gateway is configured.
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(default)]
  pub questions: Vec<BankQuestion>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub max_sessions: usize,
  pub max_questions: u32,
  pub static_dir: String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { max_sessions: 1024, max_questions: DEFAULT_MAX_QUESTIONS, static_dir: "./static".into() }
  }
}

/// Remote category/question services. Without `base_url` the bank gateway is used.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
  pub base_url: Option<String>,
  pub timeout_secs: u64,
  pub user_agent: String,
}

impl Default for GatewayConfig {
  fn default() -> Self {
    Self { base_url: None, timeout_secs: 10, user_agent: "million-quiz/0.1".into() }
  }
}

/// Document shell settings. Defaults reproduce the stock page (Open Sans + Material Symbols).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
  pub title: String,
  pub lang: String,
  pub font_preconnect: String,
  pub font_urls: Vec<String>,
  pub script_src: String,
}

impl Default for DocumentConfig {
  fn default() -> Self {
    Self {
      title: "Million".into(),
      lang: "en".into(),
      font_preconnect: "https://fonts.googleapis.com".into(),
      font_urls: vec![
        "https://fonts.googleapis.com/css2?family=Open+Sans:ital,wght@0,300;0,400;0,500;0,600;0,700;0,800;1,300;1,400;1,500;1,600;1,700;1,800&display=swap".into(),
        "https://fonts.googleapis.com/css2?family=Material+Symbols+Rounded:opsz,wght,FILL,GRAD@24,200,0,0&display=swap".into(),
      ],
      script_src: "/app.js".into(),
    }
  }
}

/// Question entry accepted in the TOML bank. Unlike the domain `Question`,
/// answers carry their correctness flag.
#[derive(Clone, Debug, Deserialize)]
pub struct BankQuestion {
  pub id: QuestionId,
  pub category_id: CategoryId,
  pub prompt: String,
  #[serde(default)]
  pub reward: u32,
  #[serde(default)]
  pub answers: Vec<BankAnswer>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BankAnswer {
  pub id: AnswerId,
  pub text: String,
  #[serde(default)]
  pub correct: bool,
}

pub fn parse_config(s: &str) -> Result<QuizConfig, toml::de::Error> {
  toml::from_str::<QuizConfig>(s)
}

/// Load `QuizConfig` from QUIZ_CONFIG_PATH (defaults on any IO/parse error),
/// then apply QUIZ_GATEWAY_URL.
pub fn load_config_from_env() -> QuizConfig {
  let mut cfg = match std::env::var("QUIZ_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match parse_config(&s) {
        Ok(cfg) => {
          info!(target: "million", %path, "Loaded quiz config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "million", %path, error = %e, "Failed to parse TOML config; using defaults");
          QuizConfig::default()
        }
      },
      Err(e) => {
        error!(target: "million", %path, error = %e, "Failed to read TOML config file; using defaults");
        QuizConfig::default()
      }
    },
    Err(_) => QuizConfig::default(),
  };

  if let Ok(url) = std::env::var("QUIZ_GATEWAY_URL") {
    if !url.trim().is_empty() {
      cfg.gateway.base_url = Some(url.trim().to_string());
    }
  }
  if cfg.server.max_questions == 0 {
    error!(target: "million", "server.max_questions must be at least 1; using default");
    cfg.server.max_questions = DEFAULT_MAX_QUESTIONS;
  }
  cfg
}
