//! Domain models shared by the session core, the gateways and the protocol layer.

use serde::{Deserialize, Serialize};

pub type CategoryId = u64;
pub type QuestionId = u64;
pub type AnswerId = u64;

/// A topic/difficulty bucket grouping questions. Replaced wholesale on each load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id: CategoryId,
  #[serde(default)]
  pub difficulty: u32,
  #[serde(default)]
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

/// One selectable answer. Correctness is only known to the gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
  pub id: AnswerId,
  #[serde(alias = "label")]
  pub text: String,
}

/// A single quiz item; `reward` is added to the score on a correct answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
  pub id: QuestionId,
  #[serde(alias = "text", alias = "question")]
  pub prompt: String,
  #[serde(default)]
  pub answers: Vec<Answer>,
  #[serde(default)]
  pub reward: u32,
  #[serde(alias = "category_id")]
  pub category_id: CategoryId,
}
