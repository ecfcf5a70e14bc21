//! In-memory gateway over a fixed bank of categories and questions.
//!
//! Category order is (difficulty, id): `fetch_first` returns the easiest
//! category and `fetch_next(d)` the easiest one strictly harder than `d`.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use super::{GatewayError, QuizGateway};
use crate::config::{BankQuestion, QuizConfig};
use crate::domain::{Answer, AnswerId, Category, CategoryId, Question};
use crate::seeds::seed_bank;

pub struct BankGateway {
  /// Sorted by (difficulty, id).
  categories: Vec<Category>,
  questions: HashMap<CategoryId, Vec<Question>>,
  correct: HashMap<AnswerId, bool>,
}

impl BankGateway {
  pub fn new(mut categories: Vec<Category>, bank_questions: Vec<BankQuestion>) -> Self {
    let mut seen = HashSet::new();
    categories.retain(|c| seen.insert(c.id));
    categories.sort_by_key(|c| (c.difficulty, c.id));

    let mut questions: HashMap<CategoryId, Vec<Question>> = HashMap::new();
    let mut correct = HashMap::new();
    for bq in bank_questions {
      for a in &bq.answers {
        correct.insert(a.id, a.correct);
      }
      questions.entry(bq.category_id).or_default().push(Question {
        id: bq.id,
        prompt: bq.prompt,
        answers: bq.answers.into_iter().map(|a| Answer { id: a.id, text: a.text }).collect(),
        reward: bq.reward,
        category_id: bq.category_id,
      });
    }

    Self { categories, questions, correct }
  }

  /// Built-in seeds with the TOML bank merged on top (config entries win on id clashes).
  pub fn from_config(cfg: &QuizConfig) -> Self {
    let (seed_categories, seed_questions) = seed_bank();

    let mut categories = cfg.categories.clone();
    for c in seed_categories {
      if !categories.iter().any(|x| x.id == c.id) {
        categories.push(c);
      }
    }
    let mut questions = cfg.questions.clone();
    for q in seed_questions {
      if !questions.iter().any(|x| x.id == q.id) {
        questions.push(q);
      }
    }

    let gw = Self::new(categories, questions);
    let max_questions = cfg.server.max_questions as usize;
    for c in &gw.categories {
      let count = gw.questions.get(&c.id).map_or(0, Vec::len);
      info!(target: "gateway", id = c.id, difficulty = c.difficulty, name = %c.name, questions = count, "Bank category");
      if count < max_questions {
        warn!(target: "gateway", id = c.id, questions = count, max_questions, "Bank category is short; its round ends after its last question");
      }
    }
    for c in gw.shadowed_categories() {
      warn!(target: "gateway", id = c.id, difficulty = c.difficulty, name = %c.name, "Bank category shares its difficulty with an earlier one and is never reached");
    }
    gw
  }

  /// Categories `fetch_next` can never return: all but the first of each
  /// difficulty.
  pub fn shadowed_categories(&self) -> impl Iterator<Item = &Category> {
    self.categories
      .windows(2)
      .filter(|pair| pair[0].difficulty == pair[1].difficulty)
      .map(|pair| &pair[1])
  }
}

#[async_trait]
impl QuizGateway for BankGateway {
  fn name(&self) -> &'static str {
    "bank"
  }

  #[instrument(level = "debug", skip(self))]
  async fn fetch_first(&self) -> Result<Category, GatewayError> {
    self.categories
      .first()
      .cloned()
      .ok_or_else(|| GatewayError::NotFound("first category".into()))
  }

  #[instrument(level = "debug", skip(self))]
  async fn fetch_next(&self, difficulty: u32) -> Result<Category, GatewayError> {
    self.categories
      .iter()
      .find(|c| c.difficulty > difficulty)
      .cloned()
      .ok_or_else(|| GatewayError::NotFound(format!("category after difficulty {difficulty}")))
  }

  #[instrument(level = "debug", skip(self))]
  async fn fetch_by_category(&self, category_id: CategoryId) -> Result<Vec<Question>, GatewayError> {
    if !self.categories.iter().any(|c| c.id == category_id) {
      return Err(GatewayError::NotFound(format!("category {category_id}")));
    }
    Ok(self.questions.get(&category_id).cloned().unwrap_or_default())
  }

  #[instrument(level = "debug", skip(self))]
  async fn validate_answer(&self, answer_id: AnswerId) -> Result<bool, GatewayError> {
    self.correct
      .get(&answer_id)
      .copied()
      .ok_or_else(|| GatewayError::NotFound(format!("answer {answer_id}")))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::{parse_config, BankAnswer};

  fn cat(id: u64, difficulty: u32) -> Category {
    Category { id, difficulty, name: format!("c{id}"), description: None }
  }

  fn question(id: u64, category_id: u64, correct_answer: u64) -> BankQuestion {
    BankQuestion {
      id,
      category_id,
      prompt: format!("q{id}"),
      reward: 10,
      answers: vec![
        BankAnswer { id: correct_answer, text: "yes".into(), correct: true },
        BankAnswer { id: correct_answer + 1, text: "no".into(), correct: false },
      ],
    }
  }

  #[tokio::test]
  async fn categories_follow_difficulty_then_id() {
    let gw = BankGateway::new(vec![cat(7, 2), cat(3, 1), cat(5, 1), cat(9, 4)], vec![]);

    assert_eq!(gw.fetch_first().await.unwrap().id, 3);
    assert_eq!(gw.fetch_next(0).await.unwrap().id, 3);
    assert_eq!(gw.fetch_next(1).await.unwrap().id, 7);
    assert_eq!(gw.fetch_next(2).await.unwrap().id, 9);
    assert!(matches!(gw.fetch_next(4).await, Err(GatewayError::NotFound(_))));
  }

  #[tokio::test]
  async fn same_difficulty_categories_after_the_first_are_shadowed() {
    let gw = BankGateway::new(vec![cat(7, 2), cat(3, 1), cat(5, 1), cat(9, 2), cat(4, 3)], vec![]);

    let shadowed: Vec<_> = gw.shadowed_categories().map(|c| c.id).collect();
    assert_eq!(shadowed, vec![5, 9]);
    // Walking the bank with fetch_next indeed skips them.
    assert_eq!(gw.fetch_next(1).await.unwrap().id, 7);
    assert_eq!(gw.fetch_next(2).await.unwrap().id, 4);

    let seeds = BankGateway::from_config(&QuizConfig::default());
    assert_eq!(seeds.shadowed_categories().count(), 0);
  }

  #[tokio::test]
  async fn empty_bank_has_no_first_category() {
    let gw = BankGateway::new(vec![], vec![]);
    assert!(matches!(gw.fetch_first().await, Err(GatewayError::NotFound(_))));
  }

  #[tokio::test]
  async fn questions_hide_correctness_but_validate_uses_it() {
    let gw = BankGateway::new(vec![cat(1, 1)], vec![question(10, 1, 100), question(11, 1, 110)]);

    let qs = gw.fetch_by_category(1).await.unwrap();
    assert_eq!(qs.iter().map(|q| q.id).collect::<Vec<_>>(), vec![10, 11]);
    assert_eq!(qs[0].answers.len(), 2);

    assert!(gw.validate_answer(100).await.unwrap());
    assert!(!gw.validate_answer(101).await.unwrap());
    assert!(matches!(gw.validate_answer(555).await, Err(GatewayError::NotFound(_))));
    assert!(matches!(gw.fetch_by_category(2).await, Err(GatewayError::NotFound(_))));
  }

  #[tokio::test]
  async fn config_bank_merges_over_seeds() {
    let cfg = parse_config(
      r#"
        [[categories]]
        id = 1
        difficulty = 0
        name = "Custom warmup"
      "#,
    )
    .unwrap();
    let gw = BankGateway::from_config(&cfg);

    let first = gw.fetch_first().await.unwrap();
    assert_eq!(first.name, "Custom warmup");
    // Seed questions for category 1 are still served.
    assert_eq!(gw.fetch_by_category(1).await.unwrap().len(), 5);
    assert_eq!(gw.fetch_next(0).await.unwrap().id, 2);
  }
}
