//! Game session state manager.
//!
//! One `GameSession` per player. It owns the session state and the only path
//! to mutate it. Mutating operations are serialized: each holds `op_lock`
//! across its gateway calls, so overlapping calls run one after another in
//! arrival order. The state itself lives in a `watch` channel; reads and
//! subscribers see the last committed state and never wait on a gateway.
//!
//! Question indexing: `current_question` is 1-based and the current question
//! is `questions[current_question - 1]`. A correct answer on the last question
//! (position `max_questions`, or the end of a shorter question list) rolls into
//! the next category. Its reward, the new category, its questions and
//! `current_question = 1` are committed together; a failed rollover commits
//! nothing. When no harder category exists the game is won and over.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::domain::{AnswerId, Category, Question, QuestionId};
use crate::gateway::{GatewayError, QuizGateway};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
  #[error(transparent)]
  Gateway(#[from] GatewayError),
  #[error("game is over; reset the session to play again")]
  GameOver,
  #[error("no question at position {index} ({available} loaded)")]
  MissingQuestion { index: u32, available: usize },
  #[error("answer {answer_id} does not belong to question {question_id}")]
  UnknownAnswer { answer_id: AnswerId, question_id: QuestionId },
  #[error("unknown session {0}")]
  SessionNotFound(String),
  #[error("session limit of {0} reached")]
  TooManySessions(usize),
}

/// Full session state as published to readers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
  pub category: Option<Category>,
  pub score: u64,
  pub current_question: u32,
  pub max_questions: u32,
  pub questions: Vec<Question>,
  pub game_over: bool,
}

impl SessionState {
  pub fn initial(max_questions: u32) -> Self {
    Self {
      category: None,
      score: 0,
      current_question: 1,
      max_questions,
      questions: Vec::new(),
      game_over: false,
    }
  }

  /// The question currently being answered, if loaded.
  pub fn current(&self) -> Option<&Question> {
    let idx = self.current_question.checked_sub(1)? as usize;
    self.questions.get(idx)
  }

  pub fn game_state(&self) -> GameState {
    GameState {
      score: self.score,
      current_question: self.current_question,
      max_questions: self.max_questions,
    }
  }
}

/// The progress slice a score bar binds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
  pub score: u64,
  pub current_question: u32,
  pub max_questions: u32,
}

/// Result of a validated answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerOutcome {
  /// Correct; moved to the next question of the same category.
  Correct { reward: u32 },
  /// Correct on the last question; the session moved to `next`.
  CategoryComplete { reward: u32, next: Category },
  /// Incorrect; the session is over until reset.
  GameOver,
  /// Correct on the last question of the hardest category. The game is over
  /// until reset.
  Won { reward: u32 },
}

pub struct GameSession {
  id: String,
  gateway: Arc<dyn QuizGateway>,
  max_questions: u32,
  op_lock: Mutex<()>,
  state: watch::Sender<SessionState>,
}

impl GameSession {
  pub fn new(id: impl Into<String>, gateway: Arc<dyn QuizGateway>, max_questions: u32) -> Self {
    let max_questions = max_questions.max(1);
    let (state, _) = watch::channel(SessionState::initial(max_questions));
    Self { id: id.into(), gateway, max_questions, op_lock: Mutex::new(()), state }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn snapshot(&self) -> SessionState {
    self.state.borrow().clone()
  }

  pub fn game_state(&self) -> GameState {
    self.state.borrow().game_state()
  }

  /// Change stream; yields every committed state.
  pub fn subscribe(&self) -> watch::Receiver<SessionState> {
    self.state.subscribe()
  }

  /// Fetch the first category and make it current.
  /// The caller decides whether a load is needed (see `logic::ensure_category`).
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn load_first_category(&self) -> Result<Category, SessionError> {
    let _op = self.op_lock.lock().await;
    self.ensure_active()?;

    let category = self.gateway.fetch_first().await?;
    self.replace_category(category.clone());
    Ok(category)
  }

  /// Fetch the category following the current difficulty (0 without a category).
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn load_next_category(&self) -> Result<Category, SessionError> {
    let _op = self.op_lock.lock().await;
    self.ensure_active()?;

    let category = self.fetch_next_category().await?;
    self.replace_category(category.clone());
    Ok(category)
  }

  /// Load questions for the current category. No-op without a category.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn load_questions(&self) -> Result<(), SessionError> {
    let _op = self.op_lock.lock().await;
    self.ensure_active()?;

    let Some(category_id) = self.state.borrow().category.as_ref().map(|c| c.id) else {
      debug!(target: "session", session = %self.id, "No category yet; skipping question load");
      return Ok(());
    };

    let questions = self.gateway.fetch_by_category(category_id).await?;
    let count = questions.len();
    self.state.send_modify(|s| {
      s.questions = questions;
    });
    info!(target: "session", session = %self.id, category_id, count, "Questions loaded");
    Ok(())
  }

  /// Validate an answer to the current question and advance the session.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn validate_answer(&self, answer_id: AnswerId) -> Result<AnswerOutcome, SessionError> {
    let _op = self.op_lock.lock().await;
    self.ensure_active()?;

    let (index, reward, last) = {
      let s = self.state.borrow();
      let Some(q) = s.current() else {
        return Err(SessionError::MissingQuestion { index: s.current_question, available: s.questions.len() });
      };
      if !q.answers.iter().any(|a| a.id == answer_id) {
        warn!(target: "session", session = %self.id, answer_id, question_id = q.id, "Answer is not an option of the current question");
        return Err(SessionError::UnknownAnswer { answer_id, question_id: q.id });
      }
      let last = s.current_question >= s.max_questions || s.current_question as usize >= s.questions.len();
      (s.current_question, q.reward, last)
    };

    let correct = self.gateway.validate_answer(answer_id).await?;
    if !correct {
      self.state.send_modify(|s| s.game_over = true);
      info!(target: "session", session = %self.id, answer_id, index, score = self.state.borrow().score, "Wrong answer; game over");
      return Ok(AnswerOutcome::GameOver);
    }

    if !last {
      self.state.send_modify(|s| {
        s.score = s.score.saturating_add(u64::from(reward));
        s.current_question += 1;
      });
      debug!(target: "session", session = %self.id, answer_id, index, reward, "Correct answer");
      return Ok(AnswerOutcome::Correct { reward });
    }

    // Rollover. Nothing is committed until the next category and its
    // questions are both in hand.
    let next = match self.fetch_next_category().await {
      Ok(next) => next,
      Err(GatewayError::NotFound(what)) => {
        self.state.send_modify(|s| {
          s.score = s.score.saturating_add(u64::from(reward));
          s.game_over = true;
        });
        info!(target: "session", session = %self.id, %what, score = self.state.borrow().score, "No harder category; game won");
        return Ok(AnswerOutcome::Won { reward });
      }
      Err(e) => return Err(e.into()),
    };
    let questions = self.gateway.fetch_by_category(next.id).await?;
    self.state.send_modify(|s| {
      s.score = s.score.saturating_add(u64::from(reward));
      s.category = Some(next.clone());
      s.questions = questions;
      s.current_question = 1;
    });
    info!(target: "session", session = %self.id, next_id = next.id, difficulty = next.difficulty, "Category complete; rolled into next category");
    Ok(AnswerOutcome::CategoryComplete { reward, next })
  }

  /// Back to initial values. Waits for an in-flight operation to finish first.
  #[instrument(level = "info", skip(self), fields(session = %self.id))]
  pub async fn reset(&self) {
    let _op = self.op_lock.lock().await;
    self.state.send_replace(SessionState::initial(self.max_questions));
    info!(target: "session", session = %self.id, "Session reset");
  }

  fn ensure_active(&self) -> Result<(), SessionError> {
    if self.state.borrow().game_over {
      warn!(target: "session", session = %self.id, "Rejected operation on finished game");
      return Err(SessionError::GameOver);
    }
    Ok(())
  }

  async fn fetch_next_category(&self) -> Result<Category, GatewayError> {
    let difficulty = self.state.borrow().category.as_ref().map_or(0, |c| c.difficulty);
    self.gateway.fetch_next(difficulty).await
  }

  /// Questions always belong to the current category, so a new category drops them.
  fn replace_category(&self, category: Category) {
    info!(target: "session", session = %self.id, id = category.id, difficulty = category.difficulty, name = %category.name, "Category loaded");
    self.state.send_modify(|s| {
      s.category = Some(category);
      s.questions.clear();
    });
  }
}
