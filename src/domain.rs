//! Domain models used by the backend: subjects, riddles, and the knowledge card.

use serde::{Deserialize, Serialize};

/// Difficulty tiers offered by the game.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  /// Chinese label shown to players and in the admin table.
  pub fn label(&self) -> &'static str {
    match self {
      Difficulty::Easy => "简单",
      Difficulty::Medium => "中等",
      Difficulty::Hard => "困难",
    }
  }
}

impl Default for Difficulty {
  fn default() -> Self { Difficulty::Easy }
}

/// Where did we get the riddle from?
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RiddleSource {
  Bank,   // from user-provided TOML bank
  Admin,  // created at runtime through the admin surface
  Seed,   // built-in seeds (last resort)
}

/// A subject card grouping riddles (数学, 物理, ...). Keyed by id in the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subject {
  pub name: String,
  #[serde(default = "default_subject_color")]
  pub color: String,
}

pub fn default_subject_color() -> String {
  "#3b82f6".into()
}

/// Knowledge card revealed together with the answer.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Knowledge {
  #[serde(default)] pub title: String,
  #[serde(default)] pub content: String,
  #[serde(default)] pub related_questions: Vec<String>,
}

/// Core riddle structure persisted in-memory.
///
/// `keywords` and `clues` are validated at the admin/config boundary
/// (keywords non-empty, at least 3 clues); the oracle relies on that and
/// never re-validates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Riddle {
  pub id: String,
  pub subject: String,
  pub difficulty: Difficulty,
  pub question: String,
  /// Suggested solving time in minutes.
  pub time: u32,
  pub keywords: Vec<String>,
  pub clues: Vec<String>,
  pub answer: String,
  pub textbook: String,
  pub knowledge: Knowledge,
  pub source: RiddleSource,
  pub created_at_ms: u64,
}

/// Which store changed; pushed to WebSocket clients after mutations.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeScope {
  Subjects,
  Riddles,
}
