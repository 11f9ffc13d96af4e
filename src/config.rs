//! Loading game configuration (admin secret + optional subject/riddle bank) from TOML.
//!
//! See `GameConfig` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{Difficulty, Knowledge};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct GameConfig {
  #[serde(default)]
  pub admin: AdminCfg,
  #[serde(default)]
  pub subjects: Vec<SubjectCfg>,
  #[serde(default)]
  pub riddles: Vec<RiddleCfg>,
}

/// Admin shared secret, checked exactly once at login.
#[derive(Clone, Debug, Deserialize)]
pub struct AdminCfg {
  #[serde(default = "default_admin_password")]
  pub password: String,
}

impl Default for AdminCfg {
  fn default() -> Self {
    Self { password: default_admin_password() }
  }
}

fn default_admin_password() -> String {
  "419904".into()
}

/// Subject entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct SubjectCfg {
  pub id: String,
  pub name: String,
  #[serde(default)] pub color: Option<String>,
}

/// Riddle entry accepted in TOML configuration.
/// Entries failing the riddle invariants (keywords, clues, answer) are
/// skipped at startup with an error log, never fatal.
#[derive(Clone, Debug, Deserialize)]
pub struct RiddleCfg {
  #[serde(default)] pub id: Option<String>,
  pub subject: String,
  pub difficulty: Difficulty,
  pub question: String,
  #[serde(default = "default_time")] pub time: u32,
  pub keywords: Vec<String>,
  pub clues: Vec<String>,
  pub answer: String,
  #[serde(default)] pub textbook: String,
  #[serde(default)] pub knowledge: Knowledge,
}

fn default_time() -> u32 {
  5
}

/// Attempt to load `GameConfig` from GAME_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_game_config_from_env() -> Option<GameConfig> {
  let path = std::env::var("GAME_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<GameConfig>(&s) {
      Ok(cfg) => {
        info!(target: "turtlesoup_backend", %path, "Loaded game config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "turtlesoup_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "turtlesoup_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
