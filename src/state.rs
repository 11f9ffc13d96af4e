//! Application state: in-memory stores, admin sessions, and the change feed.
//!
//! This module owns:
//!   - the subject and riddle stores (id-keyed maps)
//!   - admin session tokens minted at login
//!   - the broadcast channel that fans out store changes to WebSocket clients
//!
//! Store contents come from TOML config when provided, with built-in seeds
//! as the fallback. All mutation goes through methods here so that every
//! change emits exactly one change event.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::config::{load_game_config_from_env, GameConfig};
use crate::domain::{default_subject_color, ChangeScope, Difficulty, Riddle, RiddleSource, Subject};
use crate::seeds::{seed_riddles, seed_subjects};
use crate::util::now_ms;

/// Capacity of the change feed; a lagging consumer misses events and is
/// expected to resync by re-fetching.
const CHANGE_FEED_CAPACITY: usize = 32;

/// Proof of a validated admin session. Only `AppState::open_session` and
/// `AppState::authorize` construct one; operations downstream accept it
/// instead of re-checking credentials.
#[derive(Clone, Debug)]
pub struct AdminSession {
    token: String,
}

impl AdminSession {
    pub fn token(&self) -> &str {
        &self.token
    }
}

#[derive(Clone)]
pub struct AppState {
    pub subjects: Arc<RwLock<HashMap<String, Subject>>>,
    pub riddles: Arc<RwLock<HashMap<String, Riddle>>>,
    sessions: Arc<RwLock<HashSet<String>>>,
    changes: broadcast::Sender<ChangeScope>,
    admin_password: String,
}

impl AppState {
    /// Build state from env: load TOML config, seed stores, build the feed.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::with_config(load_game_config_from_env())
    }

    /// Build state from an explicit config (None means seeds only).
    pub fn with_config(cfg: Option<GameConfig>) -> Self {
        let mut subjects = HashMap::<String, Subject>::new();
        let mut riddles = HashMap::<String, Riddle>::new();
        let mut admin_password = None;

        if let Some(cfg) = cfg {
            admin_password = Some(cfg.admin.password);

            for sc in cfg.subjects {
                subjects.insert(
                    sc.id,
                    Subject {
                        name: sc.name,
                        color: sc.color.unwrap_or_else(default_subject_color),
                    },
                );
            }

            for rc in cfg.riddles {
                let id = rc.id.unwrap_or_else(|| Uuid::new_v4().to_string());
                // Bank entries must already satisfy the riddle invariants the
                // oracle relies on; anything else is skipped, not repaired.
                if rc.question.trim().is_empty()
                    || rc.answer.trim().is_empty()
                    || rc.keywords.is_empty()
                    || rc.clues.len() < 3
                {
                    error!(target: "riddle", %id, "Skipping bank item: missing question/answer, empty keywords, or fewer than 3 clues");
                    continue;
                }
                riddles.insert(
                    id.clone(),
                    Riddle {
                        id,
                        subject: rc.subject,
                        difficulty: rc.difficulty,
                        question: rc.question,
                        time: rc.time,
                        keywords: rc.keywords,
                        clues: rc.clues,
                        answer: rc.answer,
                        textbook: rc.textbook,
                        knowledge: rc.knowledge,
                        source: RiddleSource::Bank,
                        created_at_ms: now_ms(),
                    },
                );
            }
        }

        // Defaults keep the game playable with no external config at all.
        if subjects.is_empty() {
            subjects = seed_subjects();
        }
        for r in seed_riddles() {
            riddles.entry(r.id.clone()).or_insert(r);
        }

        // Inventory summary by subject/source.
        let mut count_by_subject: HashMap<String, (usize, usize, usize)> = HashMap::new();
        for r in riddles.values() {
            let entry = count_by_subject.entry(r.subject.clone()).or_insert((0, 0, 0));
            match r.source {
                RiddleSource::Bank => entry.0 += 1,
                RiddleSource::Admin => entry.1 += 1,
                RiddleSource::Seed => entry.2 += 1,
            }
        }
        for (subject, (bank, admin, seed)) in count_by_subject {
            info!(target: "riddle", %subject, bank, admin, seed, "Startup riddle inventory");
        }

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        Self {
            subjects: Arc::new(RwLock::new(subjects)),
            riddles: Arc::new(RwLock::new(riddles)),
            sessions: Arc::new(RwLock::new(HashSet::new())),
            changes,
            admin_password: admin_password.unwrap_or_else(|| GameConfig::default().admin.password),
        }
    }

    /// Subscribe to store change events (WebSocket push).
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChangeScope> {
        self.changes.subscribe()
    }

    fn emit_change(&self, scope: ChangeScope) {
        // No receivers is fine; events are best-effort hints to resync.
        let _ = self.changes.send(scope);
    }

    /// All subjects, deterministically ordered by id.
    pub async fn subjects_sorted(&self) -> Vec<(String, Subject)> {
        let subjects = self.subjects.read().await;
        let mut out: Vec<(String, Subject)> =
            subjects.iter().map(|(id, s)| (id.clone(), s.clone())).collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    pub async fn subject_exists(&self, id: &str) -> bool {
        self.subjects.read().await.contains_key(id)
    }

    #[instrument(level = "debug", skip(self, subject), fields(%id))]
    pub async fn insert_subject(&self, id: String, subject: Subject) {
        self.subjects.write().await.insert(id, subject);
        self.emit_change(ChangeScope::Subjects);
    }

    /// Remove a subject. Returns false when the id is unknown.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn remove_subject(&self, id: &str) -> bool {
        let removed = self.subjects.write().await.remove(id).is_some();
        if removed {
            self.emit_change(ChangeScope::Subjects);
        }
        removed
    }

    pub async fn subject_has_riddles(&self, id: &str) -> bool {
        self.riddles.read().await.values().any(|r| r.subject == id)
    }

    /// Read-only access to a riddle by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_riddle(&self, id: &str) -> Option<Riddle> {
        self.riddles.read().await.get(id).cloned()
    }

    /// Full riddle records, newest first (admin view).
    pub async fn riddles_all(&self) -> Vec<Riddle> {
        let riddles = self.riddles.read().await;
        let mut out: Vec<Riddle> = riddles.values().cloned().collect();
        out.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms).then(a.id.cmp(&b.id)));
        out
    }

    /// Pick a random riddle for a subject + difficulty, or None when the
    /// pool is empty.
    #[instrument(level = "info", skip(self), fields(%subject, ?difficulty))]
    pub async fn pick_riddle(&self, subject: &str, difficulty: Difficulty) -> Option<Riddle> {
        let pool: Vec<Riddle> = {
            let riddles = self.riddles.read().await;
            riddles
                .values()
                .filter(|r| r.subject == subject && r.difficulty == difficulty)
                .cloned()
                .collect()
        };
        pool.choose(&mut rand::thread_rng()).cloned()
    }

    /// Insert or replace a riddle (keyed by id).
    #[instrument(level = "debug", skip(self, riddle), fields(id = %riddle.id))]
    pub async fn save_riddle(&self, riddle: Riddle) {
        self.riddles.write().await.insert(riddle.id.clone(), riddle);
        self.emit_change(ChangeScope::Riddles);
    }

    /// Delete a riddle. Returns false when the id is unknown.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn delete_riddle(&self, id: &str) -> bool {
        let removed = self.riddles.write().await.remove(id).is_some();
        if removed {
            self.emit_change(ChangeScope::Riddles);
        }
        removed
    }

    /// Shared-secret check, used only by `admin::login`.
    pub fn check_password(&self, password: &str) -> bool {
        !password.is_empty() && password == self.admin_password
    }

    /// Mint and register a fresh session token.
    pub async fn open_session(&self) -> AdminSession {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(token.clone());
        AdminSession { token }
    }

    /// Revoke a session token. Returns false when it was not active.
    pub async fn close_session(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token)
    }

    /// Validate a presented token once at the boundary; operations take the
    /// resulting `AdminSession` instead of raw credentials.
    pub async fn authorize(&self, token: &str) -> Option<AdminSession> {
        if self.sessions.read().await.contains(token) {
            Some(AdminSession { token: token.to_string() })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdminCfg, RiddleCfg};

    fn bank_cfg() -> GameConfig {
        GameConfig {
            admin: AdminCfg { password: "sekrit".into() },
            subjects: vec![],
            riddles: vec![
                RiddleCfg {
                    id: Some("bank_1".into()),
                    subject: "math".into(),
                    difficulty: Difficulty::Hard,
                    question: "谜面".into(),
                    time: 10,
                    keywords: vec!["线索".into()],
                    clues: vec!["一".into(), "二".into(), "三".into()],
                    answer: "谜底".into(),
                    textbook: "教材".into(),
                    knowledge: Default::default(),
                },
                // Invalid: fewer than 3 clues, must be skipped.
                RiddleCfg {
                    id: Some("bank_bad".into()),
                    subject: "math".into(),
                    difficulty: Difficulty::Easy,
                    question: "坏谜面".into(),
                    time: 5,
                    keywords: vec!["x".into()],
                    clues: vec!["只有一条".into()],
                    answer: "x".into(),
                    textbook: String::new(),
                    knowledge: Default::default(),
                },
            ],
        }
    }

    #[tokio::test]
    async fn bank_items_load_and_invalid_ones_are_skipped() {
        let state = AppState::with_config(Some(bank_cfg()));
        assert!(state.get_riddle("bank_1").await.is_some());
        assert!(state.get_riddle("bank_bad").await.is_none());
        // Built-in seed is still present alongside the bank.
        assert!(state.get_riddle("q_1").await.is_some());
    }

    #[tokio::test]
    async fn pick_riddle_filters_by_subject_and_difficulty() {
        let state = AppState::with_config(Some(bank_cfg()));
        let picked = state.pick_riddle("math", Difficulty::Hard).await.expect("riddle");
        assert_eq!(picked.id, "bank_1");
        assert!(state.pick_riddle("math", Difficulty::Medium).await.is_none());
        assert!(state.pick_riddle("physics", Difficulty::Hard).await.is_none());
    }

    #[tokio::test]
    async fn mutations_emit_change_events() {
        let state = AppState::with_config(None);
        let mut rx = state.subscribe_changes();

        state
            .insert_subject("astronomy".into(), Subject { name: "天文".into(), color: default_subject_color() })
            .await;
        assert_eq!(rx.recv().await.unwrap(), ChangeScope::Subjects);

        assert!(state.delete_riddle("q_1").await);
        assert_eq!(rx.recv().await.unwrap(), ChangeScope::Riddles);
        assert!(!state.delete_riddle("q_1").await);
    }

    #[tokio::test]
    async fn sessions_round_trip() {
        let state = AppState::with_config(Some(bank_cfg()));
        assert!(state.check_password("sekrit"));
        assert!(!state.check_password(""));
        assert!(!state.check_password("419904"));

        let session = state.open_session().await;
        assert!(state.authorize(session.token()).await.is_some());
        assert!(state.close_session(session.token()).await);
        assert!(state.authorize(session.token()).await.is_none());
    }
}
