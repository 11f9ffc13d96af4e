//! Admin-side behaviors: session login/logout and subject/riddle management.
//!
//! The shared-secret password is checked exactly once at login and yields a
//! session token; every other operation takes the validated `AdminSession`
//! produced by `AppState::authorize` at the route boundary. Operations
//! return user-facing Chinese messages for the notification sink.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{default_subject_color, Riddle, RiddleSource, Subject};
use crate::protocol::RiddleDraft;
use crate::state::{AdminSession, AppState};
use crate::util::now_ms;

/// Verify the shared secret and mint a session token.
#[instrument(level = "info", skip(state, password))]
pub async fn login(state: &AppState, password: &str) -> Result<AdminSession, String> {
  if password.trim().is_empty() {
    return Err("请输入管理员密码".into());
  }
  if !state.check_password(password.trim()) {
    warn!(target: "turtlesoup_backend", "Admin login rejected: wrong password");
    return Err("密码错误，请重试".into());
  }
  let session = state.open_session().await;
  info!(target: "turtlesoup_backend", "Admin login accepted");
  Ok(session)
}

/// Revoke a session token. Idempotent; logging out twice is not an error.
#[instrument(level = "info", skip(state, token))]
pub async fn logout(state: &AppState, token: &str) -> String {
  state.close_session(token).await;
  "已退出管理员模式".into()
}

/// Full riddle records for the admin table, optionally filtered by a
/// case-insensitive search over question text, subject name and
/// difficulty label.
#[instrument(level = "info", skip(state), fields(search = search.unwrap_or("")))]
pub async fn list_riddles(state: &AppState, search: Option<&str>) -> Vec<Riddle> {
  let riddles = state.riddles_all().await;
  let term = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
  if term.is_empty() {
    return riddles;
  }

  let subjects = state.subjects.read().await;
  riddles
    .into_iter()
    .filter(|r| {
      r.question.to_lowercase().contains(&term)
        || subjects
          .get(&r.subject)
          .map(|s| s.name.to_lowercase().contains(&term))
          .unwrap_or(false)
        || r.difficulty.label().contains(&term)
    })
    .collect()
}

/// Add (no id) or update (id present) a riddle.
/// Returns the stored record and the toast message.
#[instrument(level = "info", skip(state, _session, draft), fields(id = draft.id.as_deref().unwrap_or("")))]
pub async fn save_riddle(
  state: &AppState,
  _session: &AdminSession,
  draft: RiddleDraft,
) -> Result<(Riddle, String), String> {
  let draft = sanitized(draft);
  validate_riddle_draft(&draft)?;

  let existing_id = draft.id.as_deref().filter(|s| !s.trim().is_empty());
  let (riddle, message) = match existing_id {
    Some(id) => {
      let Some(current) = state.get_riddle(id).await else {
        return Err("未找到该题目".into());
      };
      (
        Riddle {
          id: id.to_string(),
          subject: draft.subject,
          difficulty: draft.difficulty,
          question: draft.question,
          time: draft.time,
          keywords: draft.keywords,
          clues: draft.clues,
          answer: draft.answer,
          textbook: draft.textbook,
          knowledge: draft.knowledge,
          source: current.source,
          created_at_ms: current.created_at_ms,
        },
        "题目更新成功".to_string(),
      )
    }
    None => (
      Riddle {
        id: Uuid::new_v4().to_string(),
        subject: draft.subject,
        difficulty: draft.difficulty,
        question: draft.question,
        time: draft.time,
        keywords: draft.keywords,
        clues: draft.clues,
        answer: draft.answer,
        textbook: draft.textbook,
        knowledge: draft.knowledge,
        source: RiddleSource::Admin,
        created_at_ms: now_ms(),
      },
      "题目添加成功".to_string(),
    ),
  };

  info!(target: "riddle", id = %riddle.id, subject = %riddle.subject, "Riddle saved by admin");
  state.save_riddle(riddle.clone()).await;
  Ok((riddle, message))
}

/// Delete a riddle by id.
#[instrument(level = "info", skip(state, _session), fields(%id))]
pub async fn delete_riddle(state: &AppState, _session: &AdminSession, id: &str) -> Result<String, String> {
  if state.delete_riddle(id).await {
    info!(target: "riddle", %id, "Riddle deleted by admin");
    Ok("题目删除成功".into())
  } else {
    Err("未找到该题目".into())
  }
}

/// Create a subject; the id derives from the name (lower-cased, whitespace
/// removed), matching how existing subject ids were formed.
#[instrument(level = "info", skip(state, _session), fields(%name))]
pub async fn add_subject(
  state: &AppState,
  _session: &AdminSession,
  name: &str,
  color: Option<String>,
) -> Result<String, String> {
  let name = name.trim();
  if name.is_empty() {
    return Err("请输入科目名称".into());
  }
  let id = subject_id_from_name(name);
  if state.subject_exists(&id).await {
    return Err("该科目已存在".into());
  }

  state
    .insert_subject(
      id.clone(),
      Subject {
        name: name.to_string(),
        color: color.filter(|c| !c.trim().is_empty()).unwrap_or_else(default_subject_color),
      },
    )
    .await;
  info!(target: "turtlesoup_backend", %id, "Subject added by admin");
  Ok("科目添加成功".into())
}

/// Delete a subject; refused while riddles still reference it.
#[instrument(level = "info", skip(state, _session), fields(%id))]
pub async fn delete_subject(state: &AppState, _session: &AdminSession, id: &str) -> Result<String, String> {
  if state.subject_has_riddles(id).await {
    return Err("无法删除：该科目下存在题目".into());
  }
  if state.remove_subject(id).await {
    info!(target: "turtlesoup_backend", %id, "Subject deleted by admin");
    Ok("科目删除成功".into())
  } else {
    Err("未找到该科目".into())
  }
}

/// Derive a subject id from its display name.
pub fn subject_id_from_name(name: &str) -> String {
  name.to_lowercase().split_whitespace().collect()
}

/// Check the riddle invariants the oracle relies on, plus the form-level
/// requirements of the admin surface. Messages are shown verbatim as toasts.
pub fn validate_riddle_draft(draft: &RiddleDraft) -> Result<(), String> {
  if draft.subject.trim().is_empty() {
    return Err("请选择学科".into());
  }
  if draft.question.trim().is_empty() {
    return Err("请输入谜题描述".into());
  }
  if draft.time == 0 {
    return Err("请输入有效的建议用时".into());
  }
  if draft.keywords.is_empty() {
    return Err("请输入有效的关键词（至少一个）".into());
  }
  if draft.clues.len() < 3 {
    return Err("请至少输入3条线索".into());
  }
  if draft.answer.trim().is_empty() {
    return Err("请输入答案".into());
  }
  if draft.textbook.trim().is_empty() {
    return Err("请输入关联教材".into());
  }
  if draft.knowledge.title.trim().is_empty() {
    return Err("请输入知识点标题".into());
  }
  if draft.knowledge.content.trim().is_empty() {
    return Err("请输入知识点解析".into());
  }
  if draft.knowledge.related_questions.len() < 2 {
    return Err("请至少输入2个相关问题".into());
  }
  Ok(())
}

/// Drop blank keywords/clues/related questions before validation; entry
/// forms routinely submit empty lines.
fn sanitized(mut draft: RiddleDraft) -> RiddleDraft {
  draft.keywords = draft
    .keywords
    .into_iter()
    .map(|k| k.trim().to_string())
    .filter(|k| !k.is_empty())
    .collect();
  draft.clues.retain(|c| !c.trim().is_empty());
  draft.knowledge.related_questions.retain(|q| !q.trim().is_empty());
  draft
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Knowledge};

  fn draft() -> RiddleDraft {
    RiddleDraft {
      id: None,
      subject: "math".into(),
      difficulty: Difficulty::Easy,
      question: "谜面".into(),
      time: 5,
      keywords: vec!["数字".into()],
      clues: vec!["一".into(), "二".into(), "三".into()],
      answer: "谜底".into(),
      textbook: "教材".into(),
      knowledge: Knowledge {
        title: "知识点".into(),
        content: "解析".into(),
        related_questions: vec!["相关一".into(), "相关二".into()],
      },
    }
  }

  #[test]
  fn validation_reports_the_first_missing_field() {
    let mut d = draft();
    d.subject = " ".into();
    assert_eq!(validate_riddle_draft(&d), Err("请选择学科".into()));

    let mut d = draft();
    d.clues.pop();
    assert_eq!(validate_riddle_draft(&d), Err("请至少输入3条线索".into()));

    let mut d = draft();
    d.knowledge.related_questions.pop();
    assert_eq!(validate_riddle_draft(&d), Err("请至少输入2个相关问题".into()));

    assert_eq!(validate_riddle_draft(&draft()), Ok(()));
  }

  #[test]
  fn sanitize_drops_blank_entries() {
    let mut d = draft();
    d.keywords = vec!["  数字  ".into(), "".into(), " ".into()];
    d.clues = vec!["一".into(), "".into(), "二".into(), "三".into()];
    let d = sanitized(d);
    assert_eq!(d.keywords, vec!["数字".to_string()]);
    assert_eq!(d.clues.len(), 3);
  }

  #[test]
  fn subject_ids_lowercase_and_strip_whitespace() {
    assert_eq!(subject_id_from_name("Computer Science"), "computerscience");
    assert_eq!(subject_id_from_name("天文"), "天文");
  }

  #[tokio::test]
  async fn login_checks_the_shared_secret_once() {
    let state = AppState::with_config(None);
    assert_eq!(login(&state, "").await.err(), Some("请输入管理员密码".into()));
    assert_eq!(login(&state, "wrong").await.err(), Some("密码错误，请重试".into()));

    let session = login(&state, "419904").await.expect("session");
    assert!(state.authorize(session.token()).await.is_some());

    logout(&state, session.token()).await;
    assert!(state.authorize(session.token()).await.is_none());
  }

  #[tokio::test]
  async fn save_then_update_then_delete_riddle() {
    let state = AppState::with_config(None);
    let session = login(&state, "419904").await.expect("session");

    let (created, msg) = save_riddle(&state, &session, draft()).await.expect("created");
    assert_eq!(msg, "题目添加成功");
    assert_eq!(created.source, crate::domain::RiddleSource::Admin);

    let mut update = draft();
    update.id = Some(created.id.clone());
    update.question = "改过的谜面".into();
    let (updated, msg) = save_riddle(&state, &session, update).await.expect("updated");
    assert_eq!(msg, "题目更新成功");
    assert_eq!(updated.created_at_ms, created.created_at_ms);
    assert_eq!(state.get_riddle(&created.id).await.unwrap().question, "改过的谜面");

    assert_eq!(
      delete_riddle(&state, &session, &created.id).await,
      Ok("题目删除成功".into())
    );
    assert_eq!(
      delete_riddle(&state, &session, &created.id).await,
      Err("未找到该题目".into())
    );
  }

  #[tokio::test]
  async fn updating_an_unknown_riddle_fails() {
    let state = AppState::with_config(None);
    let session = login(&state, "419904").await.expect("session");
    let mut d = draft();
    d.id = Some("missing".into());
    assert_eq!(save_riddle(&state, &session, d).await.err(), Some("未找到该题目".into()));
  }

  #[tokio::test]
  async fn subject_lifecycle_with_delete_guard() {
    let state = AppState::with_config(None);
    let session = login(&state, "419904").await.expect("session");

    assert_eq!(
      add_subject(&state, &session, "天文", None).await,
      Ok("科目添加成功".into())
    );
    assert_eq!(
      add_subject(&state, &session, "天文", None).await,
      Err("该科目已存在".into())
    );

    // "math" still holds the seed riddle and must not be deletable.
    assert_eq!(
      delete_subject(&state, &session, "math").await,
      Err("无法删除：该科目下存在题目".into())
    );
    assert_eq!(
      delete_subject(&state, &session, "天文").await,
      Ok("科目删除成功".into())
    );
  }

  #[tokio::test]
  async fn search_matches_question_subject_name_and_difficulty_label() {
    let state = AppState::with_config(None);
    let all = list_riddles(&state, None).await;
    assert!(!all.is_empty());

    assert_eq!(list_riddles(&state, Some("去掉")).await.len(), 1);
    assert_eq!(list_riddles(&state, Some("数学")).await.len(), 1);
    assert_eq!(list_riddles(&state, Some("简单")).await.len(), 1);
    assert!(list_riddles(&state, Some("不存在的词")).await.is_empty());
  }
}
