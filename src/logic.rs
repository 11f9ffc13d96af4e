//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving a random riddle for a subject + difficulty selection
//!   - Answering player questions through the oracle
//!   - Scoring answer guesses and revealing the solution on success
//!
//! Handlers stay thin; the pure matching rules live in `oracle`.

use tracing::{info, instrument, warn};

use crate::domain::Difficulty;
use crate::oracle;
use crate::protocol::{to_out, to_solution, GuessOut, Notice, RiddleOut};
use crate::state::AppState;
use crate::util::trunc_for_log;

/// Opening line added to the chat history when a riddle is served.
pub const GREETING: &str =
  "欢迎来到海龟汤游戏！你可以向我提问，我会回答是、否或无关。当你想猜答案时，请点击“猜答案”按钮。";

/// Chat line added to the history on a wrong guess.
const WRONG_GUESS_CHAT: &str = "猜错了，请继续提问或再试一次。";

/// Pick a random riddle for the selection, or report an empty pool.
#[instrument(level = "info", skip(state), fields(%subject, ?difficulty))]
pub async fn serve_riddle(
  state: &AppState,
  subject: &str,
  difficulty: Difficulty,
) -> (Option<RiddleOut>, Notice) {
  match state.pick_riddle(subject, difficulty).await {
    Some(r) => {
      info!(target: "riddle", id = %r.id, %subject, "Riddle served");
      (Some(to_out(&r)), Notice::success("题目加载成功，可以开始提问了"))
    }
    None => {
      warn!(target: "riddle", %subject, ?difficulty, "No riddle for selection");
      (None, Notice::error("该学科该难度下暂无题目"))
    }
  }
}

/// Classify a player question against the active riddle.
///
/// Empty questions never reach the oracle; that precondition is enforced
/// here, at the caller boundary.
#[instrument(level = "info", skip(state, question), fields(%riddle_id, question_len = question.len()))]
pub async fn ask_question(state: &AppState, riddle_id: &str, question: &str) -> Result<String, Notice> {
  if question.trim().is_empty() {
    return Err(Notice::warning("请输入问题"));
  }
  let Some(riddle) = state.get_riddle(riddle_id).await else {
    warn!(target: "riddle", %riddle_id, "Question for unknown riddle");
    return Err(Notice::error("未找到该题目，请重新开始游戏"));
  };

  let reply = oracle::classify(question, &riddle);
  info!(
    target: "riddle",
    id = %riddle.id,
    question = %trunc_for_log(question, 40),
    reply = %trunc_for_log(reply.as_text(), 40),
    "Question classified"
  );
  Ok(reply.as_text().to_string())
}

/// Score a player guess; a correct one reveals the solution view.
#[instrument(level = "info", skip(state, guess), fields(%riddle_id, guess_len = guess.len()))]
pub async fn guess_answer(state: &AppState, riddle_id: &str, guess: &str) -> Result<GuessOut, Notice> {
  if guess.trim().is_empty() {
    return Err(Notice::warning("请输入答案"));
  }
  let Some(riddle) = state.get_riddle(riddle_id).await else {
    warn!(target: "riddle", %riddle_id, "Guess for unknown riddle");
    return Err(Notice::error("未找到该题目，请重新开始游戏"));
  };

  let correct = oracle::score_guess(guess, &riddle);
  info!(target: "riddle", id = %riddle.id, %correct, "Guess evaluated");

  if correct {
    Ok(GuessOut {
      correct: true,
      solution: Some(to_solution(&riddle)),
      chat: None,
      notice: Notice::success("恭喜你，猜对了！"),
    })
  } else {
    Ok(GuessOut {
      correct: false,
      solution: None,
      chat: Some(WRONG_GUESS_CHAT.into()),
      notice: Notice::error("很遗憾，猜错了，请继续提问或再试一次"),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::protocol::NoticeLevel;

  #[tokio::test]
  async fn empty_question_is_rejected_before_the_oracle() {
    let state = AppState::with_config(None);
    let err = ask_question(&state, "q_1", "   ").await.unwrap_err();
    assert_eq!(err.level, NoticeLevel::Warning);
    assert_eq!(err.message, "请输入问题");
  }

  #[tokio::test]
  async fn unknown_riddle_yields_an_error_notice() {
    let state = AppState::with_config(None);
    assert!(ask_question(&state, "nope", "是不是数字").await.is_err());
    assert!(guess_answer(&state, "nope", "四十三").await.is_err());
  }

  #[tokio::test]
  async fn correct_guess_reveals_the_solution() {
    let state = AppState::with_config(None);
    let out = guess_answer(&state, "q_1", "去掉13和40的数字").await.expect("scored");
    assert!(out.correct);
    let solution = out.solution.expect("solution");
    assert!(solution.answer.starts_with("四十三"));
    assert_eq!(solution.knowledge.related_questions.len(), 2);
    assert!(out.chat.is_none());
  }

  #[tokio::test]
  async fn wrong_guess_keeps_the_solution_hidden() {
    let state = AppState::with_config(None);
    let out = guess_answer(&state, "q_1", "苹果").await.expect("scored");
    assert!(!out.correct);
    assert!(out.solution.is_none());
    assert_eq!(out.chat.as_deref(), Some("猜错了，请继续提问或再试一次。"));
  }

  #[tokio::test]
  async fn served_riddle_hides_solution_fields() {
    let state = AppState::with_config(None);
    let (riddle, notice) = serve_riddle(&state, "math", Difficulty::Easy).await;
    let riddle = riddle.expect("riddle");
    assert_eq!(riddle.id, "q_1");
    assert_eq!(notice.level, NoticeLevel::Success);

    let (none, notice) = serve_riddle(&state, "physics", Difficulty::Hard).await;
    assert!(none.is_none());
    assert_eq!(notice.message, "该学科该难度下暂无题目");
  }
}
