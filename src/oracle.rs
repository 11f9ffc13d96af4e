//! Rule-based question oracle and guess scoring.
//!
//! Flow:
//! 1) Player asks a free-text question about the current riddle.
//! 2) `classify` routes it to a fixed refusal, "无关", a scripted clue,
//!    or a form-based 是/否 reply.
//! 3) `score_guess` decides whether a free-text guess counts as the answer
//!    (exact normalized match, or a keyword-overlap threshold).
//!
//! Both functions are pure over the riddle record: deterministic, no state
//! retained between calls, the record is never mutated. Matching is plain
//! case-insensitive substring containment; there is no tokenization, no
//! edit distance, no synonym expansion.

use crate::domain::Riddle;
use crate::util::normalize_text;

/// Fixed reply when the player asks for the answer outright.
pub const REVEAL_REFUSAL: &str = "请使用“猜答案”按钮来尝试回答。";
/// Reply when no riddle keyword appears in the question.
pub const IRRELEVANT: &str = "无关";
pub const YES: &str = "是";
pub const NO: &str = "否";

/// Phrases meaning "tell me the answer now". Checked first; any hit refuses
/// regardless of keyword content.
const TERMINATION_TRIGGERS: &[&str] = &["答案", "是什么", "揭晓", "结束", "最终", "直接说"];

/// Canonical Chinese yes/no interrogative openers. The literal set is fixed:
/// downstream behavior depends on these exact prefixes.
const YES_NO_STARTERS: &[&str] = &[
  "是不是", "是否", "对吗", "是吗", "有吗",
  "会吗", "能吗", "可以吗", "可能吗", "存在吗",
  "有没有", "会不会", "能不能", "可不可能",
];

/// Classifier outcome. `as_text` yields the exact string shown in chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
  Refusal,
  Irrelevant,
  Clue(String),
  Yes,
  No,
}

impl Reply {
  pub fn as_text(&self) -> &str {
    match self {
      Reply::Refusal => REVEAL_REFUSAL,
      Reply::Irrelevant => IRRELEVANT,
      Reply::Clue(clue) => clue,
      Reply::Yes => YES,
      Reply::No => NO,
    }
  }
}

impl std::fmt::Display for Reply {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_text())
  }
}

/// Classify a free-text player question against the current riddle.
///
/// Precedence: reveal refusal > 无关 > scripted clue > form-based 是/否.
/// Empty questions are rejected upstream (see `logic::ask_question`); the
/// oracle assumes riddle invariants hold and does not re-check them.
pub fn classify(question: &str, riddle: &Riddle) -> Reply {
  let q = normalize_text(question);

  if TERMINATION_TRIGGERS.iter().any(|t| q.contains(t)) {
    return Reply::Refusal;
  }

  let matched = matched_keywords(&q, &riddle.keywords);
  if matched.is_empty() {
    // The keyword vocabulary is the sole relevance signal; no semantic fallback.
    return Reply::Irrelevant;
  }

  if let Some(clue) = relevant_clue(&matched, &riddle.clues) {
    return Reply::Clue(clue.to_string());
  }

  // Form-based only: the reply classifies question phrasing and does not
  // consult the riddle's actual answer.
  if is_yes_no_form(&q) { Reply::Yes } else { Reply::No }
}

/// Riddle keywords (lower-cased) found in the question, preserving
/// keyword order.
fn matched_keywords(question: &str, keywords: &[String]) -> Vec<String> {
  keywords
    .iter()
    .map(|k| k.to_lowercase())
    .filter(|k| question.contains(k.as_str()))
    .collect()
}

/// First clue whose lower-cased text contains any matched keyword.
/// Ties break by clue order; earlier wins.
fn relevant_clue<'a>(matched: &[String], clues: &'a [String]) -> Option<&'a str> {
  clues
    .iter()
    .find(|clue| {
      let lower = clue.to_lowercase();
      matched.iter().any(|k| lower.contains(k.as_str()))
    })
    .map(|clue| clue.as_str())
}

/// Syntactic yes/no question detector: a canonical opener, the final
/// particle 吗, or a full-width question mark combined with 是/有.
pub fn is_yes_no_form(text: &str) -> bool {
  YES_NO_STARTERS.iter().any(|s| text.starts_with(s))
    || text.ends_with('吗')
    || (text.ends_with('？') && (text.contains('是') || text.contains('有')))
}

/// Whether a free-text guess counts as the riddle's answer.
///
/// Exact normalized match wins immediately; otherwise at least one keyword
/// must appear in the guess and the match count must reach ceil(n/3) of the
/// riddle's keywords. Empty guess or empty answer fails closed.
pub fn score_guess(guess: &str, riddle: &Riddle) -> bool {
  if guess.trim().is_empty() || riddle.answer.trim().is_empty() {
    return false;
  }

  let g = normalize_text(guess);
  if g == normalize_text(&riddle.answer) {
    return true;
  }

  let matched = riddle
    .keywords
    .iter()
    .filter(|k| g.contains(k.to_lowercase().as_str()))
    .count();
  let threshold = (riddle.keywords.len() + 2) / 3; // ceil(n / 3)
  matched > 0 && matched >= threshold
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Difficulty, Knowledge, Riddle, RiddleSource};

  fn riddle(keywords: &[&str], clues: &[&str], answer: &str) -> Riddle {
    Riddle {
      id: "q_test".into(),
      subject: "math".into(),
      difficulty: Difficulty::Easy,
      question: "一个数，去掉前面一个数字后，是13。去掉最后一个数字后，是40。这个数是什么？".into(),
      time: 5,
      keywords: keywords.iter().map(|s| s.to_string()).collect(),
      clues: clues.iter().map(|s| s.to_string()).collect(),
      answer: answer.into(),
      textbook: "小学数学一年级".into(),
      knowledge: Knowledge::default(),
      source: RiddleSource::Seed,
      created_at_ms: 0,
    }
  }

  fn number_riddle() -> Riddle {
    riddle(
      &["数字", "去掉", "13", "40"],
      &["这是一个两位数", "它与中文有关", "它的发音很关键"],
      "四十三",
    )
  }

  #[test]
  fn termination_triggers_refuse_regardless_of_keywords() {
    let r = number_riddle();
    // "数字的谜底揭晓一下" also matches a keyword; the refusal short-circuits.
    for q in ["答案是什么", "直接说吧", "数字的谜底揭晓一下", "最终是什么数"] {
      assert_eq!(classify(q, &r), Reply::Refusal, "question: {q}");
    }
  }

  #[test]
  fn zero_keyword_matches_is_irrelevant() {
    let r = number_riddle();
    assert_eq!(classify("苹果好吃不好吃", &r), Reply::Irrelevant);
    assert_eq!(classify("和天气有关系", &r), Reply::Irrelevant);
  }

  #[test]
  fn earliest_matching_clue_wins() {
    let r = riddle(
      &["中文", "发音"],
      &["这是一个两位数", "它与中文有关", "它的发音很关键"],
      "四十三",
    );
    // Both the second and third clue match a keyword; the second comes first.
    assert_eq!(
      classify("和中文发音有关系吧", &r),
      Reply::Clue("它与中文有关".into())
    );
    // Only the third clue contains 发音.
    assert_eq!(
      classify("发音重要不重要", &r),
      Reply::Clue("它的发音很关键".into())
    );
  }

  #[test]
  fn clue_is_returned_verbatim_with_original_casing() {
    let r = riddle(&["pinyin"], &["第一条", "第二条", "关于Pinyin的提示"], "拼音");
    assert_eq!(
      classify("和pinyin有关联不", &r),
      Reply::Clue("关于Pinyin的提示".into())
    );
  }

  #[test]
  fn yes_no_fallback_when_no_clue_matches() {
    let r = number_riddle();
    // Keyword "13" matches but no clue contains it, so the reply is 是/否 by form.
    assert_eq!(classify("是不是13", &r), Reply::Yes);
    assert_eq!(classify("有没有用到40", &r), Reply::Yes);
    assert_eq!(classify("包含13吗", &r), Reply::Yes);
    assert_eq!(classify("先去掉13", &r), Reply::No);
  }

  #[test]
  fn yes_no_form_is_purely_syntactic() {
    assert!(is_yes_no_form("是不是一个谜语"));
    assert!(is_yes_no_form("有没有人知道"));
    assert!(is_yes_no_form("他会游泳吗"));
    assert!(is_yes_no_form("这里有东西？"));
    assert!(!is_yes_no_form("苹果"));
    assert!(!is_yes_no_form("为什么这样"));
    // Full-width question mark alone is not enough without 是/有.
    assert!(!is_yes_no_form("然后呢？"));
  }

  #[test]
  fn exact_guess_matches_case_insensitively() {
    let r = number_riddle();
    assert!(score_guess("四十三", &r));
    assert!(score_guess("  四十三  ", &r));

    let r = riddle(&["forty"], &["a", "b", "c"], "Forty Three");
    assert!(score_guess("forty three", &r));
  }

  #[test]
  fn keyword_overlap_reaches_threshold() {
    let r = number_riddle();
    // 4 keywords, threshold ceil(4/3) = 2.
    assert!(score_guess("去掉13和40的数字", &r));
    assert!(score_guess("去掉13", &r));
    assert!(!score_guess("一个数字而已", &r)); // 1 of 4 falls short
    assert!(!score_guess("苹果", &r));
  }

  #[test]
  fn single_keyword_threshold_is_one() {
    let r = riddle(&["月亮"], &["a", "b", "c"], "月亮的背面");
    assert!(score_guess("和月亮有关", &r));
    assert!(!score_guess("和太阳有关", &r));
  }

  #[test]
  fn empty_guess_or_answer_fails_closed() {
    let r = number_riddle();
    assert!(!score_guess("", &r));
    assert!(!score_guess("   ", &r));
    let r = riddle(&["数字"], &["a", "b", "c"], "");
    assert!(!score_guess("数字", &r));
  }

  #[test]
  fn classify_and_score_are_idempotent() {
    let r = number_riddle();
    assert_eq!(classify("是不是13", &r), classify("是不是13", &r));
    assert_eq!(score_guess("去掉13", &r), score_guess("去掉13", &r));
  }
}
