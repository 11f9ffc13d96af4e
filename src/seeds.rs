//! Seed data and small utilities related to default content.

use std::collections::HashMap;

use crate::domain::{Difficulty, Knowledge, Riddle, RiddleSource, Subject};
use crate::util::now_ms;

/// Default subject cards, used when the config provides none.
pub fn seed_subjects() -> HashMap<String, Subject> {
  HashMap::from([
    ("math".to_string(), Subject { name: "数学".into(), color: "#3b82f6".into() }),
    ("physics".to_string(), Subject { name: "物理".into(), color: "#10b981".into() }),
    ("chemistry".to_string(), Subject { name: "化学".into(), color: "#f59e0b".into() }),
    ("biology".to_string(), Subject { name: "生物".into(), color: "#ec4899".into() }),
    ("history".to_string(), Subject { name: "历史".into(), color: "#8b5cf6".into() }),
    ("geography".to_string(), Subject { name: "地理".into(), color: "#6366f1".into() }),
  ])
}

/// Minimal built-in riddle bank that keeps the game playable even without
/// external config.
pub fn seed_riddles() -> Vec<Riddle> {
  vec![
    Riddle {
      id: "q_1".into(),
      subject: "math".into(),
      difficulty: Difficulty::Easy,
      question: "一个数，去掉前面一个数字后，是13。去掉最后一个数字后，是40。这个数是什么？".into(),
      time: 5,
      keywords: vec!["数字".into(), "去掉".into(), "13".into(), "40".into()],
      clues: vec![
        "这是一个两位数".into(),
        "它与中文有关".into(),
        "它的发音很关键".into(),
      ],
      answer: "四十三（中文数字，去掉前面“四”是“十三”，去掉后面“三”是“四十”）".into(),
      textbook: "小学数学一年级".into(),
      knowledge: Knowledge {
        title: "数字的多种表示方法".into(),
        content: "数字可以有阿拉伯数字、中文数字等多种表示形式。在这个谜题中，利用了中文数字的特性来设计谜题。".into(),
        related_questions: vec![
          "什么数字去掉前面一个数字后是11，去掉最后一个数字后是50？".into(),
          "如何用三种不同的方式表示数字10？".into(),
        ],
      },
      source: RiddleSource::Seed,
      created_at_ms: now_ms(),
    },
  ]
}
