//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChangeScope, Difficulty, Knowledge, Riddle, Subject};

/// Toast-style notice for the presentation layer to render.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }
    pub fn success(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, message: message.into() }
    }
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }
    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListSubjects,
    NewRiddle {
        subject: String,
        difficulty: Difficulty,
    },
    AskQuestion {
        #[serde(rename = "riddleId")]
        riddle_id: String,
        question: String,
    },
    GuessAnswer {
        #[serde(rename = "riddleId")]
        riddle_id: String,
        guess: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Subjects {
        subjects: Vec<SubjectOut>,
    },
    Riddle {
        riddle: Option<RiddleOut>,
        greeting: Option<String>,
        notice: Notice,
    },
    Reply {
        text: String,
    },
    GuessResult {
        correct: bool,
        solution: Option<SolutionOut>,
        chat: Option<String>,
        notice: Notice,
    },
    /// Pushed when a store changes; clients re-fetch what they display.
    DataChanged {
        scope: ChangeScope,
    },
    Notice {
        notice: Notice,
    },
    Error {
        message: String,
    },
}

/// Public view of a riddle. Keywords, clues, answer and the knowledge card
/// stay server-side until the riddle is solved.
#[derive(Debug, Serialize)]
pub struct RiddleOut {
    pub id: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub time: u32,
}

/// Solution view revealed after a correct guess.
#[derive(Debug, Serialize)]
pub struct SolutionOut {
    pub answer: String,
    pub textbook: String,
    pub knowledge: Knowledge,
}

#[derive(Debug, Serialize)]
pub struct SubjectOut {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Convert the full `Riddle` (internal) to the public DTO.
pub fn to_out(r: &Riddle) -> RiddleOut {
    RiddleOut {
        id: r.id.clone(),
        subject: r.subject.clone(),
        difficulty: r.difficulty,
        question: r.question.clone(),
        time: r.time,
    }
}

pub fn to_solution(r: &Riddle) -> SolutionOut {
    SolutionOut {
        answer: r.answer.clone(),
        textbook: r.textbook.clone(),
        knowledge: r.knowledge.clone(),
    }
}

pub fn subject_out(id: &str, s: &Subject) -> SubjectOut {
    SubjectOut {
        id: id.to_string(),
        name: s.name.clone(),
        color: s.color.clone(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Serialize)]
pub struct SubjectsOut {
    pub subjects: Vec<SubjectOut>,
}

#[derive(Debug, Deserialize)]
pub struct RiddleQuery {
    pub subject: String,
    pub difficulty: Difficulty,
}

#[derive(Serialize)]
pub struct RiddlePickOut {
    pub riddle: Option<RiddleOut>,
    pub greeting: Option<String>,
    pub notice: Notice,
}

#[derive(Deserialize)]
pub struct AskIn {
    #[serde(rename = "riddleId")]
    pub riddle_id: String,
    pub question: String,
}

#[derive(Serialize)]
pub struct AskOut {
    pub reply: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Deserialize)]
pub struct GuessIn {
    #[serde(rename = "riddleId")]
    pub riddle_id: String,
    pub guess: String,
}

#[derive(Serialize)]
pub struct GuessOut {
    pub correct: bool,
    pub solution: Option<SolutionOut>,
    /// Scripted chat line added to the history on a wrong guess.
    pub chat: Option<String>,
    pub notice: Notice,
}

#[derive(Deserialize)]
pub struct LoginIn {
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginOut {
    pub ok: bool,
    pub token: Option<String>,
    pub notice: Notice,
}

#[derive(Deserialize)]
pub struct LogoutIn {
    pub token: String,
}

/// Generic admin mutation outcome: a verdict plus the toast to show.
#[derive(Serialize)]
pub struct ActionOut {
    pub ok: bool,
    pub notice: Notice,
}

impl ActionOut {
    pub fn denied() -> Self {
        Self { ok: false, notice: Notice::error("权限不足，请重新登录") }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdminRiddlesQuery {
    pub token: String,
    pub search: Option<String>,
}

#[derive(Serialize)]
pub struct AdminRiddlesOut {
    pub riddles: Vec<Riddle>,
}

/// Riddle payload accepted by save: add when `id` is absent, update otherwise.
#[derive(Clone, Debug, Deserialize)]
pub struct RiddleDraft {
    #[serde(default)] pub id: Option<String>,
    pub subject: String,
    pub difficulty: Difficulty,
    pub question: String,
    #[serde(default = "default_draft_time")] pub time: u32,
    pub keywords: Vec<String>,
    pub clues: Vec<String>,
    pub answer: String,
    #[serde(default)] pub textbook: String,
    #[serde(default)] pub knowledge: Knowledge,
}

fn default_draft_time() -> u32 {
    5
}

#[derive(Deserialize)]
pub struct SaveRiddleIn {
    pub token: String,
    pub riddle: RiddleDraft,
}

#[derive(Deserialize)]
pub struct DeleteRiddleIn {
    pub token: String,
    pub id: String,
}

#[derive(Deserialize)]
pub struct AddSubjectIn {
    pub token: String,
    pub name: String,
    #[serde(default)] pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteSubjectIn {
    pub token: String,
    pub id: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
