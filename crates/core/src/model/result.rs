use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{ModuleId, QuestionId, ResultId};
use crate::model::timestamp;

/// An answer echoed back by the grader, either the learner's or the disclosed key.
///
/// The grader treats answers as untyped JSON, so anything unexpected is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerEcho {
    Text(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl fmt::Display for AnswerEcho {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerEcho::Text(text) => f.write_str(text),
            AnswerEcho::List(items) => f.write_str(&items.join(", ")),
            AnswerEcho::Other(value) => write!(f, "{value}"),
        }
    }
}

/// Per-question grading outcome, in submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    #[serde(default)]
    pub user_answer: Option<AnswerEcho>,
    /// Present only when the answer was wrong and the grader disclosed the key.
    #[serde(default)]
    pub correct_answer: Option<AnswerEcho>,
}

/// Graded attempt returned by the Test Service on submission.
///
/// `percentage` and `passed` are decided server-side and never recomputed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub result_id: ResultId,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    #[serde(default)]
    pub detailed_results: Vec<QuestionOutcome>,
    pub attempt_number: u32,
    #[serde(default)]
    pub next_module_unlocked: Option<ModuleId>,
}

/// A result as kept in the Test Service's history (`GET /tests/results/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTestResult {
    pub id: ResultId,
    pub module_id: ModuleId,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    #[serde(default)]
    pub detailed_results: Vec<QuestionOutcome>,
    #[serde(default = "default_attempt")]
    pub attempt_number: u32,
    #[serde(default, deserialize_with = "timestamp::utc_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_attempt() -> u32 {
    1
}

impl StoredTestResult {
    #[must_use]
    pub fn grade(&self) -> u8 {
        ten_point_grade(self.percentage)
    }
}

/// Maps a 0–100 percentage onto the 0–10 display scale, rounding half up.
#[must_use]
pub fn ten_point_grade(percentage: u32) -> u8 {
    let clamped = percentage.min(100);
    // clamped <= 100, so the quotient fits in a u8
    u8::try_from((clamped + 5) / 10).unwrap_or(10)
}
