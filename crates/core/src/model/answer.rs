use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::QuestionType;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Misuse of the answer collector. These are programming faults, not learner mistakes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {0} is not part of this test")]
    UnknownQuestion(QuestionId),

    #[error("question {question_id} has no option {option_id}")]
    UnknownOption {
        question_id: QuestionId,
        option_id: OptionId,
    },

    #[error("question {question_id} is {expected} but received a {found} answer")]
    ShapeMismatch {
        question_id: QuestionId,
        expected: QuestionType,
        found: &'static str,
    },
}

//
// ─── ANSWER VALUES ─────────────────────────────────────────────────────────────
//

/// Answer payload; serializes to the untyped JSON the Test Service expects.
///
/// - `Choice`  → `"B"`
/// - `Choices` → `["A", "C"]` (unique, order-irrelevant)
/// - `Text`    → `"free text"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(OptionId),
    Choices(BTreeSet<OptionId>),
    Text(String),
}

impl AnswerValue {
    #[must_use]
    pub fn choice(option_id: impl Into<String>) -> Self {
        Self::Choice(OptionId::new(option_id))
    }

    #[must_use]
    pub fn choices<I, S>(option_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(option_ids.into_iter().map(OptionId::new).collect())
    }

    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Empty strings and empty selections count as unanswered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Choice(option) => option.as_str().is_empty(),
            AnswerValue::Choices(options) => options.is_empty(),
            AnswerValue::Text(text) => text.is_empty(),
        }
    }

    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        match self {
            AnswerValue::Choice(_) => "single option",
            AnswerValue::Choices(_) => "option set",
            AnswerValue::Text(_) => "free text",
        }
    }

    /// The question variant this value belongs to.
    #[must_use]
    pub fn fits(&self) -> QuestionType {
        match self {
            AnswerValue::Choice(_) => QuestionType::SingleChoice,
            AnswerValue::Choices(_) => QuestionType::MultipleChoice,
            AnswerValue::Text(_) => QuestionType::TextInput,
        }
    }
}

/// One entry of a submission, keyed by question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub question_id: QuestionId,
    #[serde(rename = "answer")]
    pub value: AnswerValue,
}

/// Request body of a test submission. Answers are in question order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TestSubmission {
    pub answers: Vec<Answer>,
}

impl TestSubmission {
    #[must_use]
    pub fn answer(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|answer| &answer.question_id == question_id)
            .map(|answer| &answer.value)
    }
}
