use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionSetError {
    #[error("test has no questions")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),

    #[error("question {0} must be worth at least one point")]
    ZeroPoints(QuestionId),

    #[error("choice question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {question_id} repeats option {option_id}")]
    DuplicateOption {
        question_id: QuestionId,
        option_id: OptionId,
    },
}

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Discriminant of a question variant, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    TextInput,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TextInput => "text_input",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: OptionId,
    pub text: String,
}

impl QuestionOption {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: OptionId::new(id),
            text: text.into(),
        }
    }
}

/// Variant-specific payload of a question. Each variant carries only what it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice {
        options: Vec<QuestionOption>,
    },
    MultipleChoice {
        options: Vec<QuestionOption>,
    },
    TextInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<String>,
    },
}

/// One test question as served by the Test Service.
///
/// Fields the server adds for its own use (e.g. answer keys) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question_id")]
    pub id: QuestionId,
    #[serde(rename = "question", default)]
    pub prompt: String,
    #[serde(default = "default_points")]
    pub points: u32,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_points() -> u32 {
    1
}

impl Question {
    #[must_use]
    pub fn single_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Self {
        Self {
            id: QuestionId::new(id),
            prompt: prompt.into(),
            points: 1,
            kind: QuestionKind::SingleChoice { options },
        }
    }

    #[must_use]
    pub fn multiple_choice(
        id: impl Into<String>,
        prompt: impl Into<String>,
        options: Vec<QuestionOption>,
    ) -> Self {
        Self {
            id: QuestionId::new(id),
            prompt: prompt.into(),
            points: 1,
            kind: QuestionKind::MultipleChoice { options },
        }
    }

    #[must_use]
    pub fn text_input(
        id: impl Into<String>,
        prompt: impl Into<String>,
        placeholder: Option<String>,
    ) -> Self {
        Self {
            id: QuestionId::new(id),
            prompt: prompt.into(),
            points: 1,
            kind: QuestionKind::TextInput { placeholder },
        }
    }

    #[must_use]
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::SingleChoice { .. } => QuestionType::SingleChoice,
            QuestionKind::MultipleChoice { .. } => QuestionType::MultipleChoice,
            QuestionKind::TextInput { .. } => QuestionType::TextInput,
        }
    }

    /// Options in display order; empty for free-text questions.
    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        match &self.kind {
            QuestionKind::SingleChoice { options } | QuestionKind::MultipleChoice { options } => {
                options
            }
            QuestionKind::TextInput { .. } => &[],
        }
    }

    #[must_use]
    pub fn has_option(&self, option_id: &OptionId) -> bool {
        self.options().iter().any(|option| &option.id == option_id)
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        match &self.kind {
            QuestionKind::TextInput { placeholder } => placeholder.as_deref(),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), QuestionSetError> {
        if self.points == 0 {
            return Err(QuestionSetError::ZeroPoints(self.id.clone()));
        }
        if matches!(self.question_type(), QuestionType::TextInput) {
            return Ok(());
        }
        if self.options().is_empty() {
            return Err(QuestionSetError::NoOptions(self.id.clone()));
        }
        let mut seen = HashSet::new();
        for option in self.options() {
            if !seen.insert(&option.id) {
                return Err(QuestionSetError::DuplicateOption {
                    question_id: self.id.clone(),
                    option_id: option.id.clone(),
                });
            }
        }
        Ok(())
    }
}

//
// ─── QUESTION SET ──────────────────────────────────────────────────────────────
//

/// Ordered question set of one module test (`{"questions": [...]}` on the wire).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TestQuestions {
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl TestQuestions {
    #[must_use]
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Checks the structural invariants the collector relies on.
    ///
    /// # Errors
    ///
    /// Returns the first `QuestionSetError` found, in question order.
    pub fn validate(&self) -> Result<(), QuestionSetError> {
        if self.questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(QuestionSetError::DuplicateQuestion(question.id.clone()));
            }
            question.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    #[must_use]
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }
}

impl<'a> IntoIterator for &'a TestQuestions {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_each_variant_from_wire_shape() {
        let json = serde_json::json!({
            "questions": [
                {
                    "question_id": "q1",
                    "type": "single_choice",
                    "question": "Pick one",
                    "options": [{"id": "A", "text": "Alpha"}, {"id": "B", "text": "Beta"}],
                    "points": 2,
                    "correct_answer": "B"
                },
                {
                    "question_id": "q2",
                    "type": "multiple_choice",
                    "question": "Pick many",
                    "options": [{"id": "A", "text": "Alpha"}, {"id": "C", "text": "Gamma"}]
                },
                {
                    "question_id": "q3",
                    "type": "text_input",
                    "question": "Say something",
                    "placeholder": "Your words"
                }
            ]
        });

        let set: TestQuestions = serde_json::from_value(json).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.questions[0].question_type(), QuestionType::SingleChoice);
        assert_eq!(set.questions[0].points, 2);
        assert!(set.questions[0].has_option(&OptionId::new("B")));
        assert_eq!(set.questions[1].question_type(), QuestionType::MultipleChoice);
        assert_eq!(set.questions[1].points, 1);
        assert_eq!(set.questions[2].placeholder(), Some("Your words"));
        assert!(set.questions[2].options().is_empty());
        assert!(set.validate().is_ok());
    }

    #[test]
    fn unknown_question_type_is_rejected() {
        let json = serde_json::json!({
            "question_id": "q1",
            "type": "essay",
            "question": "Write"
        });
        assert!(serde_json::from_value::<Question>(json).is_err());
    }

    #[test]
    fn validate_flags_structural_problems() {
        assert_eq!(
            TestQuestions::default().validate(),
            Err(QuestionSetError::Empty)
        );

        let dup = TestQuestions::new(vec![
            Question::text_input("q1", "a", None),
            Question::text_input("q1", "b", None),
        ]);
        assert_eq!(
            dup.validate(),
            Err(QuestionSetError::DuplicateQuestion(QuestionId::new("q1")))
        );

        let no_options = TestQuestions::new(vec![Question::single_choice("q1", "a", vec![])]);
        assert_eq!(
            no_options.validate(),
            Err(QuestionSetError::NoOptions(QuestionId::new("q1")))
        );

        let zero = TestQuestions::new(vec![Question::text_input("q1", "a", None).with_points(0)]);
        assert_eq!(
            zero.validate(),
            Err(QuestionSetError::ZeroPoints(QuestionId::new("q1")))
        );

        let repeated = TestQuestions::new(vec![Question::multiple_choice(
            "q1",
            "a",
            vec![QuestionOption::new("A", "x"), QuestionOption::new("A", "y")],
        )]);
        assert!(matches!(
            repeated.validate(),
            Err(QuestionSetError::DuplicateOption { .. })
        ));
    }
}
