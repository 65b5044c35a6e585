//! In-memory answers for one test attempt.
//!
//! The collector knows the shape of every question in the attempt and refuses
//! values that do not fit it. Completeness is judged against a question set,
//! so the caller decides which questions must be answered.

use std::collections::{BTreeSet, HashMap};

use crate::model::{
    Answer, AnswerError, AnswerValue, OptionId, Question, QuestionId, QuestionType,
    TestQuestions, TestSubmission,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    question_type: QuestionType,
    options: BTreeSet<OptionId>,
}

impl Slot {
    fn from_question(question: &Question) -> Self {
        Self {
            question_type: question.question_type(),
            options: question.options().iter().map(|o| o.id.clone()).collect(),
        }
    }
}

/// Map from question id to the learner's current answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerCollector {
    order: Vec<QuestionId>,
    slots: HashMap<QuestionId, Slot>,
    answers: HashMap<QuestionId, AnswerValue>,
}

impl AnswerCollector {
    #[must_use]
    pub fn new(questions: &TestQuestions) -> Self {
        let order = questions.iter().map(|q| q.id.clone()).collect();
        let slots = questions
            .iter()
            .map(|q| (q.id.clone(), Slot::from_question(q)))
            .collect();
        Self {
            order,
            slots,
            answers: HashMap::new(),
        }
    }

    /// Replace the answer for `question_id`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::UnknownQuestion` for ids outside this attempt,
    /// `AnswerError::ShapeMismatch` when the value does not fit the question variant,
    /// and `AnswerError::UnknownOption` for option ids the question does not offer.
    pub fn set(&mut self, question_id: &QuestionId, value: AnswerValue) -> Result<(), AnswerError> {
        let slot = self.slot(question_id)?;
        if value.fits() != slot.question_type {
            return Err(AnswerError::ShapeMismatch {
                question_id: question_id.clone(),
                expected: slot.question_type,
                found: value.shape_name(),
            });
        }

        match &value {
            AnswerValue::Choice(option) => Self::check_option(question_id, slot, option)?,
            AnswerValue::Choices(options) => {
                for option in options {
                    Self::check_option(question_id, slot, option)?;
                }
            }
            AnswerValue::Text(_) => {}
        }

        self.answers.insert(question_id.clone(), value);
        Ok(())
    }

    /// Add `option_id` to a multiple-choice answer, or remove it if already selected.
    ///
    /// # Errors
    ///
    /// Same as [`AnswerCollector::set`]; toggling a non multiple-choice question is a
    /// shape mismatch.
    pub fn toggle_multiple(
        &mut self,
        question_id: &QuestionId,
        option_id: &OptionId,
    ) -> Result<(), AnswerError> {
        let slot = self.slot(question_id)?;
        if slot.question_type != QuestionType::MultipleChoice {
            return Err(AnswerError::ShapeMismatch {
                question_id: question_id.clone(),
                expected: slot.question_type,
                found: "option set",
            });
        }
        Self::check_option(question_id, slot, option_id)?;

        let entry = self
            .answers
            .entry(question_id.clone())
            .or_insert_with(|| AnswerValue::Choices(BTreeSet::new()));
        if let AnswerValue::Choices(selected) = entry {
            if !selected.remove(option_id) {
                selected.insert(option_id.clone());
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<&AnswerValue> {
        self.answers.get(question_id)
    }

    /// True iff every question in `questions` has a non-empty answer.
    #[must_use]
    pub fn is_complete(&self, questions: &TestQuestions) -> bool {
        questions.iter().all(|q| self.is_answered(&q.id))
    }

    /// Questions from `questions` that still lack a non-empty answer, in order.
    #[must_use]
    pub fn missing(&self, questions: &TestQuestions) -> Vec<QuestionId> {
        questions
            .iter()
            .filter(|q| !self.is_answered(&q.id))
            .map(|q| q.id.clone())
            .collect()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.order.iter().filter(|id| self.is_answered(id)).count()
    }

    /// Answers in question order, skipping unanswered questions.
    #[must_use]
    pub fn to_submission(&self) -> TestSubmission {
        let answers = self
            .order
            .iter()
            .filter_map(|id| {
                self.answers
                    .get(id)
                    .filter(|value| !value.is_empty())
                    .map(|value| Answer {
                        question_id: id.clone(),
                        value: value.clone(),
                    })
            })
            .collect();
        TestSubmission { answers }
    }

    fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(|value| !value.is_empty())
    }

    fn slot(&self, question_id: &QuestionId) -> Result<&Slot, AnswerError> {
        self.slots
            .get(question_id)
            .ok_or_else(|| AnswerError::UnknownQuestion(question_id.clone()))
    }

    fn check_option(
        question_id: &QuestionId,
        slot: &Slot,
        option_id: &OptionId,
    ) -> Result<(), AnswerError> {
        if slot.options.contains(option_id) {
            Ok(())
        } else {
            Err(AnswerError::UnknownOption {
                question_id: question_id.clone(),
                option_id: option_id.clone(),
            })
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
