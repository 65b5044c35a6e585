//! One attempt at a module test: answer collection and a single guarded submit.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use learn_core::AnswerCollector;
use learn_core::model::{
    AnswerValue, ModuleId, OptionId, QuestionId, TestQuestions, TestResult,
};

use crate::error::{ApiError, TestSessionError};
use crate::progression::TestHandoff;
use crate::request::{Refusal, RequestSlot, RequestState};
use crate::session::LearnerSession;

/// Outcome of a submit call that passed local validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Graded(TestResult),
    /// A submit was already in flight; nothing was sent.
    Ignored,
}

pub type SubmissionState = RequestState<TestResult, TestSessionError>;

/// Owns the answers of one attempt and submits them at most once at a time.
///
/// Answers survive a failed submit untouched. Edits are refused while a submit
/// is in flight, so the submitted snapshot always equals the kept answers.
#[derive(Debug)]
pub struct TestSession {
    session: LearnerSession,
    module_id: ModuleId,
    questions: TestQuestions,
    answers: Mutex<AnswerCollector>,
    submission: RequestSlot<TestResult, TestSessionError>,
}

impl TestSession {
    /// # Errors
    ///
    /// Returns `TestSessionError::Questions` if the question set is malformed.
    pub fn new(
        session: LearnerSession,
        module_id: ModuleId,
        questions: TestQuestions,
    ) -> Result<Self, TestSessionError> {
        questions.validate()?;
        let answers = Mutex::new(AnswerCollector::new(&questions));
        Ok(Self {
            session,
            module_id,
            questions,
            answers,
            submission: RequestSlot::new(),
        })
    }

    /// # Errors
    ///
    /// Same as [`TestSession::new`].
    pub fn from_handoff(
        session: LearnerSession,
        handoff: TestHandoff,
    ) -> Result<Self, TestSessionError> {
        Self::new(session, handoff.module_id, handoff.questions)
    }

    /// Open the test directly, e.g. after a reload, by fetching its questions.
    ///
    /// # Errors
    ///
    /// Returns `TestSessionError::NotEligible` while the module still has lessons,
    /// `Api` for other collaborator failures.
    pub async fn fetch(session: LearnerSession, module_id: ModuleId) -> Result<Self, TestSessionError> {
        let questions = match session.tests().test_questions(&module_id).await {
            Ok(questions) => questions,
            Err(ApiError::Rejected { status: 400, detail }) => {
                warn!(%module_id, %detail, "test not available yet");
                return Err(TestSessionError::NotEligible { module_id, detail });
            }
            Err(err) => return Err(err.into()),
        };
        Self::new(session, module_id, questions)
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn questions(&self) -> &TestQuestions {
        &self.questions
    }

    /// # Errors
    ///
    /// Returns `Busy` during a submit, `AlreadyGraded` after a successful one, and
    /// `Answer` when the value does not fit the question.
    pub fn set_answer(
        &self,
        question_id: &QuestionId,
        value: AnswerValue,
    ) -> Result<(), TestSessionError> {
        let mut answers = self.editable_answers()?;
        answers.set(question_id, value)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`TestSession::set_answer`].
    pub fn toggle_option(
        &self,
        question_id: &QuestionId,
        option_id: &OptionId,
    ) -> Result<(), TestSessionError> {
        let mut answers = self.editable_answers()?;
        answers.toggle_multiple(question_id, option_id)?;
        Ok(())
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.lock_answers().is_complete(&self.questions)
    }

    #[must_use]
    pub fn missing(&self) -> Vec<QuestionId> {
        self.lock_answers().missing(&self.questions)
    }

    /// Snapshot of the current answers.
    #[must_use]
    pub fn answers(&self) -> AnswerCollector {
        self.lock_answers().clone()
    }

    #[must_use]
    pub fn result(&self) -> Option<TestResult> {
        self.submission.snapshot().value().cloned()
    }

    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.submission.snapshot()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submission.is_pending()
    }

    /// Submit the attempt.
    ///
    /// # Errors
    ///
    /// Returns `Incomplete` without calling the collaborator when any question is
    /// unanswered, `AlreadyGraded` once a result exists, and `Api` when the
    /// collaborator fails. A failed submit can be retried with the same answers.
    pub async fn submit(&self) -> Result<Submission, TestSessionError> {
        let flight = match self.submission.try_begin_once() {
            Ok(flight) => flight,
            Err(Refusal::Succeeded) => return Err(TestSessionError::AlreadyGraded),
            Err(Refusal::Pending) => {
                warn!(module_id = %self.module_id, "submit already in flight; ignoring");
                return Ok(Submission::Ignored);
            }
        };

        let payload = {
            let answers = self.lock_answers();
            let missing = answers.missing(&self.questions);
            if !missing.is_empty() {
                // token dropped unsettled: slot goes back to idle
                return Err(TestSessionError::Incomplete { missing });
            }
            answers.to_submission()
        };

        info!(module_id = %self.module_id, answers = payload.answers.len(), "submitting test");
        match self
            .session
            .tests()
            .submit_test(&self.module_id, &payload)
            .await
        {
            Ok(result) => {
                info!(
                    module_id = %self.module_id,
                    score = result.score,
                    max_score = result.max_score,
                    passed = result.passed,
                    "test graded"
                );
                flight.settle(Ok(result.clone()));
                Ok(Submission::Graded(result))
            }
            Err(err) => {
                warn!(module_id = %self.module_id, %err, "test submit failed; answers kept");
                let err = TestSessionError::from(err);
                flight.settle(Err(err.clone()));
                Err(err)
            }
        }
    }

    fn editable_answers(&self) -> Result<MutexGuard<'_, AnswerCollector>, TestSessionError> {
        let answers = self.lock_answers();
        if self.is_submitting() {
            return Err(TestSessionError::Busy);
        }
        if self.submission.has_value() {
            return Err(TestSessionError::AlreadyGraded);
        }
        Ok(answers)
    }

    fn lock_answers(&self) -> MutexGuard<'_, AnswerCollector> {
        self.answers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
