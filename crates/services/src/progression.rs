//! Lesson sequencing for one module, up to the hand-off into its test.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::{error, info, warn};

use learn_core::model::{Lesson, LessonPosition, ModuleId, NextContent, TestQuestions};

use crate::error::{ApiError, ProgressionError};
use crate::request::{RequestSlot, RequestState};
use crate::session::LearnerSession;

/// Everything a new test session needs. Ownership of the questions moves with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestHandoff {
    pub module_id: ModuleId,
    pub questions: TestQuestions,
}

/// Outcome of one `advance` or `load_initial` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Lesson(Lesson),
    TestReady(TestHandoff),
    /// A request was already in flight; nothing was sent.
    Ignored,
}

/// What the controller remembers about its last settled request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivered {
    Lesson(Lesson),
    TestReady,
}

pub type ProgressionState = RequestState<Delivered, ProgressionError>;

/// Drives "next content" calls for one module.
///
/// At most one request is in flight at a time; extra triggers are dropped. The
/// position only changes on a successful lesson response. Once the module hands
/// off to its test the controller refuses further work.
#[derive(Debug)]
pub struct ProgressionController {
    session: LearnerSession,
    module_id: ModuleId,
    position: Mutex<Option<LessonPosition>>,
    finished: AtomicBool,
    request: RequestSlot<Delivered, ProgressionError>,
}

impl ProgressionController {
    #[must_use]
    pub fn new(session: LearnerSession, module_id: ModuleId) -> Self {
        Self {
            session,
            module_id,
            position: Mutex::new(None),
            finished: AtomicBool::new(false),
            request: RequestSlot::new(),
        }
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    /// Fetch the content to show when the lesson screen opens. Safe to repeat as a retry.
    ///
    /// # Errors
    ///
    /// Same as [`ProgressionController::advance`].
    pub async fn load_initial(&self) -> Result<Step, ProgressionError> {
        info!(module_id = %self.module_id, "loading lesson screen");
        self.request_next().await
    }

    /// Fetch the next content unit on an explicit learner action.
    ///
    /// # Errors
    ///
    /// Returns `ProgressionError::Finished` after the test hand-off, `Api` for
    /// collaborator failures (retry by calling again), and protocol-level variants
    /// for malformed responses.
    pub async fn advance(&self) -> Result<Step, ProgressionError> {
        self.request_next().await
    }

    #[must_use]
    pub fn state(&self) -> ProgressionState {
        self.request.snapshot()
    }

    #[must_use]
    pub fn position(&self) -> Option<LessonPosition> {
        self.position
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.request.is_pending()
    }

    async fn request_next(&self) -> Result<Step, ProgressionError> {
        if self.is_finished() {
            return Err(ProgressionError::Finished(self.module_id.clone()));
        }
        let Some(flight) = self.request.try_begin() else {
            warn!(module_id = %self.module_id, "next content already requested; ignoring");
            return Ok(Step::Ignored);
        };

        let outcome = self.fetch_next().await;
        match &outcome {
            Ok(Step::Lesson(lesson)) => {
                info!(
                    module_id = %self.module_id,
                    lesson = lesson.lesson_number(),
                    total = lesson.total_lessons(),
                    "lesson delivered"
                );
                flight.settle(Ok(Delivered::Lesson(lesson.clone())));
            }
            Ok(Step::TestReady(handoff)) => {
                info!(
                    module_id = %self.module_id,
                    questions = handoff.questions.len(),
                    "module completed; handing off to test"
                );
                flight.settle(Ok(Delivered::TestReady));
            }
            // not produced by fetch_next; dropping the token resets the slot
            Ok(Step::Ignored) => {}
            Err(err) => {
                if matches!(err, ProgressionError::Api(ApiError::Protocol(_))) {
                    error!(module_id = %self.module_id, %err, "malformed next content");
                } else {
                    warn!(module_id = %self.module_id, %err, "next content failed");
                }
                flight.settle(Err(err.clone()));
            }
        }
        outcome
    }

    async fn fetch_next(&self) -> Result<Step, ProgressionError> {
        let content = self.session.modules().next_content(&self.module_id).await?;
        match content {
            NextContent::Success(payload) => {
                if payload.module_id != self.module_id {
                    return Err(ApiError::protocol(format!(
                        "lesson for {} delivered to {}",
                        payload.module_id, self.module_id
                    ))
                    .into());
                }
                let lesson = payload.into_lesson()?;
                self.record_position(lesson.position.clone())?;
                Ok(Step::Lesson(lesson))
            }
            NextContent::ModuleCompleted { test_questions } => {
                let questions = match test_questions.filter(|q| !q.is_empty()) {
                    Some(questions) => questions,
                    None => self.fetch_questions().await?,
                };
                questions.validate()?;
                self.finished.store(true, Ordering::Release);
                Ok(Step::TestReady(TestHandoff {
                    module_id: self.module_id.clone(),
                    questions,
                }))
            }
            NextContent::Completed { .. } => Err(ApiError::protocol(format!(
                "module {} is already completed",
                self.module_id
            ))
            .into()),
        }
    }

    async fn fetch_questions(&self) -> Result<TestQuestions, ProgressionError> {
        info!(module_id = %self.module_id, "completion carried no questions; fetching test");
        match self.session.tests().test_questions(&self.module_id).await {
            Ok(questions) => Ok(questions),
            Err(ApiError::Rejected { status: 400, detail }) => Err(ProgressionError::NotEligible {
                module_id: self.module_id.clone(),
                detail,
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn record_position(&self, next: LessonPosition) -> Result<(), ProgressionError> {
        let mut position = self.position.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = position.as_ref() {
            if next.lesson_number() < previous.lesson_number() {
                return Err(ProgressionError::PositionRegressed {
                    previous: previous.lesson_number(),
                    received: next.lesson_number(),
                });
            }
        }
        *position = Some(next);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, InMemoryLms, ModuleApi, ModuleFixture, TestApi};
    use learn_core::model::{Answer, AnswerValue, Question, QuestionId, TestSubmission};

    fn lms(lessons: usize) -> InMemoryLms {
        let mut fixture = ModuleFixture::new("Module_01", "Basics");
        for n in 1..=lessons {
            fixture = fixture.lesson(format!("# Lesson {n}"));
        }
        fixture = fixture.question(
            Question::text_input("q1", "Why?", None),
            AnswerValue::text("because"),
        );
        InMemoryLms::new().with_module(fixture)
    }

    async fn started(lms: &InMemoryLms) -> ProgressionController {
        let module = ModuleId::new("Module_01");
        lms.start_module(&module).await.unwrap();
        ProgressionController::new(LearnerSession::in_memory(lms.clone()), module)
    }

    #[tokio::test]
    async fn failure_leaves_position_untouched_and_is_retryable() {
        let lms = lms(2);
        let controller = started(&lms).await;
        controller.advance().await.unwrap();
        let before = controller.position();

        lms.fail_next(Endpoint::NextContent, ApiError::Network("reset".into()));
        let err = controller.advance().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(controller.position(), before);
        assert!(controller.state().error().is_some());
        assert!(!controller.is_pending());

        let Step::Lesson(lesson) = controller.advance().await.unwrap() else {
            panic!("expected lesson");
        };
        assert_eq!(lesson.lesson_number(), 2);
    }

    #[tokio::test]
    async fn not_started_module_is_reported_verbatim() {
        let lms = lms(1);
        let controller = ProgressionController::new(
            LearnerSession::in_memory(lms.clone()),
            ModuleId::new("Module_01"),
        );
        let err = controller.load_initial().await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Module not started. Please start the module first."
        );
    }

    #[tokio::test]
    async fn falls_back_to_fetching_questions() {
        let lms = lms(1).without_carried_questions();
        let controller = started(&lms).await;
        controller.advance().await.unwrap();

        let Step::TestReady(handoff) = controller.advance().await.unwrap() else {
            panic!("expected test hand-off");
        };
        assert_eq!(handoff.questions.len(), 1);
        assert_eq!(lms.calls(Endpoint::TestQuestions), 1);
        assert!(controller.is_finished());
        assert_eq!(controller.state(), RequestState::Settled(Ok(Delivered::TestReady)));
    }

    #[tokio::test]
    async fn ineligible_fallback_becomes_not_eligible() {
        let lms = lms(1).without_carried_questions();
        let controller = started(&lms).await;
        controller.advance().await.unwrap();
        lms.fail_next(
            Endpoint::TestQuestions,
            ApiError::Rejected {
                status: 400,
                detail: "Test not available. Complete all lessons first.".into(),
            },
        );

        let err = controller.advance().await.unwrap_err();
        assert!(matches!(err, ProgressionError::NotEligible { .. }));
        assert!(!controller.is_finished());
    }

    #[tokio::test]
    async fn finished_controller_makes_no_more_calls() {
        let lms = lms(1);
        let controller = started(&lms).await;
        controller.advance().await.unwrap();
        assert!(matches!(
            controller.advance().await.unwrap(),
            Step::TestReady(_)
        ));
        let calls = lms.calls(Endpoint::NextContent);

        assert!(matches!(
            controller.advance().await,
            Err(ProgressionError::Finished(_))
        ));
        assert_eq!(lms.calls(Endpoint::NextContent), calls);
    }

    #[tokio::test]
    async fn already_completed_status_is_a_protocol_fault() {
        let lms = lms(1);
        let module = ModuleId::new("Module_01");
        let controller = started(&lms).await;
        controller.advance().await.unwrap();
        controller.advance().await.unwrap();
        let submission = TestSubmission {
            answers: vec![Answer {
                question_id: QuestionId::new("q1"),
                value: AnswerValue::text("because"),
            }],
        };
        assert!(lms.submit_test(&module, &submission).await.unwrap().passed);

        let revisit = ProgressionController::new(LearnerSession::in_memory(lms.clone()), module);
        let err = revisit.load_initial().await.unwrap_err();
        assert!(matches!(err, ProgressionError::Api(ApiError::Protocol(_))));
        assert!(!err.is_retryable());
        assert_eq!(revisit.position(), None);
    }
}
