//! Drives one module from its first lesson to a graded test.
//!
//! Owns the progression controller until the lessons hand off, then owns the
//! test attempt. Service errors are mapped to `ViewError` here so renderers
//! never see service types.

use learn_core::model::{
    AnswerValue, Lesson, ModuleId, OptionId, ProgressStatus, Question, QuestionKind,
};
use services::{
    Delivered, LearnerSession, ProgressionController, ProgressionError, Step, Submission,
    TestSession, TestSessionError,
};

use crate::views::{ViewError, ViewState, view_state_from_request};
use crate::vm::lesson_vm::LessonVm;
use crate::vm::result_vm::{ResultVm, present};
use crate::vm::test_vm::TestVm;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StudyScreen {
    Lesson(LessonVm),
    Test(TestVm),
    Result(ResultVm),
}

impl StudyScreen {
    /// The request outcome the screen carries, if any.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        match self {
            StudyScreen::Lesson(lesson) => lesson.notice.as_deref(),
            StudyScreen::Test(test) => test.notice.as_deref(),
            StudyScreen::Result(_) => None,
        }
    }
}

pub struct StudyVm {
    session: LearnerSession,
    module_id: ModuleId,
    controller: Option<ProgressionController>,
    lesson: Option<Lesson>,
    test: Option<TestSession>,
}

impl StudyVm {
    #[must_use]
    pub fn new(session: LearnerSession, module_id: ModuleId) -> Self {
        Self {
            session,
            module_id,
            controller: None,
            lesson: None,
            test: None,
        }
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn test(&self) -> Option<&TestSession> {
        self.test.as_ref()
    }

    /// Rebuilds the current screen from the last request's state, so failures
    /// show up as a notice on the screen the learner was on.
    #[must_use]
    pub fn screen(&self) -> Option<StudyScreen> {
        if let Some(test) = &self.test {
            return Some(match view_state_from_request(&test.state(), present) {
                ViewState::Ready(result) => StudyScreen::Result(result),
                _ => StudyScreen::Test(TestVm::from_session(test)),
            });
        }

        let controller = self.controller.as_ref()?;
        let last = || self.lesson.as_ref().map(LessonVm::from_lesson);
        let lesson = match view_state_from_request(&controller.state(), Delivered::clone) {
            ViewState::Ready(Delivered::Lesson(lesson)) => Some(LessonVm::from_lesson(&lesson)),
            ViewState::Ready(Delivered::TestReady) | ViewState::Idle => last(),
            ViewState::Loading => last().map(|vm| vm.with_notice("Loading...")),
            ViewState::Error(err) => last().map(|vm| vm.with_notice(err.notice())),
        };
        lesson.map(StudyScreen::Lesson)
    }

    /// Start (or resume) the module and load its first content unit.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::ReturnToDashboard` for modules already completed,
    /// otherwise the mapped service failure.
    pub async fn start(&mut self) -> Result<StudyScreen, ViewError> {
        self.session
            .modules()
            .start_module(&self.module_id)
            .await
            .map_err(|err| ViewError::from(&err))?;
        let progress = self
            .session
            .progress()
            .module_progress(&self.module_id)
            .await
            .map_err(|err| ViewError::from(&err))?;
        if progress.status == ProgressStatus::Completed {
            return Err(ViewError::ReturnToDashboard(format!(
                "Module {} is already completed.",
                self.module_id
            )));
        }

        let controller = ProgressionController::new(self.session.clone(), self.module_id.clone());
        let step = controller.load_initial().await.map_err(progression_error)?;
        self.controller = Some(controller);
        self.lesson = None;
        self.test = None;
        self.on_step(step)
    }

    /// # Errors
    ///
    /// Returns `ViewError::Blocked` when there is no lesson to advance from.
    pub async fn next(&mut self) -> Result<StudyScreen, ViewError> {
        let Some(controller) = self.controller.as_ref() else {
            return Err(ViewError::Blocked("There is no lesson to continue.".to_string()));
        };
        let step = controller.advance().await.map_err(progression_error)?;
        self.on_step(step)
    }

    /// Answer question `number` (1-based). Choice questions take option ids;
    /// multiple choice takes a comma separated list.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Blocked` for unknown questions or answers that do not fit.
    pub fn answer(&self, number: usize, input: &str) -> Result<TestVm, ViewError> {
        let test = self.require_test()?;
        let question = question_at(test, number)?;
        let input = input.trim();
        let value = match &question.kind {
            QuestionKind::SingleChoice { .. } => AnswerValue::choice(input),
            QuestionKind::MultipleChoice { .. } => AnswerValue::choices(
                input
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty()),
            ),
            QuestionKind::TextInput { .. } => AnswerValue::text(input),
        };
        let question_id = question.id.clone();
        test.set_answer(&question_id, value).map_err(answer_error)?;
        Ok(TestVm::from_session(test))
    }

    /// # Errors
    ///
    /// Same as [`StudyVm::answer`].
    pub fn toggle(&self, number: usize, option: &str) -> Result<TestVm, ViewError> {
        let test = self.require_test()?;
        let question_id = question_at(test, number)?.id.clone();
        test.toggle_option(&question_id, &OptionId::new(option.trim()))
            .map_err(answer_error)?;
        Ok(TestVm::from_session(test))
    }

    /// # Errors
    ///
    /// Returns `ViewError::Blocked` while answers are missing; answers are kept on
    /// every failure so the learner can retry.
    pub async fn submit(&mut self) -> Result<StudyScreen, ViewError> {
        let test = self.require_test()?;
        match test.submit().await {
            Ok(Submission::Graded(result)) => Ok(StudyScreen::Result(present(&result))),
            Ok(Submission::Ignored) => Err(ViewError::Blocked(
                "Your answers are being submitted.".to_string(),
            )),
            Err(err) => Err(ViewError::from(&err)),
        }
    }

    fn on_step(&mut self, step: Step) -> Result<StudyScreen, ViewError> {
        match step {
            Step::Lesson(lesson) => {
                let vm = LessonVm::from_lesson(&lesson);
                self.lesson = Some(lesson);
                Ok(StudyScreen::Lesson(vm))
            }
            Step::TestReady(handoff) => {
                let test = TestSession::from_handoff(self.session.clone(), handoff)
                    .map_err(|err| ViewError::from(&err))?;
                let vm = TestVm::from_session(&test);
                self.controller = None;
                self.lesson = None;
                self.test = Some(test);
                Ok(StudyScreen::Test(vm))
            }
            Step::Ignored => Err(ViewError::Blocked(
                "The next lesson is still loading.".to_string(),
            )),
        }
    }

    fn require_test(&self) -> Result<&TestSession, ViewError> {
        self.test
            .as_ref()
            .ok_or_else(|| ViewError::Blocked("Finish the lessons to open the test.".to_string()))
    }
}

fn question_at(
    test: &TestSession,
    number: usize,
) -> Result<&Question, ViewError> {
    number
        .checked_sub(1)
        .and_then(|index| test.questions().questions.get(index))
        .ok_or_else(|| ViewError::Blocked(format!("There is no question {number}.")))
}

fn progression_error(err: ProgressionError) -> ViewError {
    ViewError::from(&err)
}

// Shape and option mistakes come from typing, so they are the learner's to fix.
fn answer_error(err: TestSessionError) -> ViewError {
    match err {
        TestSessionError::Answer(inner) => ViewError::Blocked(inner.to_string()),
        other => ViewError::from(&other),
    }
}
