//! Scripted in-process LMS used by tests and offline demos.
//!
//! Mirrors the server's rules closely enough to drive a full learner flow:
//! lessons are served one per call, the last call hands out the test, grading
//! compares against an answer key with a 70% pass mark. Every call is counted
//! and yields once before answering so in-flight guards can be observed.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use learn_core::Clock;
use learn_core::model::{
    AnswerEcho, AnswerValue, LessonPayload, Module, ModuleId, NextContent, Progress,
    ProgressOverview, ProgressStatus, Question, QuestionId, QuestionOutcome, ResultId,
    StoredTestResult, TestQuestions, TestResult, TestSubmission,
};

use super::{ModuleApi, ProgressApi, StartOutcome, TestApi};
use crate::error::ApiError;

const PASS_PERCENTAGE: u32 = 70;

/// Collaborator endpoints, used to count calls and inject failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    NextContent,
    ListModules,
    StartModule,
    TestQuestions,
    SubmitTest,
    Result,
    Overview,
    ModuleProgress,
}

/// One module as the fake server knows it: lessons, questions and the answer key.
#[derive(Debug, Clone)]
pub struct ModuleFixture {
    module: Module,
    lessons: Vec<String>,
    questions: Vec<Question>,
    key: HashMap<QuestionId, AnswerValue>,
}

impl ModuleFixture {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            module: Module::new(ModuleId::new(id), title, 0),
            lessons: Vec::new(),
            questions: Vec::new(),
            key: HashMap::new(),
        }
    }

    #[must_use]
    pub fn lesson(mut self, content: impl Into<String>) -> Self {
        self.lessons.push(content.into());
        self.module.total_lessons = u32::try_from(self.lessons.len()).unwrap_or(u32::MAX);
        self
    }

    #[must_use]
    pub fn question(mut self, question: Question, correct: AnswerValue) -> Self {
        self.key.insert(question.id.clone(), correct);
        self.questions.push(question);
        self
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.module.id
    }

    fn total_lessons(&self) -> u32 {
        self.module.total_lessons
    }

    fn test_questions(&self) -> TestQuestions {
        TestQuestions::new(self.questions.clone())
    }

    fn lesson_content(&self, lesson_number: u32) -> String {
        usize::try_from(lesson_number)
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.lessons.get(index))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct LmsState {
    modules: Vec<ModuleFixture>,
    progress: HashMap<ModuleId, Progress>,
    results: Vec<StoredTestResult>,
    calls: HashMap<Endpoint, usize>,
    failures: HashMap<Endpoint, VecDeque<ApiError>>,
    withhold_questions: bool,
    clock: Clock,
}

impl LmsState {
    fn fixture(&self, module_id: &ModuleId) -> Result<&ModuleFixture, ApiError> {
        self.modules
            .iter()
            .find(|fixture| fixture.id() == module_id)
            .ok_or_else(|| rejected(404, "Module not found"))
    }

    fn next_module_after(&self, module_id: &ModuleId) -> Option<ModuleId> {
        let index = self.modules.iter().position(|f| f.id() == module_id)?;
        self.modules.get(index + 1).map(|f| f.id().clone())
    }

    fn latest_result(&self, module_id: &ModuleId) -> Option<ResultId> {
        self.results
            .iter()
            .rev()
            .find(|r| &r.module_id == module_id)
            .map(|r| r.id)
    }

    fn testing_progress(&mut self, module_id: &ModuleId) -> Result<&mut Progress, ApiError> {
        match self.progress.get_mut(module_id) {
            Some(progress) if progress.status == ProgressStatus::Testing => Ok(progress),
            _ => Err(rejected(
                400,
                "Test not available. Complete all lessons first.",
            )),
        }
    }
}

/// Shared, cloneable handle to the fake server.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLms {
    state: Arc<Mutex<LmsState>>,
}

impl InMemoryLms {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module; catalogue order follows insertion order.
    #[must_use]
    pub fn with_module(self, mut fixture: ModuleFixture) -> Self {
        {
            let mut state = self.fixture_state();
            fixture.module.order_index = u32::try_from(state.modules.len() + 1).unwrap_or(u32::MAX);
            state.modules.push(fixture);
        }
        self
    }

    #[must_use]
    pub fn with_clock(self, clock: Clock) -> Self {
        self.fixture_state().clock = clock;
        self
    }

    /// Completion responses stop carrying questions, forcing the `GET .../test` path.
    #[must_use]
    pub fn without_carried_questions(self) -> Self {
        self.fixture_state().withhold_questions = true;
        self
    }

    /// Queue a failure for the next call to `endpoint`. The call is still counted.
    pub fn fail_next(&self, endpoint: Endpoint, error: ApiError) {
        self.fixture_state()
            .failures
            .entry(endpoint)
            .or_default()
            .push_back(error);
    }

    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.fixture_state().calls.get(&endpoint).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn results(&self) -> Vec<StoredTestResult> {
        self.fixture_state().results.clone()
    }

    // Fixture setup and inspection must not silently skip after a test thread
    // panicked while holding the lock.
    fn fixture_state(&self) -> MutexGuard<'_, LmsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LmsState>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn enter(&self, endpoint: Endpoint) -> Result<(), ApiError> {
        let injected = {
            let mut state = self.lock()?;
            *state.calls.entry(endpoint).or_default() += 1;
            state
                .failures
                .get_mut(&endpoint)
                .and_then(VecDeque::pop_front)
        };
        tokio::task::yield_now().await;
        match injected {
            Some(err) => {
                debug!(?endpoint, %err, "injected failure");
                Err(err)
            }
            None => Ok(()),
        }
    }
}

fn rejected(status: u16, detail: &str) -> ApiError {
    ApiError::Rejected {
        status,
        detail: detail.to_string(),
    }
}

fn percentage_of(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        part.saturating_mul(100) / whole
    }
}

fn echo(value: &AnswerValue) -> AnswerEcho {
    match value {
        AnswerValue::Choice(option) => AnswerEcho::Text(option.as_str().to_string()),
        AnswerValue::Choices(options) => {
            AnswerEcho::List(options.iter().map(|o| o.as_str().to_string()).collect())
        }
        AnswerValue::Text(text) => AnswerEcho::Text(text.clone()),
    }
}

fn same_text(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Text compares case-insensitively after trimming; option sets compare as sets.
fn matches_key(given: &AnswerValue, key: &AnswerValue) -> bool {
    match (given, key) {
        (AnswerValue::Choice(a), AnswerValue::Choice(b)) => same_text(a.as_str(), b.as_str()),
        (AnswerValue::Text(a), AnswerValue::Text(b)) => same_text(a, b),
        (AnswerValue::Choices(a), AnswerValue::Choices(b)) => a == b,
        _ => false,
    }
}

#[async_trait]
impl ModuleApi for InMemoryLms {
    async fn next_content(&self, module_id: &ModuleId) -> Result<NextContent, ApiError> {
        self.enter(Endpoint::NextContent).await?;
        let mut guard = self.lock()?;
        let state = &mut *guard;
        let now = state.clock.now();
        let fixture = state.fixture(module_id)?.clone();
        let latest = state.latest_result(module_id);
        let progress = state
            .progress
            .get_mut(module_id)
            .ok_or_else(|| rejected(404, "Module not started. Please start the module first."))?;

        if progress.status == ProgressStatus::Completed {
            return Ok(NextContent::Completed {
                test_result_id: latest,
            });
        }

        if progress.current_lesson >= progress.total_lessons {
            progress.status = ProgressStatus::Testing;
            progress.updated_at = now;
            let test_questions = (!state.withhold_questions).then(|| fixture.test_questions());
            return Ok(NextContent::ModuleCompleted { test_questions });
        }

        progress.current_lesson += 1;
        progress.status = ProgressStatus::InProgress;
        progress.progress_percentage =
            percentage_of(progress.current_lesson, progress.total_lessons);
        progress.updated_at = now;

        Ok(NextContent::Success(LessonPayload {
            module_id: module_id.clone(),
            lesson_number: progress.current_lesson,
            total_lessons: progress.total_lessons,
            content: fixture.lesson_content(progress.current_lesson),
            content_type: Some("markdown".to_string()),
            progress_percentage: progress.progress_percentage,
        }))
    }

    async fn list_modules(&self) -> Result<Vec<Module>, ApiError> {
        self.enter(Endpoint::ListModules).await?;
        let state = self.lock()?;
        Ok(state
            .modules
            .iter()
            .map(|fixture| fixture.module.clone())
            .filter(|module| module.is_active)
            .collect())
    }

    async fn start_module(&self, module_id: &ModuleId) -> Result<StartOutcome, ApiError> {
        self.enter(Endpoint::StartModule).await?;
        let mut state = self.lock()?;
        let total_lessons = state.fixture(module_id)?.total_lessons();
        if state.progress.contains_key(module_id) {
            return Ok(StartOutcome::AlreadyStarted);
        }
        let now = state.clock.now();
        state.progress.insert(
            module_id.clone(),
            Progress {
                module_id: module_id.clone(),
                current_lesson: 0,
                total_lessons,
                status: ProgressStatus::InProgress,
                progress_percentage: 0,
                started_at: now,
                updated_at: now,
                completed_at: None,
            },
        );
        Ok(StartOutcome::Started)
    }
}

#[async_trait]
impl TestApi for InMemoryLms {
    async fn test_questions(&self, module_id: &ModuleId) -> Result<TestQuestions, ApiError> {
        self.enter(Endpoint::TestQuestions).await?;
        let mut state = self.lock()?;
        state.testing_progress(module_id)?;
        let questions = state.fixture(module_id)?.test_questions();
        if questions.is_empty() {
            return Err(rejected(404, "Test questions not found"));
        }
        Ok(questions)
    }

    async fn submit_test(
        &self,
        module_id: &ModuleId,
        submission: &TestSubmission,
    ) -> Result<TestResult, ApiError> {
        self.enter(Endpoint::SubmitTest).await?;
        let mut guard = self.lock()?;
        let state = &mut *guard;
        state.testing_progress(module_id)?;
        let fixture = state.fixture(module_id)?.clone();

        let detailed_results: Vec<QuestionOutcome> = submission
            .answers
            .iter()
            .map(|answer| {
                let key = fixture.key.get(&answer.question_id);
                let correct = key.is_some_and(|key| matches_key(&answer.value, key));
                QuestionOutcome {
                    question_id: answer.question_id.clone(),
                    correct,
                    user_answer: Some(echo(&answer.value)),
                    correct_answer: if correct { None } else { key.map(echo) },
                }
            })
            .collect();

        let score = u32::try_from(detailed_results.iter().filter(|d| d.correct).count())
            .unwrap_or(u32::MAX);
        let max_score = u32::try_from(fixture.questions.len()).unwrap_or(u32::MAX);
        let percentage = percentage_of(score, max_score);
        let passed = max_score > 0 && percentage >= PASS_PERCENTAGE;
        let attempt_number = u32::try_from(
            state
                .results
                .iter()
                .filter(|r| &r.module_id == module_id)
                .count()
                + 1,
        )
        .unwrap_or(u32::MAX);

        let now = state.clock.now();
        let result_id = ResultId::random();
        state.results.push(StoredTestResult {
            id: result_id,
            module_id: module_id.clone(),
            score,
            max_score,
            percentage,
            passed,
            detailed_results: detailed_results.clone(),
            attempt_number,
            completed_at: Some(now),
        });

        let next_module_unlocked = if passed {
            state.next_module_after(module_id)
        } else {
            None
        };
        if let Some(progress) = state.progress.get_mut(module_id) {
            progress.status = ProgressStatus::after_result(passed);
            progress.updated_at = now;
            if passed {
                progress.completed_at = Some(now);
            }
        }

        Ok(TestResult {
            result_id,
            score,
            max_score,
            percentage,
            passed,
            detailed_results,
            attempt_number,
            next_module_unlocked,
        })
    }

    async fn result(&self, result_id: ResultId) -> Result<StoredTestResult, ApiError> {
        self.enter(Endpoint::Result).await?;
        let state = self.lock()?;
        state
            .results
            .iter()
            .find(|r| r.id == result_id)
            .cloned()
            .ok_or_else(|| rejected(404, "Test result not found"))
    }
}

#[async_trait]
impl ProgressApi for InMemoryLms {
    async fn overview(&self) -> Result<ProgressOverview, ApiError> {
        self.enter(Endpoint::Overview).await?;
        let state = self.lock()?;
        let mut modules: Vec<Progress> = state.progress.values().cloned().collect();
        modules.sort_by_key(|p| {
            state
                .modules
                .iter()
                .position(|f| f.id() == &p.module_id)
                .unwrap_or(usize::MAX)
        });

        let completed: Vec<&ModuleId> = modules
            .iter()
            .filter(|p| p.status == ProgressStatus::Completed)
            .map(|p| &p.module_id)
            .collect();
        let passed: Vec<u32> = state
            .results
            .iter()
            .filter(|r| r.passed && completed.contains(&&r.module_id))
            .map(|r| r.percentage)
            .collect();
        let average_grade = if passed.is_empty() {
            None
        } else {
            let mean = f64::from(passed.iter().sum::<u32>()) / passed.len() as f64;
            // one decimal on the ten-point scale
            Some(mean.round() / 10.0)
        };

        let count = |pred: fn(ProgressStatus) -> bool| {
            u32::try_from(modules.iter().filter(|p| pred(p.status)).count()).unwrap_or(u32::MAX)
        };
        Ok(ProgressOverview {
            total_modules: u32::try_from(modules.len()).unwrap_or(u32::MAX),
            completed_modules: count(|s| s == ProgressStatus::Completed),
            in_progress_modules: count(|s| {
                matches!(s, ProgressStatus::InProgress | ProgressStatus::Testing)
            }),
            average_grade,
            modules,
        })
    }

    async fn module_progress(&self, module_id: &ModuleId) -> Result<Progress, ApiError> {
        self.enter(Endpoint::ModuleProgress).await?;
        let state = self.lock()?;
        state
            .progress
            .get(module_id)
            .cloned()
            .ok_or_else(|| rejected(404, "Progress not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::{Answer, QuestionOption};
    use learn_core::time::fixed_clock;

    fn lms() -> InMemoryLms {
        InMemoryLms::new()
            .with_clock(fixed_clock())
            .with_module(
                ModuleFixture::new("Module_01", "Basics")
                    .lesson("# One")
                    .question(
                        Question::single_choice(
                            "q1",
                            "Pick",
                            vec![QuestionOption::new("A", "a"), QuestionOption::new("B", "b")],
                        ),
                        AnswerValue::choice("B"),
                    )
                    .question(
                        Question::multiple_choice(
                            "q2",
                            "Pick many",
                            vec![
                                QuestionOption::new("A", "a"),
                                QuestionOption::new("B", "b"),
                                QuestionOption::new("C", "c"),
                            ],
                        ),
                        AnswerValue::choices(["A", "C"]),
                    )
                    .question(
                        Question::text_input("q3", "Say", None),
                        AnswerValue::text("Ownership"),
                    ),
            )
            .with_module(ModuleFixture::new("Module_02", "Next").lesson("# Two"))
    }

    fn answer(id: &str, value: AnswerValue) -> Answer {
        Answer {
            question_id: QuestionId::new(id),
            value,
        }
    }

    #[test]
    fn key_matching_follows_grader_rules() {
        assert!(matches_key(
            &AnswerValue::text("  ownership "),
            &AnswerValue::text("Ownership")
        ));
        assert!(matches_key(
            &AnswerValue::choices(["C", "A"]),
            &AnswerValue::choices(["A", "C"])
        ));
        assert!(!matches_key(
            &AnswerValue::choices(["A"]),
            &AnswerValue::choices(["A", "C"])
        ));
        assert!(!matches_key(&AnswerValue::text("B"), &AnswerValue::choice("B")));
    }

    #[tokio::test]
    async fn next_requires_a_started_module() {
        let lms = lms();
        let module = ModuleId::new("Module_01");
        let err = lms.next_content(&module).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        assert_eq!(lms.start_module(&module).await.unwrap(), StartOutcome::Started);
        assert_eq!(
            lms.start_module(&module).await.unwrap(),
            StartOutcome::AlreadyStarted
        );
        assert_eq!(lms.calls(Endpoint::StartModule), 2);
    }

    #[tokio::test]
    async fn grading_passes_at_seventy_percent_and_unlocks_next() {
        let lms = lms();
        let module = ModuleId::new("Module_01");
        lms.start_module(&module).await.unwrap();
        lms.next_content(&module).await.unwrap();
        assert!(matches!(
            lms.next_content(&module).await.unwrap(),
            NextContent::ModuleCompleted {
                test_questions: Some(_)
            }
        ));
        // testing still counts as in progress
        assert_eq!(lms.overview().await.unwrap().in_progress_modules, 1);

        let submission = TestSubmission {
            answers: vec![
                answer("q1", AnswerValue::choice("B")),
                answer("q2", AnswerValue::choices(["A", "C"])),
                answer("q3", AnswerValue::text("wrong")),
            ],
        };
        let result = lms.submit_test(&module, &submission).await.unwrap();
        assert_eq!((result.score, result.max_score, result.percentage), (2, 3, 66));
        assert!(!result.passed);
        assert_eq!(result.next_module_unlocked, None);
        assert_eq!(
            result.detailed_results[2].correct_answer,
            Some(AnswerEcho::Text("Ownership".into()))
        );
        assert_eq!(result.detailed_results[0].correct_answer, None);

        // a failed attempt re-opens the test on the next call
        lms.next_content(&module).await.unwrap();
        let submission = TestSubmission {
            answers: vec![
                answer("q1", AnswerValue::choice("B")),
                answer("q2", AnswerValue::choices(["A", "C"])),
                answer("q3", AnswerValue::text("ownership")),
            ],
        };
        let result = lms.submit_test(&module, &submission).await.unwrap();
        assert!(result.passed);
        assert_eq!(result.attempt_number, 2);
        assert_eq!(result.next_module_unlocked, Some(ModuleId::new("Module_02")));

        let overview = lms.overview().await.unwrap();
        assert_eq!(overview.completed_modules, 1);
        assert_eq!(overview.average_grade, Some(10.0));
        assert!(matches!(
            lms.next_content(&module).await.unwrap(),
            NextContent::Completed {
                test_result_id: Some(id)
            } if id == result.result_id
        ));
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_once() {
        let lms = lms();
        lms.fail_next(Endpoint::ListModules, ApiError::Network("offline".into()));
        assert!(lms.list_modules().await.is_err());
        let modules = lms.list_modules().await.unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].order_index, 2);
        assert_eq!(lms.calls(Endpoint::ListModules), 2);
    }

    #[test]
    fn setup_after_a_poisoned_lock_still_applies() {
        let lms = InMemoryLms::new();
        let held = lms.clone();
        let poisoned = std::thread::spawn(move || {
            let _guard = held.state.lock().unwrap();
            panic!("fixture thread died");
        })
        .join();
        assert!(poisoned.is_err());
        assert!(lms.state.is_poisoned());

        let lms = lms
            .with_clock(fixed_clock())
            .with_module(ModuleFixture::new("Module_01", "Basics").lesson("x"))
            .without_carried_questions();
        lms.fail_next(Endpoint::ListModules, ApiError::Network("offline".into()));

        let state = lms.fixture_state();
        assert_eq!(state.modules.len(), 1);
        assert_eq!(state.modules[0].module.order_index, 1);
        assert!(state.withhold_questions);
        assert_eq!(state.failures[&Endpoint::ListModules].len(), 1);
        drop(state);
        assert_eq!(lms.calls(Endpoint::ListModules), 0);
    }

    #[tokio::test]
    async fn questions_endpoint_requires_testing_status() {
        let lms = lms();
        let module = ModuleId::new("Module_01");
        lms.start_module(&module).await.unwrap();
        let err = lms.test_questions(&module).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Rejected {
                status: 400,
                detail: "Test not available. Complete all lessons first.".into()
            }
        );
    }
}
