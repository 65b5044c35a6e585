//! Contracts for the external Module, Test and Progress services.

mod http;
mod memory;

use async_trait::async_trait;
use serde::Deserialize;

use learn_core::model::{
    Module, ModuleId, NextContent, Progress, ProgressOverview, ResultId, StoredTestResult,
    TestQuestions, TestResult, TestSubmission,
};

use crate::error::ApiError;

pub use http::HttpLmsClient;
pub use memory::{Endpoint, InMemoryLms, ModuleFixture};

/// Outcome of `POST /modules/{id}/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartOutcome {
    Started,
    AlreadyStarted,
}

/// Lesson delivery and the module catalogue.
#[async_trait]
pub trait ModuleApi: Send + Sync {
    /// Request the next content unit of a started module.
    ///
    /// Not idempotent: each success advances the learner's server-side position.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the call fails or the response has an unknown status.
    async fn next_content(&self, module_id: &ModuleId) -> Result<NextContent, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError` if the catalogue cannot be fetched.
    async fn list_modules(&self) -> Result<Vec<Module>, ApiError>;

    /// Create the learner's progress record for a module.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 for unknown modules.
    async fn start_module(&self, module_id: &ModuleId) -> Result<StartOutcome, ApiError>;
}

/// Test questions, submission and result history.
#[async_trait]
pub trait TestApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 400 while lessons remain.
    async fn test_questions(&self, module_id: &ModuleId) -> Result<TestQuestions, ApiError>;

    /// Submit one attempt. Each accepted call consumes an attempt.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the attempt is refused or the call fails.
    async fn submit_test(
        &self,
        module_id: &ModuleId,
        submission: &TestSubmission,
    ) -> Result<TestResult, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 for unknown results.
    async fn result(&self, result_id: ResultId) -> Result<StoredTestResult, ApiError>;
}

/// Progress records, read-only from the client's point of view.
#[async_trait]
pub trait ProgressApi: Send + Sync {
    /// # Errors
    ///
    /// Returns `ApiError` if the overview cannot be fetched.
    async fn overview(&self) -> Result<ProgressOverview, ApiError>;

    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with status 404 for modules never started.
    async fn module_progress(&self, module_id: &ModuleId) -> Result<Progress, ApiError>;
}
