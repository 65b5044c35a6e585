use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use learn_core::model::{
    Module, ModuleId, NextContent, Progress, ProgressOverview, ResultId, StoredTestResult,
    TestQuestions, TestResult, TestSubmission,
};

use super::{ModuleApi, ProgressApi, StartOutcome, TestApi};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// reqwest-backed client for the LMS REST API.
#[derive(Clone, Debug)]
pub struct HttpLmsClient {
    client: Client,
    config: ClientConfig,
}

impl HttpLmsClient {
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.endpoint(path));
        match &self.config.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(request = what, error = %e, "lms request failed");
            ApiError::from(e)
        })?;
        let response = check_status(response, what).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::protocol(format!("{what}: unexpected response shape: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    status: StartOutcome,
}

async fn check_status(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        debug!(request = what, status = status.as_u16(), "lms request finished");
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let detail = error_detail(&body)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    warn!(request = what, status = status.as_u16(), %detail, "lms request rejected");
    Err(ApiError::Rejected {
        status: status.as_u16(),
        detail,
    })
}

/// Pulls the `detail` member out of an error body; validation errors carry a list.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl ModuleApi for HttpLmsClient {
    #[instrument(skip(self))]
    async fn next_content(&self, module_id: &ModuleId) -> Result<NextContent, ApiError> {
        let path = format!("modules/{}/next", module_id.as_str());
        self.send_json(self.request(Method::POST, &path), "next_content")
            .await
    }

    #[instrument(skip(self))]
    async fn list_modules(&self) -> Result<Vec<Module>, ApiError> {
        self.send_json(self.request(Method::GET, "modules"), "list_modules")
            .await
    }

    #[instrument(skip(self))]
    async fn start_module(&self, module_id: &ModuleId) -> Result<StartOutcome, ApiError> {
        let path = format!("modules/{}/start", module_id.as_str());
        let response: StartResponse = self
            .send_json(self.request(Method::POST, &path), "start_module")
            .await?;
        Ok(response.status)
    }
}

#[async_trait]
impl TestApi for HttpLmsClient {
    #[instrument(skip(self))]
    async fn test_questions(&self, module_id: &ModuleId) -> Result<TestQuestions, ApiError> {
        let path = format!("modules/{}/test", module_id.as_str());
        self.send_json(self.request(Method::GET, &path), "test_questions")
            .await
    }

    #[instrument(skip(self, submission), fields(answers = submission.answers.len()))]
    async fn submit_test(
        &self,
        module_id: &ModuleId,
        submission: &TestSubmission,
    ) -> Result<TestResult, ApiError> {
        let path = format!("modules/{}/test", module_id.as_str());
        let builder = self.request(Method::POST, &path).json(submission);
        self.send_json(builder, "submit_test").await
    }

    #[instrument(skip(self))]
    async fn result(&self, result_id: ResultId) -> Result<StoredTestResult, ApiError> {
        let path = format!("tests/results/{result_id}");
        self.send_json(self.request(Method::GET, &path), "result")
            .await
    }
}

#[async_trait]
impl ProgressApi for HttpLmsClient {
    #[instrument(skip(self))]
    async fn overview(&self) -> Result<ProgressOverview, ApiError> {
        self.send_json(self.request(Method::GET, "progress"), "overview")
            .await
    }

    #[instrument(skip(self))]
    async fn module_progress(&self, module_id: &ModuleId) -> Result<Progress, ApiError> {
        let path = format!("progress/{}", module_id.as_str());
        self.send_json(self.request(Method::GET, &path), "module_progress")
            .await
    }
}
