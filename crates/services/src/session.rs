use std::sync::Arc;

use crate::api::{HttpLmsClient, InMemoryLms, ModuleApi, ProgressApi, TestApi};
use crate::config::ClientConfig;
use crate::error::ApiError;

/// Capability object for one authenticated learner.
///
/// Holds the collaborators the progression and test flows may call. It is passed
/// explicitly into every component that talks to the network, so a scripted
/// session can stand in for the real one.
#[derive(Clone)]
pub struct LearnerSession {
    modules: Arc<dyn ModuleApi>,
    tests: Arc<dyn TestApi>,
    progress: Arc<dyn ProgressApi>,
}

impl LearnerSession {
    #[must_use]
    pub fn new(
        modules: Arc<dyn ModuleApi>,
        tests: Arc<dyn TestApi>,
        progress: Arc<dyn ProgressApi>,
    ) -> Self {
        Self {
            modules,
            tests,
            progress,
        }
    }

    /// Build a session backed by the LMS REST API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the configuration is unusable.
    pub fn http(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Arc::new(HttpLmsClient::new(config)?);
        Ok(Self::new(
            Arc::clone(&client) as Arc<dyn ModuleApi>,
            Arc::clone(&client) as Arc<dyn TestApi>,
            client,
        ))
    }

    #[must_use]
    pub fn in_memory(lms: InMemoryLms) -> Self {
        let lms = Arc::new(lms);
        Self::new(
            Arc::clone(&lms) as Arc<dyn ModuleApi>,
            Arc::clone(&lms) as Arc<dyn TestApi>,
            lms,
        )
    }

    #[must_use]
    pub fn modules(&self) -> Arc<dyn ModuleApi> {
        Arc::clone(&self.modules)
    }

    #[must_use]
    pub fn tests(&self) -> Arc<dyn TestApi> {
        Arc::clone(&self.tests)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<dyn ProgressApi> {
        Arc::clone(&self.progress)
    }
}

impl std::fmt::Debug for LearnerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LearnerSession").finish_non_exhaustive()
    }
}
