//! Learner dashboard: catalogue, per-module progress and real grades.

use tracing::{debug, warn};

use learn_core::model::{
    Module, ModuleId, NextContent, Progress, ProgressOverview, ProgressStatus, ResultId,
    StoredTestResult,
};

use crate::error::ApiError;
use crate::session::LearnerSession;

/// One catalogue entry joined with the learner's progress on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleCard {
    pub module: Module,
    pub progress: Option<Progress>,
    /// Latest graded attempt, known only for completed modules.
    pub latest_result: Option<StoredTestResult>,
}

impl ModuleCard {
    #[must_use]
    pub fn status(&self) -> ProgressStatus {
        self.progress
            .as_ref()
            .map_or(ProgressStatus::NotStarted, |p| p.status)
    }

    /// Ten-point grade of the latest result; `None` when no result is known.
    #[must_use]
    pub fn grade(&self) -> Option<u8> {
        self.latest_result.as_ref().map(StoredTestResult::grade)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub overview: ProgressOverview,
    pub modules: Vec<ModuleCard>,
}

impl Dashboard {
    #[must_use]
    pub fn card(&self, module_id: &ModuleId) -> Option<&ModuleCard> {
        self.modules.iter().find(|card| &card.module.id == module_id)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardService {
    session: LearnerSession,
}

impl DashboardService {
    #[must_use]
    pub fn new(session: LearnerSession) -> Self {
        Self { session }
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the catalogue or the overview cannot be fetched.
    /// Missing grades are logged and left empty.
    pub async fn load(&self) -> Result<Dashboard, ApiError> {
        let mut catalogue = self.session.modules().list_modules().await?;
        catalogue.sort_by_key(|module| module.order_index);
        let overview = self.session.progress().overview().await?;

        let mut modules = Vec::with_capacity(catalogue.len());
        for module in catalogue {
            let progress = overview.module(&module.id).cloned();
            let latest_result = match progress.as_ref().map(|p| p.status) {
                Some(ProgressStatus::Completed) => self.latest_result(&module.id).await,
                _ => None,
            };
            modules.push(ModuleCard {
                module,
                progress,
                latest_result,
            });
        }

        Ok(Dashboard { overview, modules })
    }

    // A completed module answers "next" with a pointer to its latest result and
    // no change of position.
    async fn latest_result(&self, module_id: &ModuleId) -> Option<StoredTestResult> {
        let result_id = match self.session.modules().next_content(module_id).await {
            Ok(NextContent::Completed {
                test_result_id: Some(id),
            }) => id,
            Ok(other) => {
                debug!(%module_id, ?other, "completed module reported no result");
                return None;
            }
            Err(err) => {
                warn!(%module_id, %err, "could not look up latest result");
                return None;
            }
        };
        self.stored_result(result_id).await
    }

    async fn stored_result(&self, result_id: ResultId) -> Option<StoredTestResult> {
        match self.session.tests().result(result_id).await {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(%result_id, %err, "could not fetch stored result");
                None
            }
        }
    }
}
