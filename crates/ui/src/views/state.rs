use services::{ApiError, ProgressionError, RequestState, TestSessionError};

/// How a failure is presented to the learner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// Transient; the same action can be retried.
    Retry(String),
    /// The learner must change something first (e.g. answer every question).
    Blocked(String),
    /// The screen is not reachable yet; go back to the dashboard.
    ReturnToDashboard(String),
    Unknown(String),
}

impl ViewError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            ViewError::Retry(message)
            | ViewError::Blocked(message)
            | ViewError::ReturnToDashboard(message)
            | ViewError::Unknown(message) => message,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ViewError::Retry(_))
    }

    /// The line shown under a screen after this failure.
    #[must_use]
    pub fn notice(&self) -> String {
        if self.is_retryable() {
            format!("{} Try again.", self.message())
        } else {
            self.message().to_string()
        }
    }
}

impl From<&ApiError> for ViewError {
    fn from(err: &ApiError) -> Self {
        if err.is_retryable() {
            ViewError::Retry(err.user_message())
        } else {
            ViewError::Unknown(err.user_message())
        }
    }
}

impl From<&ProgressionError> for ViewError {
    fn from(err: &ProgressionError) -> Self {
        match err {
            ProgressionError::Api(api) => api.into(),
            ProgressionError::NotEligible { .. } | ProgressionError::Finished(_) => {
                ViewError::ReturnToDashboard(err.user_message())
            }
            _ => ViewError::Unknown(err.user_message()),
        }
    }
}

impl From<&TestSessionError> for ViewError {
    fn from(err: &TestSessionError) -> Self {
        match err {
            TestSessionError::Api(api) => api.into(),
            TestSessionError::Incomplete { .. } | TestSessionError::Busy => {
                ViewError::Blocked(err.user_message())
            }
            TestSessionError::NotEligible { .. } | TestSessionError::AlreadyGraded => {
                ViewError::ReturnToDashboard(err.user_message())
            }
            _ => ViewError::Unknown(err.user_message()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

/// Maps a request's lifecycle onto what the screen shows.
#[must_use]
pub fn view_state_from_request<T, E, V>(
    state: &RequestState<T, E>,
    present: impl FnOnce(&T) -> V,
) -> ViewState<V>
where
    for<'e> ViewError: From<&'e E>,
{
    match state {
        RequestState::Idle => ViewState::Idle,
        RequestState::Pending => ViewState::Loading,
        RequestState::Settled(Ok(value)) => ViewState::Ready(present(value)),
        RequestState::Settled(Err(err)) => ViewState::Error(ViewError::from(err)),
    }
}
