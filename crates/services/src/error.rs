//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::model::{AnswerError, ContentError, ModuleId, QuestionId, QuestionSetError};

const NETWORK_MESSAGE: &str =
    "Could not reach the learning service. Check your connection and try again.";
const PROTOCOL_MESSAGE: &str = "Something went wrong. Please try again later.";

/// Errors emitted by the LMS collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ApiError {
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The collaborator answered with an error status and a detail message.
    #[error("request rejected with status {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The response did not have the agreed shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub(crate) fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol(detail.into())
    }

    /// Transport failures and server-side faults may succeed when re-issued.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Rejected { status, .. } => *status >= 500,
            ApiError::Protocol(_) | ApiError::Config(_) => false,
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text shown to the learner. Collaborator details are passed through verbatim.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Rejected { detail, .. } => detail.clone(),
            ApiError::Protocol(detail) => protocol_message(detail),
            ApiError::Config(detail) => format!("Invalid configuration: {detail}"),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Protocol(err.to_string())
        } else if err.is_builder() {
            ApiError::Config(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

// Loud while developing, generic once released.
fn protocol_message(detail: &str) -> String {
    if cfg!(debug_assertions) {
        format!("Protocol error: {detail}")
    } else {
        PROTOCOL_MESSAGE.to_string()
    }
}

/// Errors emitted by `ProgressionController`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressionError {
    #[error("module {0} has handed off to its test")]
    Finished(ModuleId),

    #[error("lesson {received} arrived after lesson {previous}")]
    PositionRegressed { previous: u32, received: u32 },

    #[error("module {module_id} is not ready for its test: {detail}")]
    NotEligible { module_id: ModuleId, detail: String },

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Questions(#[from] QuestionSetError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ProgressionError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProgressionError::Api(err) if err.is_retryable())
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ProgressionError::Api(err) => err.user_message(),
            ProgressionError::NotEligible { detail, .. } => detail.clone(),
            ProgressionError::Finished(_) => "All lessons are done. Take the test.".to_string(),
            other => protocol_message(&other.to_string()),
        }
    }
}

/// Errors emitted by `TestSession`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("not all questions answered ({} missing)", .missing.len())]
    Incomplete { missing: Vec<QuestionId> },

    #[error("answers are locked while the test is being submitted")]
    Busy,

    #[error("this attempt has already been graded")]
    AlreadyGraded,

    #[error("module {module_id} is not ready for its test: {detail}")]
    NotEligible { module_id: ModuleId, detail: String },

    #[error(transparent)]
    Answer(#[from] AnswerError),

    #[error(transparent)]
    Questions(#[from] QuestionSetError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TestSessionError {
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, TestSessionError::Api(err) if err.is_retryable())
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TestSessionError::Api(err) => err.user_message(),
            TestSessionError::Incomplete { .. } => {
                "Please answer every question before submitting.".to_string()
            }
            TestSessionError::NotEligible { detail, .. } => detail.clone(),
            TestSessionError::Busy => "Your answers are being submitted.".to_string(),
            TestSessionError::AlreadyGraded => "This test has already been graded.".to_string(),
            other => protocol_message(&other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_detail_is_shown_verbatim() {
        let err = ApiError::Rejected {
            status: 400,
            detail: "Test not available. Complete all lessons first.".into(),
        };
        assert_eq!(
            err.user_message(),
            "Test not available. Complete all lessons first."
        );
        assert!(!err.is_retryable());
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn retryability_follows_the_taxonomy() {
        assert!(ApiError::Network("reset".into()).is_retryable());
        assert!(
            ApiError::Rejected {
                status: 503,
                detail: "down".into()
            }
            .is_retryable()
        );
        assert!(!ApiError::protocol("bad status").is_retryable());
        assert!(TestSessionError::Api(ApiError::Network("x".into())).is_retryable());
        assert!(!TestSessionError::Busy.is_retryable());
    }

    #[test]
    fn incomplete_message_counts_missing() {
        let err = TestSessionError::Incomplete {
            missing: vec![QuestionId::new("q2"), QuestionId::new("q3")],
        };
        assert_eq!(err.to_string(), "not all questions answered (2 missing)");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn protocol_faults_are_loud_in_debug_builds() {
        let message = ApiError::protocol("unknown status `paused`").user_message();
        assert!(message.contains("paused"));
    }
}
