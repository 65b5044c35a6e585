#![forbid(unsafe_code)]

pub mod api;
pub mod assessment;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod progression;
pub mod request;
pub mod session;

pub use learn_core::Clock;

pub use api::{
    Endpoint, HttpLmsClient, InMemoryLms, ModuleApi, ModuleFixture, ProgressApi, StartOutcome,
    TestApi,
};
pub use assessment::{Submission, SubmissionState, TestSession};
pub use config::ClientConfig;
pub use dashboard::{Dashboard, DashboardService, ModuleCard};
pub use error::{ApiError, ProgressionError, TestSessionError};
pub use progression::{Delivered, ProgressionController, ProgressionState, Step, TestHandoff};
pub use request::{InFlight, Refusal, RequestSlot, RequestState};
pub use session::LearnerSession;
