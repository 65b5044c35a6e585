//! Plain-text screens for the terminal front end.

mod dashboard;
mod lesson;
mod result;
mod state;

#[cfg(test)]
mod view_smoke;

pub use dashboard::render_dashboard;
pub use lesson::render_lesson;
pub use result::render_result;
pub use state::{ViewError, ViewState, view_state_from_request};
pub use test::render_test;
