mod dashboard_vm;
mod lesson_vm;
mod markdown_vm;
mod result_vm;
mod study_vm;
mod test_vm;
mod time_fmt;

pub use dashboard_vm::{DashboardVm, ModuleCardVm, status_label};
pub use lesson_vm::{LessonVm, ProgressBarVm};
pub use markdown_vm::{markdown_to_text, normalize_text};
pub use result_vm::{ResultEntryVm, ResultVm, display_grade, present, present_stored};
pub use study_vm::{StudyScreen, StudyVm};
pub use test_vm::{AnswerInputVm, OptionVm, QuestionVm, TestVm};
pub use time_fmt::format_datetime;
