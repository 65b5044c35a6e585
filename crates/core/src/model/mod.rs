mod answer;
mod ids;
mod lesson;
mod module;
mod progress;
mod question;
mod result;
mod timestamp;

pub use ids::{ModuleId, OptionId, ParseIdError, QuestionId, ResultId};

pub use answer::{Answer, AnswerError, AnswerValue, TestSubmission};
pub use lesson::{Lesson, LessonPayload, NextContent};
pub use module::Module;
pub use progress::{ContentError, LessonPosition, Progress, ProgressOverview, ProgressStatus};
pub use question::{
    Question, QuestionKind, QuestionOption, QuestionSetError, QuestionType, TestQuestions,
};
pub use result::{AnswerEcho, QuestionOutcome, StoredTestResult, TestResult, ten_point_grade};
