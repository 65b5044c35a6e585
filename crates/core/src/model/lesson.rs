use serde::{Deserialize, Serialize};

use crate::model::ids::{ModuleId, ResultId};
use crate::model::progress::{ContentError, LessonPosition};
use crate::model::question::TestQuestions;

/// Response of `POST /modules/{id}/next`, discriminated by its `status` field.
///
/// Unknown statuses fail to deserialize. `Completed` is only expected for modules
/// the learner already finished; the lesson flow treats it as a protocol fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NextContent {
    Success(LessonPayload),
    ModuleCompleted {
        #[serde(default)]
        test_questions: Option<TestQuestions>,
    },
    Completed {
        #[serde(default)]
        test_result_id: Option<ResultId>,
    },
}

/// Wire shape of a delivered lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPayload {
    pub module_id: ModuleId,
    pub lesson_number: u32,
    pub total_lessons: u32,
    pub content: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub progress_percentage: u32,
}

impl LessonPayload {
    /// # Errors
    ///
    /// Returns `ContentError` if the position is outside the module.
    pub fn into_lesson(self) -> Result<Lesson, ContentError> {
        let position = LessonPosition::new(self.module_id, self.lesson_number, self.total_lessons)?;
        Ok(Lesson {
            position,
            content: self.content,
            content_type: self.content_type.unwrap_or_else(|| "markdown".to_string()),
            progress_percentage: self.progress_percentage,
        })
    }
}

/// A validated lesson ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub position: LessonPosition,
    pub content: String,
    pub content_type: String,
    /// Server-computed; displayed as-is.
    pub progress_percentage: u32,
}

impl Lesson {
    #[must_use]
    pub fn lesson_number(&self) -> u32 {
        self.position.lesson_number()
    }

    #[must_use]
    pub fn total_lessons(&self) -> u32 {
        self.position.total_lessons()
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        self.position.module_id()
    }
}
