use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ModuleId;
use crate::model::timestamp;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContentError {
    #[error("module must have at least one lesson")]
    NoLessons,

    #[error("lesson {lesson_number} is outside 1..={total_lessons}")]
    LessonOutOfRange {
        lesson_number: u32,
        total_lessons: u32,
    },
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Server-side lifecycle of a learner's progress through one module.
///
/// `not_started → in_progress → testing → completed | failed`, and `failed → testing`
/// when the learner retakes the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Testing,
    Completed,
    Failed,
}

impl ProgressStatus {
    /// Status the collaborator moves to once a graded result comes back.
    #[must_use]
    pub fn after_result(passed: bool) -> Self {
        if passed {
            ProgressStatus::Completed
        } else {
            ProgressStatus::Failed
        }
    }
}

//
// ─── LESSON POSITION ───────────────────────────────────────────────────────────
//

/// Where a learner stands inside a module, derived from the latest server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonPosition {
    module_id: ModuleId,
    lesson_number: u32,
    total_lessons: u32,
}

impl LessonPosition {
    /// # Errors
    ///
    /// Returns `ContentError::NoLessons` if `total_lessons` is zero.
    /// Returns `ContentError::LessonOutOfRange` unless `1 <= lesson_number <= total_lessons`.
    pub fn new(
        module_id: ModuleId,
        lesson_number: u32,
        total_lessons: u32,
    ) -> Result<Self, ContentError> {
        if total_lessons == 0 {
            return Err(ContentError::NoLessons);
        }
        if lesson_number == 0 || lesson_number > total_lessons {
            return Err(ContentError::LessonOutOfRange {
                lesson_number,
                total_lessons,
            });
        }
        Ok(Self {
            module_id,
            lesson_number,
            total_lessons,
        })
    }

    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn lesson_number(&self) -> u32 {
        self.lesson_number
    }

    #[must_use]
    pub fn total_lessons(&self) -> u32 {
        self.total_lessons
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.lesson_number == self.total_lessons
    }
}

//
// ─── PROGRESS RECORDS ──────────────────────────────────────────────────────────
//

/// Per-module progress as reported by the collaborator.
///
/// `progress_percentage` is authoritative; clients display it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub module_id: ModuleId,
    pub current_lesson: u32,
    pub total_lessons: u32,
    pub status: ProgressStatus,
    pub progress_percentage: u32,
    #[serde(deserialize_with = "timestamp::utc")]
    pub started_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::utc")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::utc_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Aggregate progress across all modules the learner has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressOverview {
    pub total_modules: u32,
    pub completed_modules: u32,
    pub in_progress_modules: u32,
    #[serde(default)]
    pub average_grade: Option<f64>,
    #[serde(default)]
    pub modules: Vec<Progress>,
}

impl ProgressOverview {
    #[must_use]
    pub fn module(&self, module_id: &ModuleId) -> Option<&Progress> {
        self.modules.iter().find(|p| &p.module_id == module_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn position_rejects_out_of_range_lessons() {
        let module = ModuleId::new("Module_01");
        assert!(LessonPosition::new(module.clone(), 1, 3).is_ok());
        assert!(LessonPosition::new(module.clone(), 3, 3).unwrap().is_last());
        assert_eq!(
            LessonPosition::new(module.clone(), 0, 3).unwrap_err(),
            ContentError::LessonOutOfRange {
                lesson_number: 0,
                total_lessons: 3
            }
        );
        assert!(LessonPosition::new(module.clone(), 4, 3).is_err());
        assert_eq!(
            LessonPosition::new(module, 1, 0).unwrap_err(),
            ContentError::NoLessons
        );
    }

    #[test]
    fn graded_attempt_decides_the_final_status() {
        assert_eq!(ProgressStatus::after_result(true), ProgressStatus::Completed);
        assert_eq!(ProgressStatus::after_result(false), ProgressStatus::Failed);
    }

    #[test]
    fn progress_deserializes_server_shape() {
        let now = fixed_now();
        let json = serde_json::json!({
            "module_id": "Module_02",
            "current_lesson": 2,
            "total_lessons": 4,
            "status": "in_progress",
            "progress_percentage": 50,
            "started_at": now,
            "updated_at": now,
            "completed_at": null
        });

        let progress: Progress = serde_json::from_value(json).unwrap();
        assert_eq!(progress.status, ProgressStatus::InProgress);
        assert_eq!(progress.progress_percentage, 50);
        assert_eq!(progress.completed_at, None);
    }

    #[test]
    fn progress_accepts_timestamps_without_offset() {
        let json = serde_json::json!({
            "module_id": "Module_01",
            "current_lesson": 3,
            "total_lessons": 3,
            "status": "completed",
            "progress_percentage": 100,
            "started_at": "2024-05-01T10:00:00.123456",
            "updated_at": "2024-05-02T08:30:00",
            "completed_at": "2024-05-02T08:30:00"
        });

        let progress: Progress = serde_json::from_value(json).unwrap();
        assert_eq!(progress.started_at.to_rfc3339(), "2024-05-01T10:00:00.123456+00:00");
        assert_eq!(progress.completed_at, Some(progress.updated_at));
    }
}
