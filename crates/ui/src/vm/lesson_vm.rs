use learn_core::model::Lesson;

use crate::vm::markdown_vm::markdown_to_text;

const BAR_WIDTH: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressBarVm {
    pub label: String,
    pub percentage: u32,
    pub bar: String,
}

impl ProgressBarVm {
    /// `percentage` comes from the collaborator and is shown as-is.
    #[must_use]
    pub fn new(current: u32, total: u32, percentage: u32) -> Self {
        let filled = (percentage.min(100) as usize * BAR_WIDTH) / 100;
        let bar = format!(
            "[{}{}] {percentage}%",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled)
        );
        Self {
            label: format!("Progress: {current} of {total}"),
            percentage,
            bar,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonVm {
    pub title: String,
    pub progress: ProgressBarVm,
    pub body: String,
    pub next_label: &'static str,
    /// Outcome of the last request, shown above the next-lesson action.
    pub notice: Option<String>,
}

impl LessonVm {
    #[must_use]
    pub fn from_lesson(lesson: &Lesson) -> Self {
        let body = if lesson.content_type.eq_ignore_ascii_case("markdown") {
            markdown_to_text(&lesson.content)
        } else {
            lesson.content.clone()
        };
        let next_label = if lesson.position.is_last() {
            "Finish lessons"
        } else {
            "Next lesson"
        };
        Self {
            title: format!(
                "{}: lesson {} of {}",
                lesson.module_id(),
                lesson.lesson_number(),
                lesson.total_lessons()
            ),
            progress: ProgressBarVm::new(
                lesson.lesson_number(),
                lesson.total_lessons(),
                lesson.progress_percentage,
            ),
            body,
            next_label,
            notice: None,
        }
    }

    #[must_use]
    pub fn with_notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }
}
