//! Result Presenter: a pure mapping from a graded attempt to display fields.

use learn_core::model::{ModuleId, QuestionOutcome, StoredTestResult, TestResult, ten_point_grade};

use crate::vm::time_fmt::format_datetime;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultEntryVm {
    pub number: usize,
    pub question_id: String,
    pub correct: bool,
    pub mark: &'static str,
    pub user_answer: Option<String>,
    /// Only for incorrect entries where the grader disclosed the key.
    pub correct_answer: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub headline: &'static str,
    pub passed: bool,
    pub grade: u8,
    pub grade_label: String,
    pub score_label: String,
    pub attempt_label: String,
    pub entries: Vec<ResultEntryVm>,
    pub unlock_notice: Option<String>,
    pub completed_label: Option<String>,
}

/// Display grade on the 0-10 scale.
#[must_use]
pub fn display_grade(percentage: u32) -> u8 {
    ten_point_grade(percentage)
}

/// `passed` and `percentage` are shown exactly as graded.
#[must_use]
pub fn present(result: &TestResult) -> ResultVm {
    build(
        result.passed,
        result.score,
        result.max_score,
        result.percentage,
        result.attempt_number,
        &result.detailed_results,
        result.next_module_unlocked.as_ref(),
    )
}

/// Same view for an attempt looked up from history.
#[must_use]
pub fn present_stored(result: &StoredTestResult) -> ResultVm {
    let mut vm = build(
        result.passed,
        result.score,
        result.max_score,
        result.percentage,
        result.attempt_number,
        &result.detailed_results,
        None,
    );
    vm.completed_label = result
        .completed_at
        .map(|at| format!("Completed {}", format_datetime(at)));
    vm
}

fn build(
    passed: bool,
    score: u32,
    max_score: u32,
    percentage: u32,
    attempt_number: u32,
    details: &[QuestionOutcome],
    unlocked: Option<&ModuleId>,
) -> ResultVm {
    let grade = display_grade(percentage);
    ResultVm {
        headline: if passed { "Test passed!" } else { "Test not passed" },
        passed,
        grade,
        grade_label: format!("{grade}/10"),
        score_label: format!("{score} of {max_score} correct ({percentage}%)"),
        attempt_label: format!("Attempt {attempt_number}"),
        entries: details
            .iter()
            .enumerate()
            .map(|(index, detail)| entry(index + 1, detail))
            .collect(),
        unlock_notice: unlocked.map(|module| format!("Module {module} unlocked!")),
        completed_label: None,
    }
}

fn entry(number: usize, detail: &QuestionOutcome) -> ResultEntryVm {
    ResultEntryVm {
        number,
        question_id: detail.question_id.to_string(),
        correct: detail.correct,
        mark: if detail.correct { "✓ Correct" } else { "✗ Incorrect" },
        user_answer: detail.user_answer.as_ref().map(ToString::to_string),
        correct_answer: if detail.correct {
            None
        } else {
            detail.correct_answer.as_ref().map(ToString::to_string)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::{AnswerEcho, QuestionId, ResultId};
    use learn_core::time::fixed_now;

    fn outcome(id: &str, correct: bool, given: &str, key: Option<&str>) -> QuestionOutcome {
        QuestionOutcome {
            question_id: QuestionId::new(id),
            correct,
            user_answer: Some(AnswerEcho::Text(given.into())),
            correct_answer: key.map(|k| AnswerEcho::Text(k.into())),
        }
    }

    fn half_right() -> TestResult {
        TestResult {
            result_id: ResultId::random(),
            score: 1,
            max_score: 2,
            percentage: 50,
            passed: false,
            detailed_results: vec![
                outcome("q1", true, "B", None),
                outcome("q2", false, "answer", Some("lifetime")),
            ],
            attempt_number: 1,
            next_module_unlocked: None,
        }
    }

    #[test]
    fn fifty_percent_is_grade_five() {
        let vm = present(&half_right());
        assert_eq!(vm.grade, 5);
        assert_eq!(vm.grade_label, "5/10");
        assert_eq!(vm.headline, "Test not passed");
        assert_eq!(vm.score_label, "1 of 2 correct (50%)");
        assert_eq!(vm.unlock_notice, None);
    }

    #[test]
    fn entries_follow_submitted_order_and_disclose_only_wrong_keys() {
        let vm = present(&half_right());
        let ids: Vec<_> = vm.entries.iter().map(|e| e.question_id.as_str()).collect();
        assert_eq!(ids, ["q1", "q2"]);
        assert_eq!(vm.entries[0].correct_answer, None);
        assert_eq!(vm.entries[1].correct_answer.as_deref(), Some("lifetime"));
        assert_eq!(vm.entries[1].user_answer.as_deref(), Some("answer"));
    }

    #[test]
    fn key_on_a_correct_entry_is_not_shown() {
        let mut result = half_right();
        result.detailed_results[0].correct_answer = Some(AnswerEcho::Text("B".into()));
        assert_eq!(present(&result).entries[0].correct_answer, None);
    }

    #[test]
    fn passed_flag_is_not_recomputed() {
        let mut result = half_right();
        result.passed = true;
        result.next_module_unlocked = Some(ModuleId::new("Module_02"));
        let vm = present(&result);
        assert_eq!(vm.headline, "Test passed!");
        assert_eq!(vm.grade, 5);
        assert_eq!(vm.unlock_notice.as_deref(), Some("Module Module_02 unlocked!"));
    }

    #[test]
    fn presenting_twice_is_identical() {
        let result = half_right();
        assert_eq!(present(&result), present(&result));
    }

    #[test]
    fn stored_results_show_completion_time() {
        let result = half_right();
        let stored = StoredTestResult {
            id: result.result_id,
            module_id: ModuleId::new("Module_01"),
            score: result.score,
            max_score: result.max_score,
            percentage: result.percentage,
            passed: result.passed,
            detailed_results: result.detailed_results.clone(),
            attempt_number: 3,
            completed_at: Some(fixed_now()),
        };
        let vm = present_stored(&stored);
        assert_eq!(vm.attempt_label, "Attempt 3");
        assert_eq!(
            vm.completed_label.as_deref(),
            Some("Completed 2023-11-14 22:13 UTC")
        );
        assert_eq!(vm.entries, present(&result).entries);
    }
}
