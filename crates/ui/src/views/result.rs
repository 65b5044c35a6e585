use crate::vm::ResultVm;

#[must_use]
pub fn render_result(vm: &ResultVm) -> String {
    let mut lines = vec![
        vm.headline.to_string(),
        format!("Grade: {}", vm.grade_label),
        vm.score_label.clone(),
        vm.attempt_label.clone(),
    ];
    lines.extend(vm.completed_label.iter().cloned());

    if !vm.entries.is_empty() {
        lines.push(String::new());
    }
    for entry in &vm.entries {
        lines.push(format!("{}. {} {}", entry.number, entry.question_id, entry.mark));
        if let Some(given) = &entry.user_answer {
            lines.push(format!("   Your answer: {given}"));
        }
        if let Some(key) = &entry.correct_answer {
            lines.push(format!("   Correct answer: {key}"));
        }
    }

    if let Some(notice) = &vm.unlock_notice {
        lines.push(String::new());
        lines.push(notice.clone());
    }
    lines.push(String::new());
    lines.push("Back to dashboard".to_string());
    lines.join("\n") + "\n"
}
