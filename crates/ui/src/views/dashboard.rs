use crate::vm::{DashboardVm, ModuleCardVm};

#[must_use]
pub fn render_dashboard(vm: &DashboardVm) -> String {
    let mut lines = vec![format!(
        "Modules: {}  Completed: {}  In progress: {}  Average grade: {}",
        vm.total_modules, vm.completed_modules, vm.in_progress_modules, vm.average_grade_label
    )];
    for card in &vm.modules {
        lines.push(String::new());
        lines.extend(card_lines(card));
    }
    lines.join("\n") + "\n"
}

fn card_lines(card: &ModuleCardVm) -> Vec<String> {
    let mut lines = vec![format!("{}  {}  [{}]", card.id, card.title, card.status_label)];
    if let Some(description) = &card.description {
        lines.push(format!("  {description}"));
    }
    if let Some(progress) = &card.progress {
        lines.push(format!("  {}  {}", progress.label, progress.bar));
    }
    if let Some(grade) = &card.grade_label {
        lines.push(format!("  Grade: {grade}"));
    }
    lines.push(format!("  -> {}", card.action_label));
    lines
}
