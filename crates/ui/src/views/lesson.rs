use crate::vm::LessonVm;

#[must_use]
pub fn render_lesson(vm: &LessonVm) -> String {
    let mut lines = vec![
        vm.title.clone(),
        vm.progress.label.clone(),
        vm.progress.bar.clone(),
        String::new(),
        vm.body.trim_end().to_string(),
        String::new(),
    ];
    if let Some(notice) = &vm.notice {
        lines.push(notice.clone());
    }
    lines.push(format!("[n] {}", vm.next_label));
    lines.join("\n") + "\n"
}
