use learn_core::model::ProgressStatus;
use services::{Dashboard, ModuleCard};

use crate::vm::lesson_vm::ProgressBarVm;

#[must_use]
pub fn status_label(status: ProgressStatus) -> &'static str {
    match status {
        ProgressStatus::Completed => "Completed",
        ProgressStatus::InProgress => "In progress",
        ProgressStatus::Testing => "Testing",
        ProgressStatus::Failed => "Not passed",
        ProgressStatus::NotStarted => "Not started",
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleCardVm {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status_label: &'static str,
    pub action_label: &'static str,
    pub progress: Option<ProgressBarVm>,
    pub grade_label: Option<String>,
}

impl ModuleCardVm {
    #[must_use]
    pub fn from_card(card: &ModuleCard) -> Self {
        let progress = card.progress.as_ref().map(|p| {
            ProgressBarVm::new(p.current_lesson, p.total_lessons, p.progress_percentage)
        });
        Self {
            id: card.module.id.to_string(),
            title: card.module.title.clone(),
            description: card.module.description.clone(),
            status_label: status_label(card.status()),
            action_label: if card.progress.is_some() {
                "Continue"
            } else {
                "Start module"
            },
            progress,
            grade_label: card.grade().map(|grade| format!("{grade}/10")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardVm {
    pub total_modules: u32,
    pub completed_modules: u32,
    pub in_progress_modules: u32,
    pub average_grade_label: String,
    pub modules: Vec<ModuleCardVm>,
}

impl DashboardVm {
    #[must_use]
    pub fn from_dashboard(dashboard: &Dashboard) -> Self {
        let overview = &dashboard.overview;
        Self {
            total_modules: overview.total_modules,
            completed_modules: overview.completed_modules,
            in_progress_modules: overview.in_progress_modules,
            average_grade_label: overview
                .average_grade
                .map_or_else(|| "N/A".to_string(), |grade| format!("{grade:.1}/10")),
            modules: dashboard.modules.iter().map(ModuleCardVm::from_card).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use learn_core::model::{Module, ModuleId, Progress, ProgressOverview};
    use learn_core::time::fixed_now;

    fn card(status: Option<ProgressStatus>) -> ModuleCard {
        ModuleCard {
            module: Module::new(ModuleId::new("Module_01"), "Ownership", 3),
            progress: status.map(|status| Progress {
                module_id: ModuleId::new("Module_01"),
                current_lesson: 2,
                total_lessons: 3,
                status,
                progress_percentage: 66,
                started_at: fixed_now(),
                updated_at: fixed_now(),
                completed_at: None,
            }),
            latest_result: None,
        }
    }

    #[test]
    fn untouched_module_offers_start() {
        let vm = ModuleCardVm::from_card(&card(None));
        assert_eq!(vm.status_label, "Not started");
        assert_eq!(vm.action_label, "Start module");
        assert_eq!(vm.progress, None);
        assert_eq!(vm.grade_label, None);
    }

    #[test]
    fn started_module_offers_continue_with_progress() {
        let vm = ModuleCardVm::from_card(&card(Some(ProgressStatus::InProgress)));
        assert_eq!(vm.status_label, "In progress");
        assert_eq!(vm.action_label, "Continue");
        assert_eq!(
            vm.progress.map(|p| p.label),
            Some("Progress: 2 of 3".to_string())
        );
        assert_eq!(
            status_label(ProgressStatus::Failed),
            "Not passed"
        );
    }

    #[test]
    fn average_grade_is_formatted_or_absent() {
        let mut dashboard = Dashboard {
            overview: ProgressOverview {
                total_modules: 2,
                completed_modules: 1,
                in_progress_modules: 0,
                average_grade: Some(8.5),
                modules: Vec::new(),
            },
            modules: vec![card(None)],
        };
        assert_eq!(
            DashboardVm::from_dashboard(&dashboard).average_grade_label,
            "8.5/10"
        );

        dashboard.overview.average_grade = None;
        let vm = DashboardVm::from_dashboard(&dashboard);
        assert_eq!(vm.average_grade_label, "N/A");
        assert_eq!(vm.modules.len(), 1);
    }
}
