//! The `learn progress` command.

use anyhow::{Result, anyhow};
use learn_core::model::{ModuleId, ProgressStatus};
use services::{ApiError, LearnerSession};
use ui::vm::{ProgressBarVm, format_datetime, status_label};

pub async fn execute(session: LearnerSession, module: Option<ModuleId>) -> Result<()> {
    let progress = session.progress();
    let Some(module_id) = module else {
        let overview = progress.overview().await.map_err(failure)?;
        println!("Modules: {}", overview.total_modules);
        println!("Completed: {}", overview.completed_modules);
        println!("In progress: {}", overview.in_progress_modules);
        match overview.average_grade {
            Some(grade) => println!("Average grade: {grade:.1}/10"),
            None => println!("Average grade: N/A"),
        }
        return Ok(());
    };

    let record = match progress.module_progress(&module_id).await {
        Ok(record) => record,
        Err(ApiError::Rejected { status: 404, .. }) => {
            println!("{module_id}: {}", status_label(ProgressStatus::NotStarted));
            return Ok(());
        }
        Err(err) => return Err(failure(err)),
    };

    let bar = ProgressBarVm::new(
        record.current_lesson,
        record.total_lessons,
        record.progress_percentage,
    );
    println!("{module_id}: {}", status_label(record.status));
    println!("{}  {}", bar.label, bar.bar);
    println!("Started {}", format_datetime(record.started_at));
    println!("Updated {}", format_datetime(record.updated_at));
    if let Some(completed) = record.completed_at {
        println!("Completed {}", format_datetime(completed));
    }
    Ok(())
}

fn failure(err: ApiError) -> anyhow::Error {
    anyhow!(err.user_message())
}
