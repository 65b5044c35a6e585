//! The `learn modules` command.

use anyhow::{Context, Result};
use services::{DashboardService, LearnerSession};
use ui::views::render_dashboard;
use ui::vm::DashboardVm;

pub async fn execute(session: LearnerSession) -> Result<()> {
    let dashboard = DashboardService::new(session)
        .load()
        .await
        .map_err(|err| anyhow::anyhow!(err.user_message()))
        .context("could not load the dashboard")?;
    print!("{}", render_dashboard(&DashboardVm::from_dashboard(&dashboard)));
    Ok(())
}
