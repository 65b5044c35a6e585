//! The `learn result` command.

use anyhow::{Result, anyhow};
use learn_core::model::ResultId;
use services::LearnerSession;
use ui::views::render_result;
use ui::vm::present_stored;

pub async fn execute(session: LearnerSession, result_id: ResultId) -> Result<()> {
    let stored = session
        .tests()
        .result(result_id)
        .await
        .map_err(|err| anyhow!(err.user_message()))?;
    println!("Module {}", stored.module_id);
    print!("{}", render_result(&present_stored(&stored)));
    Ok(())
}
