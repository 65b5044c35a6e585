pub mod modules;
pub mod progress;
pub mod result;
pub mod study;

use anyhow::anyhow;
use ui::views::ViewError;

pub(crate) fn view_failure(err: &ViewError) -> anyhow::Error {
    anyhow!("{}", err.message())
}
