use serde::{Deserialize, Serialize};

use crate::model::ids::ModuleId;

/// A unit of curriculum: ordered lessons followed by one test.
///
/// Read-only from the learner's side; authoring happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub total_lessons: u32,
    #[serde(default)]
    pub order_index: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Module {
    #[must_use]
    pub fn new(id: ModuleId, title: impl Into<String>, total_lessons: u32) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            total_lessons,
            order_index: 0,
            is_active: true,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_order_index(mut self, order_index: u32) -> Self {
        self.order_index = order_index;
        self
    }
}
