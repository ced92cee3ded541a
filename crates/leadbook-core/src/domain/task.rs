use crate::domain::ids::{LeadId, TaskId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub lead_id: LeadId,
    pub title: String,
    pub due_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

impl Task {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::EmptyTaskTitle);
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}
