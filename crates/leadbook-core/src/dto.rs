use crate::domain::{FollowUpStatus, LeadId, LeadStage, Task};
use crate::timeline::TimelineEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response wrapper used for every machine-readable output:
/// `{"success": true, "data": ...}` or `{"success": false, "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadListItemDto {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDetailDto {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub custom_fields: BTreeMap<String, String>,
    pub open_tasks: Vec<Task>,
    pub recent_activity: Vec<TimelineEntry>,
}
