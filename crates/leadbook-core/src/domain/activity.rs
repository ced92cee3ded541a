use crate::domain::ids::{ActivityId, CallId, LeadId, NoteId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Note,
    Call,
    Whatsapp,
    Sms,
    Email,
    FieldUpdate,
    TaskCreated,
    TaskCompleted,
    Other(String),
}

impl ActivityKind {
    pub fn other(label: &str) -> Result<Self, CoreError> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidActivityKindLabel);
        }
        Ok(Self::Other(trimmed.to_ascii_lowercase()))
    }

    pub fn is_message(&self) -> bool {
        matches!(
            self,
            ActivityKind::Whatsapp | ActivityKind::Sms | ActivityKind::Email
        )
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityKind::Note => f.write_str("note"),
            ActivityKind::Call => f.write_str("call"),
            ActivityKind::Whatsapp => f.write_str("whatsapp"),
            ActivityKind::Sms => f.write_str("sms"),
            ActivityKind::Email => f.write_str("email"),
            ActivityKind::FieldUpdate => f.write_str("field_update"),
            ActivityKind::TaskCreated => f.write_str("task_created"),
            ActivityKind::TaskCompleted => f.write_str("task_completed"),
            ActivityKind::Other(label) => write!(f, "other:{label}"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "note" => Ok(ActivityKind::Note),
            "call" => Ok(ActivityKind::Call),
            "whatsapp" => Ok(ActivityKind::Whatsapp),
            "sms" | "text" => Ok(ActivityKind::Sms),
            "email" => Ok(ActivityKind::Email),
            "field_update" => Ok(ActivityKind::FieldUpdate),
            "task_created" => Ok(ActivityKind::TaskCreated),
            "task_completed" => Ok(ActivityKind::TaskCompleted),
            _ => match value.strip_prefix("other:") {
                Some(rest) => ActivityKind::other(rest),
                None => Err(CoreError::InvalidActivityKindLabel),
            },
        }
    }
}

/// An event stored directly against a lead: field changes, task events and
/// outbound messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub lead_id: LeadId,
    pub kind: ActivityKind,
    pub occurred_at: i64,
    pub created_at: i64,
    pub author: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub lead_id: LeadId,
    pub author: Option<String>,
    pub body: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOutcome {
    Answered,
    NoAnswer,
    Busy,
    Voicemail,
}

impl CallOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CallOutcome::Answered => "answered",
            CallOutcome::NoAnswer => "no_answer",
            CallOutcome::Busy => "busy",
            CallOutcome::Voicemail => "voicemail",
        }
    }
}

impl FromStr for CallOutcome {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "answered" | "connected" => Ok(CallOutcome::Answered),
            "no_answer" | "no-answer" | "missed" => Ok(CallOutcome::NoAnswer),
            "busy" => Ok(CallOutcome::Busy),
            "voicemail" => Ok(CallOutcome::Voicemail),
            _ => Err(CoreError::InvalidCallOutcome(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLog {
    pub id: CallId,
    pub lead_id: LeadId,
    pub author: Option<String>,
    pub started_at: i64,
    pub duration_secs: i64,
    pub outcome: CallOutcome,
    pub summary: String,
}

impl CallLog {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.duration_secs < 0 {
            return Err(CoreError::InvalidCallDuration(self.duration_secs));
        }
        Ok(())
    }
}
