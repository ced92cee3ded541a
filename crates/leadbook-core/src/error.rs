use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("name is required")]
    EmptyName,
    #[error("email is required")]
    MissingEmail,
    #[error("invalid email: {0}")]
    InvalidEmail(String),
    #[error("invalid phone: {0}")]
    InvalidPhone(String),
    #[error("invalid lead source: {0}")]
    InvalidLeadSource(String),
    #[error("invalid stage: {0}")]
    InvalidStage(String),
    #[error("invalid follow-up status: {0}")]
    InvalidFollowUpStatus(String),
    #[error("invalid call outcome: {0}")]
    InvalidCallOutcome(String),
    #[error("invalid activity kind label")]
    InvalidActivityKindLabel,
    #[error("invalid custom field key: {0}")]
    InvalidCustomFieldKey(String),
    #[error("task title is required")]
    EmptyTaskTitle,
    #[error("note is empty")]
    EmptyNote,
    #[error("invalid call duration: {0}")]
    InvalidCallDuration(i64),
}
