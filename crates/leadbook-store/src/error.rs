use leadbook_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid id string: {0}")]
    InvalidId(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("migration error: {0}")]
    Migration(String),
    #[error("invalid data path: {0}")]
    InvalidDataPath(PathBuf),
    #[error("corrupt stored value in {column}: {value}")]
    InvalidStoredValue { column: &'static str, value: String },
    #[error("duplicate email: {0}")]
    DuplicateEmail(String),
    #[error("duplicate custom field: {0}")]
    DuplicateCustomField(String),
    #[error("unknown custom field: {0}")]
    UnknownCustomField(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    Io,
    Sql,
    Core,
    MissingHomeDir,
    InvalidId,
    NotFound,
    Migration,
    InvalidDataPath,
    InvalidStoredValue,
    DuplicateEmail,
    DuplicateCustomField,
    UnknownCustomField,
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::Io(_) => StoreErrorKind::Io,
            StoreError::Sql(_) => StoreErrorKind::Sql,
            StoreError::Core(_) => StoreErrorKind::Core,
            StoreError::MissingHomeDir => StoreErrorKind::MissingHomeDir,
            StoreError::InvalidId(_) => StoreErrorKind::InvalidId,
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::Migration(_) => StoreErrorKind::Migration,
            StoreError::InvalidDataPath(_) => StoreErrorKind::InvalidDataPath,
            StoreError::InvalidStoredValue { .. } => StoreErrorKind::InvalidStoredValue,
            StoreError::DuplicateEmail(_) => StoreErrorKind::DuplicateEmail,
            StoreError::DuplicateCustomField(_) => StoreErrorKind::DuplicateCustomField,
            StoreError::UnknownCustomField(_) => StoreErrorKind::UnknownCustomField,
        }
    }

    /// Errors caused by the row being written rather than the database.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self.kind(),
            StoreErrorKind::Core
                | StoreErrorKind::DuplicateEmail
                | StoreErrorKind::UnknownCustomField
        )
    }
}
