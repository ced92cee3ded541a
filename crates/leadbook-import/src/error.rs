use leadbook_core::domain::CrmField;
use std::fmt;
use thiserror::Error;

/// Reasons an uploaded file cannot be turned into headers and rows.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported file format: {0} (expected csv, tsv, xls or xlsx)")]
    UnsupportedFormat(String),
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("malformed file: {0}")]
    Malformed(String),
    #[error("file has no header row")]
    MissingHeader,
    #[error("duplicate column header: {0}")]
    DuplicateHeader(String),
    #[error("file has a header row but no data rows")]
    NoRows,
}

impl From<csv::Error> for ParseError {
    fn from(err: csv::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

impl From<calamine::Error> for ParseError {
    fn from(err: calamine::Error) -> Self {
        ParseError::Malformed(err.to_string())
    }
}

/// Why the import action refused to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlocked {
    pub missing: Vec<CrmField>,
    pub duplicated: Vec<CrmField>,
}

impl fmt::Display for ImportBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |fields: &[CrmField]| {
            fields
                .iter()
                .map(|field| field.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        if !self.missing.is_empty() {
            write!(f, "missing required fields: {}", join(&self.missing))?;
        }
        if !self.duplicated.is_empty() {
            if !self.missing.is_empty() {
                f.write_str("; ")?;
            }
            write!(
                f,
                "required fields mapped more than once: {}",
                join(&self.duplicated)
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import is at the {actual} step, expected {expected}")]
    InvalidStep {
        expected: &'static str,
        actual: &'static str,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Blocked(ImportBlocked),
    #[error("import aborted: {invalid} of {total} rows are invalid")]
    TooManyInvalidRows { invalid: usize, total: usize },
    #[error("no column named {0:?} in the uploaded file")]
    UnknownHeader(String),
    #[error("invalid mapping target: {0}")]
    InvalidTarget(String),
    #[error("import aborted at row {row}: {message}")]
    SinkAborted { row: usize, message: String },
}

pub type Result<T> = std::result::Result<T, ImportError>;
