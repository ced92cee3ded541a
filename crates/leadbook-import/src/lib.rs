pub mod error;
pub mod executor;
pub mod file;
pub mod mapping;
pub mod plan;
pub mod session;

pub use error::{ImportBlocked, ImportError, ParseError, Result};
pub use executor::{execute, DryRunSink, ImportResult, LeadSink};
pub use file::{parse_bytes, parse_path, FileFormat, ParsedFile};
pub use mapping::{propose_mapping, ColumnMapping, ColumnTarget, MappingEntry};
pub use plan::{
    plan_import, ImportDefaults, ImportOptions, ImportPlan, LeadDraft, PlannedWrite, RowIssue,
    RowIssueKind,
};
pub use session::{ImportSession, ImportStep, SessionLimits};
