use crate::error::ImportError;
use crate::plan::{ImportPlan, LeadDraft, PlannedWrite, RowIssue, RowIssueKind};
use leadbook_core::domain::LeadId;
use serde::Serialize;
use std::fmt;

/// Destination for planned writes. One call per row; a failing call only
/// affects that row unless [`LeadSink::is_fatal`] says otherwise.
pub trait LeadSink {
    type Error: fmt::Display;

    fn create(&mut self, draft: &LeadDraft) -> Result<(), Self::Error>;

    fn update(&mut self, existing: LeadId, draft: &LeadDraft) -> Result<(), Self::Error>;

    /// Whether `error` leaves the sink unable to take further rows. A fatal
    /// error stops the batch instead of being recorded against the row.
    fn is_fatal(_error: &Self::Error) -> bool {
        false
    }
}

/// Accepts every write without storing anything.
#[derive(Debug, Default)]
pub struct DryRunSink;

impl LeadSink for DryRunSink {
    type Error = std::convert::Infallible;

    fn create(&mut self, _draft: &LeadDraft) -> Result<(), Self::Error> {
        Ok(())
    }

    fn update(&mut self, _existing: LeadId, _draft: &LeadDraft) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped_duplicate: usize,
    pub failed: usize,
    pub issues: Vec<RowIssue>,
}

impl ImportResult {
    pub fn accounted(&self) -> usize {
        self.created + self.updated + self.skipped_duplicate + self.failed
    }
}

/// Sends every planned write to `sink`, in row order.
///
/// Stops at the first fatal sink error with [`ImportError::SinkAborted`];
/// rows written before it are left for the caller to roll back.
pub fn execute<S: LeadSink>(plan: ImportPlan, sink: &mut S) -> Result<ImportResult, ImportError> {
    let skipped_duplicate = plan.duplicate_count();
    let mut result = ImportResult {
        total: plan.total,
        skipped_duplicate,
        failed: plan.invalid_count(),
        issues: plan.issues,
        ..Default::default()
    };

    for write in &plan.writes {
        let outcome = match write {
            PlannedWrite::Create(draft) => sink.create(draft),
            PlannedWrite::Update { existing, draft } => sink.update(*existing, draft),
        };
        match (outcome, write) {
            (Ok(()), PlannedWrite::Create(_)) => result.created += 1,
            (Ok(()), PlannedWrite::Update { .. }) => result.updated += 1,
            (Err(err), _) if S::is_fatal(&err) => {
                let row = write.draft().row;
                tracing::warn!(row, error = %err, "sink failed; aborting import");
                return Err(ImportError::SinkAborted {
                    row,
                    message: err.to_string(),
                });
            }
            (Err(err), _) => {
                let row = write.draft().row;
                tracing::debug!(row, error = %err, "sink rejected row");
                result.failed += 1;
                result.issues.push(RowIssue {
                    row,
                    kind: RowIssueKind::Unexpected,
                    message: err.to_string(),
                });
            }
        }
    }

    result.issues.sort_by_key(|issue| issue.row);
    tracing::info!(
        total = result.total,
        created = result.created,
        updated = result.updated,
        skipped = result.skipped_duplicate,
        failed = result.failed,
        "import finished"
    );
    Ok(result)
}
