use crate::error::{ImportError, Result};
use crate::file::ParsedFile;
use crate::mapping::{ColumnMapping, ColumnTarget};
use leadbook_core::domain::{
    normalize_email, validate_lead_fields, CrmField, DuplicatePolicy, FollowUpStatus, LeadId,
    LeadSource, LeadStage,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

/// Fallbacks for enum-like fields a row leaves blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDefaults {
    pub source: LeadSource,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
}

impl Default for ImportDefaults {
    fn default() -> Self {
        Self {
            source: LeadSource::Import,
            stage: LeadStage::New,
            follow_up: FollowUpStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub duplicate_policy: DuplicatePolicy,
    /// Abort when `invalid / total` is strictly greater than this.
    pub max_invalid_ratio: f64,
    pub defaults: ImportDefaults,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Skip,
            max_invalid_ratio: 0.5,
            defaults: ImportDefaults::default(),
        }
    }
}

/// A validated row ready for the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadDraft {
    /// 1-based data row number; the header row is not counted.
    pub row: usize,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
    pub notes: Option<String>,
    pub custom_values: Vec<(String, String)>,
    /// Enum-like fields the row left blank and that took their default.
    pub defaulted: Vec<CrmField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedWrite {
    Create(LeadDraft),
    Update { existing: LeadId, draft: LeadDraft },
}

impl PlannedWrite {
    pub fn draft(&self) -> &LeadDraft {
        match self {
            PlannedWrite::Create(draft) => draft,
            PlannedWrite::Update { draft, .. } => draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    Validation,
    Duplicate,
    Unexpected,
}

impl RowIssueKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            RowIssueKind::Validation => "validation",
            RowIssueKind::Duplicate => "duplicate",
            RowIssueKind::Unexpected => "unexpected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    pub row: usize,
    pub kind: RowIssueKind,
    pub message: String,
}

/// Outcome of evaluating every row, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPlan {
    pub total: usize,
    pub writes: Vec<PlannedWrite>,
    pub issues: Vec<RowIssue>,
}

impl ImportPlan {
    pub fn invalid_count(&self) -> usize {
        self.count(RowIssueKind::Validation)
    }

    pub fn duplicate_count(&self) -> usize {
        self.count(RowIssueKind::Duplicate)
    }

    fn count(&self, kind: RowIssueKind) -> usize {
        self.issues.iter().filter(|issue| issue.kind == kind).count()
    }
}

/// Evaluates every row against the mapping and the known emails.
///
/// `existing` maps normalized emails to the leads that already own them.
/// Fails with [`ImportError::TooManyInvalidRows`] when the invalid share
/// exceeds the configured ratio.
pub fn plan_import(
    file: &ParsedFile,
    mapping: &ColumnMapping,
    existing: &HashMap<String, LeadId>,
    options: &ImportOptions,
) -> Result<ImportPlan> {
    mapping.check_ready().map_err(ImportError::Blocked)?;

    let mut plan = ImportPlan {
        total: file.rows.len(),
        writes: Vec::new(),
        issues: Vec::new(),
    };
    let mut seen_emails: HashSet<String> = HashSet::new();

    for (index, cells) in file.rows.iter().enumerate() {
        let row = index + 1;
        let draft = match build_draft(row, cells, mapping, &options.defaults) {
            Ok(draft) => draft,
            Err(message) => {
                tracing::debug!(row, %message, "row failed validation");
                plan.issues.push(RowIssue {
                    row,
                    kind: RowIssueKind::Validation,
                    message,
                });
                continue;
            }
        };

        if !seen_emails.insert(draft.email.clone()) {
            tracing::debug!(row, email = %draft.email, "email repeats an earlier row");
            plan.issues.push(RowIssue {
                row,
                kind: RowIssueKind::Duplicate,
                message: format!("{} appears in an earlier row", draft.email),
            });
            continue;
        }

        match (existing.get(&draft.email), options.duplicate_policy) {
            (Some(_), DuplicatePolicy::Skip) => {
                tracing::debug!(row, email = %draft.email, "email belongs to an existing lead");
                plan.issues.push(RowIssue {
                    row,
                    kind: RowIssueKind::Duplicate,
                    message: format!("{} already belongs to a lead", draft.email),
                });
            }
            (Some(id), DuplicatePolicy::Update) => {
                tracing::debug!(row, lead = %id, "row updates existing lead");
                plan.writes.push(PlannedWrite::Update {
                    existing: *id,
                    draft,
                });
            }
            (None, _) => plan.writes.push(PlannedWrite::Create(draft)),
        }
    }

    let invalid = plan.invalid_count();
    if plan.total > 0 && invalid as f64 / plan.total as f64 > options.max_invalid_ratio {
        tracing::warn!(invalid, total = plan.total, "too many invalid rows; aborting import");
        return Err(ImportError::TooManyInvalidRows {
            invalid,
            total: plan.total,
        });
    }

    Ok(plan)
}

fn build_draft(
    row: usize,
    cells: &[String],
    mapping: &ColumnMapping,
    defaults: &ImportDefaults,
) -> std::result::Result<LeadDraft, String> {
    let value = |field: CrmField| first_value(cells, &mapping.columns_for(field));

    let name = value(CrmField::Name).unwrap_or_default();
    let raw_email = value(CrmField::Email).unwrap_or_default();
    let phone = value(CrmField::Phone);
    validate_lead_fields(&name, &raw_email, phone.as_deref()).map_err(|err| err.to_string())?;
    let email = normalize_email(&raw_email).unwrap_or_default();

    let mut defaulted = Vec::new();
    let source = match value(CrmField::Source) {
        Some(raw) => LeadSource::from_str(&raw).map_err(|err| err.to_string())?,
        None => {
            defaulted.push(CrmField::Source);
            defaults.source.clone()
        }
    };
    let stage = match value(CrmField::Stage) {
        Some(raw) => LeadStage::from_str(&raw).map_err(|err| err.to_string())?,
        None => {
            defaulted.push(CrmField::Stage);
            defaults.stage
        }
    };
    let follow_up = match value(CrmField::FollowUpStatus) {
        Some(raw) => FollowUpStatus::from_str(&raw).map_err(|err| err.to_string())?,
        None => {
            defaulted.push(CrmField::FollowUpStatus);
            defaults.follow_up
        }
    };

    let custom_values = mapping
        .entries()
        .iter()
        .zip(cells)
        .filter_map(|(entry, cell)| match &entry.target {
            ColumnTarget::Custom(key) if !cell.trim().is_empty() => {
                Some((key.clone(), cell.trim().to_string()))
            }
            _ => None,
        })
        .collect();

    Ok(LeadDraft {
        row,
        name: name.trim().to_string(),
        email,
        phone,
        company: value(CrmField::Company),
        source,
        stage,
        follow_up,
        notes: value(CrmField::Notes),
        custom_values,
        defaulted,
    })
}

/// First non-blank cell among `columns`, trimmed.
fn first_value(cells: &[String], columns: &[usize]) -> Option<String> {
    columns
        .iter()
        .filter_map(|index| cells.get(*index))
        .map(|cell| cell.trim())
        .find(|cell| !cell.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{plan_import, ImportOptions, PlannedWrite, RowIssueKind};
    use crate::file::parse_bytes;
    use crate::mapping::{propose_mapping, ColumnTarget};
    use leadbook_core::domain::{CrmField, CustomField, CustomFieldId, LeadSource, LeadStage};
    use std::collections::HashMap;

    #[test]
    fn fills_defaults_and_collects_custom_values() {
        let csv = "name,email,Lead Source,stage,Notes,Other Notes,Budget\n\
                   Ada,ada@example.com,,, ,second,10k\n\
                   Bob,bob@example.com,Partner,won,first,second,\n";
        let file = parse_bytes("a.csv", csv.as_bytes().to_vec(), 1 << 20).unwrap();
        let budget = CustomField {
            id: CustomFieldId::new(),
            key: "budget".to_string(),
            label: "Budget".to_string(),
            created_at: 0,
        };
        let mapping = propose_mapping(&file.headers, file.samples(5), &[budget]);
        assert_eq!(
            mapping.target_of("Budget"),
            Some(&ColumnTarget::Custom("budget".to_string()))
        );

        let plan = plan_import(&file, &mapping, &HashMap::new(), &ImportOptions::default()).unwrap();
        let drafts: Vec<_> = plan.writes.iter().map(PlannedWrite::draft).collect();

        assert_eq!(drafts[0].source, LeadSource::Import);
        assert_eq!(drafts[0].stage, LeadStage::New);
        assert_eq!(
            drafts[0].defaulted,
            vec![CrmField::Source, CrmField::Stage, CrmField::FollowUpStatus]
        );
        assert_eq!(drafts[0].notes.as_deref(), Some("second"));
        assert_eq!(
            drafts[0].custom_values,
            vec![("budget".to_string(), "10k".to_string())]
        );

        assert_eq!(drafts[1].source, LeadSource::Other("partner".to_string()));
        assert_eq!(drafts[1].stage, LeadStage::Won);
        assert_eq!(drafts[1].notes.as_deref(), Some("first"));
        assert!(drafts[1].custom_values.is_empty());
    }

    #[test]
    fn unknown_stage_is_a_validation_failure() {
        let csv = "name,email,stage\nAda,ada@example.com,someday\nBob,bob@example.com,lost\nCy,cy@example.com,\n";
        let file = parse_bytes("a.csv", csv.as_bytes().to_vec(), 1 << 20).unwrap();
        let mapping = propose_mapping(&file.headers, file.samples(5), &[]);

        let plan = plan_import(&file, &mapping, &HashMap::new(), &ImportOptions::default()).unwrap();
        assert_eq!(plan.writes.len(), 2);
        assert_eq!(plan.issues.len(), 1);
        assert_eq!(plan.issues[0].row, 1);
        assert_eq!(plan.issues[0].kind, RowIssueKind::Validation);
    }
}
