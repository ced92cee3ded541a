use crate::error::{ImportBlocked, ImportError, Result};
use leadbook_core::domain::{normalize_field_key, CrmField, CustomField};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where one uploaded column's values go.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum ColumnTarget {
    Unmapped,
    Field(CrmField),
    Custom(String),
}

impl fmt::Display for ColumnTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTarget::Unmapped => f.write_str("(skip)"),
            ColumnTarget::Field(field) => f.write_str(field.as_str()),
            ColumnTarget::Custom(key) => write!(f, "custom:{key}"),
        }
    }
}

impl FromStr for ColumnTarget {
    type Err = ImportError;

    /// Accepts a built-in field name, `custom:<key>`, or `skip`.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if matches!(lower.as_str(), "skip" | "none" | "unmapped" | "ignore" | "") {
            return Ok(ColumnTarget::Unmapped);
        }
        if let Some(key) = lower.strip_prefix("custom:") {
            let key = normalize_field_key(key)
                .map_err(|_| ImportError::InvalidTarget(trimmed.to_string()))?;
            return Ok(ColumnTarget::Custom(key));
        }
        CrmField::parse(&lower)
            .map(ColumnTarget::Field)
            .ok_or_else(|| ImportError::InvalidTarget(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    pub header: String,
    pub target: ColumnTarget,
}

/// One entry per uploaded header, in header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    entries: Vec<MappingEntry>,
}

impl ColumnMapping {
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn target_of(&self, header: &str) -> Option<&ColumnTarget> {
        self.entries
            .iter()
            .find(|entry| entry.header == header)
            .map(|entry| &entry.target)
    }

    /// Replaces the target of a single header.
    pub fn override_column(&mut self, header: &str, target: ColumnTarget) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.header == header)
            .ok_or_else(|| ImportError::UnknownHeader(header.to_string()))?;
        entry.target = target;
        Ok(())
    }

    /// Column indices feeding `field`, in header order.
    pub fn columns_for(&self, field: CrmField) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.target == ColumnTarget::Field(field))
            .map(|(index, _)| index)
            .collect()
    }

    /// Every required field must be fed by exactly one column.
    pub fn check_ready(&self) -> std::result::Result<(), ImportBlocked> {
        let mut missing = Vec::new();
        let mut duplicated = Vec::new();
        for field in CrmField::REQUIRED {
            match self.columns_for(*field).len() {
                0 => missing.push(*field),
                1 => {}
                _ => duplicated.push(*field),
            }
        }
        if missing.is_empty() && duplicated.is_empty() {
            Ok(())
        } else {
            Err(ImportBlocked {
                missing,
                duplicated,
            })
        }
    }
}

const PHONE_WORDS: &[&str] = &["phone", "mobile", "tel", "cell", "whatsapp"];
const COMPANY_WORDS: &[&str] = &["company", "organization", "organisation", "business", "firm"];
const NAME_WORDS: &[&str] = &["name", "contact", "person"];
const SOURCE_WORDS: &[&str] = &["source", "channel", "origin", "campaign"];
const STAGE_WORDS: &[&str] = &["stage", "pipeline", "status"];
const NOTES_WORDS: &[&str] = &["note", "comment", "remark", "description"];

/// Proposes a target for every header from its name and sample values.
/// The first matching rule wins; nothing is scored.
pub fn propose_mapping(
    headers: &[String],
    samples: &[Vec<String>],
    custom_fields: &[CustomField],
) -> ColumnMapping {
    let entries = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let column_samples = samples
                .iter()
                .filter_map(|row| row.get(index))
                .map(String::as_str);
            MappingEntry {
                header: header.clone(),
                target: resolve_header(header, column_samples, custom_fields),
            }
        })
        .collect();
    ColumnMapping { entries }
}

fn resolve_header<'s>(
    header: &str,
    mut samples: impl Iterator<Item = &'s str>,
    custom_fields: &[CustomField],
) -> ColumnTarget {
    let lower = header.trim().to_lowercase();
    let contains_any = |words: &[&str]| words.iter().any(|word| lower.contains(word));

    if contains_any(&["email", "e-mail", "mail"]) || samples.any(|value| value.contains('@')) {
        return ColumnTarget::Field(CrmField::Email);
    }
    if contains_any(PHONE_WORDS) {
        return ColumnTarget::Field(CrmField::Phone);
    }
    if let Some(key) = match_custom_field(&lower, custom_fields) {
        return ColumnTarget::Custom(key);
    }
    if contains_any(COMPANY_WORDS) {
        return ColumnTarget::Field(CrmField::Company);
    }
    if contains_any(NAME_WORDS) {
        return ColumnTarget::Field(CrmField::Name);
    }
    if contains_any(SOURCE_WORDS) {
        return ColumnTarget::Field(CrmField::Source);
    }
    if lower.contains("follow") {
        return ColumnTarget::Field(CrmField::FollowUpStatus);
    }
    if contains_any(STAGE_WORDS) {
        return ColumnTarget::Field(CrmField::Stage);
    }
    if contains_any(NOTES_WORDS) {
        return ColumnTarget::Field(CrmField::Notes);
    }
    ColumnTarget::Unmapped
}

fn match_custom_field(lower_header: &str, custom_fields: &[CustomField]) -> Option<String> {
    let header_key = loose_key(lower_header);
    if header_key.is_empty() {
        return None;
    }
    custom_fields
        .iter()
        .find(|field| {
            let label_key = loose_key(&field.label.to_lowercase());
            [field.key.as_str(), label_key.as_str()]
                .iter()
                .any(|key| !key.is_empty() && header_key.contains(key))
        })
        .map(|field| field.key.clone())
}

/// Lowercase with every run of non-alphanumerics folded to `_`.
fn loose_key(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}
