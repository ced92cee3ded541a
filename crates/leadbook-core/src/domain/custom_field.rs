use crate::domain::ids::{CustomFieldId, LeadId};
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: CustomFieldId,
    pub key: String,
    pub label: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub lead_id: LeadId,
    pub key: String,
    pub value: String,
}

/// Lowercases a custom field key and folds whitespace and dashes into single
/// underscores. Only ASCII alphanumerics and `_` survive.
pub fn normalize_field_key(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let mut out = String::with_capacity(trimmed.len());
    let mut prev_sep = false;
    for ch in trimmed.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            if !prev_sep && !out.is_empty() {
                out.push('_');
            }
            prev_sep = true;
            continue;
        }
        if !ch.is_ascii_alphanumeric() {
            return Err(CoreError::InvalidCustomFieldKey(raw.to_string()));
        }
        prev_sep = false;
        out.push(ch.to_ascii_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }

    if out.is_empty() {
        return Err(CoreError::InvalidCustomFieldKey(raw.to_string()));
    }
    Ok(out)
}
