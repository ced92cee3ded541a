use crate::error::invalid_input;
use anyhow::{Context as _, Result};
use leadbook_core::domain::{LeadId, TaskId};
use leadbook_core::time::parse_local_timestamp;
use std::io::{self, Read};
use std::str::FromStr;

pub fn parse_lead_id(raw: &str) -> Result<LeadId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("lead id cannot be empty"));
    }
    LeadId::from_str(trimmed).map_err(|_| invalid_input(format!("invalid lead id: {trimmed}")))
}

pub fn parse_task_id(raw: &str) -> Result<TaskId> {
    let trimmed = raw.trim();
    TaskId::from_str(trimmed).map_err(|_| invalid_input(format!("invalid task id: {trimmed}")))
}

pub fn parse_optional_timestamp(raw: Option<&str>) -> Result<Option<i64>> {
    raw.map(|value| parse_local_timestamp(value).with_context(|| format!("parse time {value:?}")))
        .transpose()
}

/// An empty argument clears the value.
pub fn normalize_optional_value(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Splits `KEY=VALUE`; the value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| invalid_input(format!("expected KEY=VALUE, got {raw:?}")))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid_input(format!("empty key in {raw:?}")));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Body text from the flag, else read from stdin.
pub fn text_or_stdin(value: Option<String>, what: &str) -> Result<String> {
    let text = match value {
        Some(value) => value,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    if text.trim().is_empty() {
        return Err(invalid_input(format!("{what} is empty (provide --{what} or stdin)")));
    }
    Ok(text.trim().to_string())
}
