use crate::error::{Result, StoreError};
use crate::repo::leads::ensure_lead_exists;
use leadbook_core::domain::{CallId, CallLog, CallOutcome, LeadId};
use rusqlite::{params, Connection};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct CallNew {
    pub lead_id: LeadId,
    pub author: Option<String>,
    pub started_at: i64,
    pub duration_secs: i64,
    pub outcome: CallOutcome,
    pub summary: String,
}

pub struct CallsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CallsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, input: CallNew) -> Result<CallLog> {
        let call = CallLog {
            id: CallId::new(),
            lead_id: input.lead_id,
            author: input
                .author
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            started_at: input.started_at,
            duration_secs: input.duration_secs,
            outcome: input.outcome,
            summary: input.summary.trim().to_string(),
        };
        call.validate()?;
        ensure_lead_exists(self.conn, call.lead_id)?;

        self.conn.execute(
            "INSERT INTO calls (id, lead_id, author, started_at, duration_secs, outcome, summary)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                call.id.to_string(),
                call.lead_id.to_string(),
                call.author,
                call.started_at,
                call.duration_secs,
                call.outcome.as_str(),
                call.summary,
            ],
        )?;

        Ok(call)
    }

    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<CallLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, author, started_at, duration_secs, outcome, summary
             FROM calls
             WHERE lead_id = ?1
             ORDER BY started_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut calls = Vec::new();
        while let Some(row) = rows.next()? {
            calls.push(call_from_row(row)?);
        }
        Ok(calls)
    }
}

fn call_from_row(row: &rusqlite::Row<'_>) -> Result<CallLog> {
    let id_str: String = row.get(0)?;
    let id = CallId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str))?;
    let lead_str: String = row.get(1)?;
    let lead_id = LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str))?;
    let outcome_raw: String = row.get(5)?;
    let outcome = CallOutcome::from_str(&outcome_raw).map_err(|_| StoreError::InvalidStoredValue {
        column: "calls.outcome",
        value: outcome_raw.clone(),
    })?;

    Ok(CallLog {
        id,
        lead_id,
        author: row.get(2)?,
        started_at: row.get(3)?,
        duration_secs: row.get(4)?,
        outcome,
        summary: row.get(6)?,
    })
}
