use crate::error::{Result, StoreError};
use crate::repo::leads::ensure_lead_exists;
use leadbook_core::domain::{Activity, ActivityId, ActivityKind, LeadId};
use rusqlite::{params, Connection};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct ActivityNew {
    pub lead_id: LeadId,
    pub kind: ActivityKind,
    pub occurred_at: i64,
    pub created_at: i64,
    pub author: Option<String>,
    pub content: String,
}

pub struct ActivitiesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> ActivitiesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, input: ActivityNew) -> Result<Activity> {
        ensure_lead_exists(self.conn, input.lead_id)?;
        add_activity(self.conn, input)
    }

    /// Newest first.
    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<Activity>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, kind, occurred_at, created_at, author, content
             FROM activities
             WHERE lead_id = ?1
             ORDER BY occurred_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut activities = Vec::new();
        while let Some(row) = rows.next()? {
            activities.push(activity_from_row(row)?);
        }
        Ok(activities)
    }
}

pub(crate) fn add_activity(conn: &Connection, input: ActivityNew) -> Result<Activity> {
    let activity = Activity {
        id: ActivityId::new(),
        lead_id: input.lead_id,
        kind: input.kind,
        occurred_at: input.occurred_at,
        created_at: input.created_at,
        author: input
            .author
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty()),
        content: input.content,
    };

    conn.execute(
        "INSERT INTO activities (id, lead_id, kind, occurred_at, created_at, author, content)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            activity.id.to_string(),
            activity.lead_id.to_string(),
            activity.kind.to_string(),
            activity.occurred_at,
            activity.created_at,
            activity.author,
            activity.content,
        ],
    )?;

    Ok(activity)
}

fn activity_from_row(row: &rusqlite::Row<'_>) -> Result<Activity> {
    let id_str: String = row.get(0)?;
    let id = ActivityId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str))?;
    let lead_str: String = row.get(1)?;
    let lead_id = LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str))?;
    let kind_raw: String = row.get(2)?;
    let kind = ActivityKind::from_str(&kind_raw).map_err(|_| StoreError::InvalidStoredValue {
        column: "activities.kind",
        value: kind_raw.clone(),
    })?;

    Ok(Activity {
        id,
        lead_id,
        kind,
        occurred_at: row.get(3)?,
        created_at: row.get(4)?,
        author: row.get(5)?,
        content: row.get(6)?,
    })
}
