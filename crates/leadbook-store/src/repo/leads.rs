use crate::error::{Result, StoreError};
use crate::repo::activities::{add_activity, ActivityNew};
use crate::repo::custom_fields::set_value_inner;
use leadbook_core::domain::{
    normalize_email, ActivityKind, FollowUpStatus, Lead, LeadId, LeadSource, LeadStage,
};
use rusqlite::{params, params_from_iter, types::Value, Connection, OptionalExtension};
use std::collections::HashMap;
use std::str::FromStr;

const LEAD_COLUMNS: &str =
    "id, name, email, phone, company, source, stage, follow_up, notes, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct LeadNew {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: LeadSource,
    pub stage: LeadStage,
    pub follow_up: FollowUpStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub source: Option<LeadSource>,
    pub stage: Option<LeadStage>,
    pub follow_up: Option<FollowUpStatus>,
    pub notes: Option<Option<String>>,
}

impl LeadUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.source.is_none()
            && self.stage.is_none()
            && self.follow_up.is_none()
            && self.notes.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeadQuery {
    pub stage: Option<LeadStage>,
    /// Case-insensitive substring over name, email and company.
    pub search: Option<String>,
    pub limit: Option<i64>,
}

pub struct LeadsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> LeadsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: LeadNew) -> Result<Lead> {
        create_inner(self.conn, now_utc, input)
    }

    /// Creates the lead and its custom values atomically. Joins the caller's
    /// transaction when one is open.
    pub fn create_with_custom_values(
        &self,
        now_utc: i64,
        input: LeadNew,
        values: &[(String, String)],
    ) -> Result<Lead> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let lead = create_with_values_inner(&tx, now_utc, input, values)?;
            tx.commit()?;
            Ok(lead)
        } else {
            create_with_values_inner(self.conn, now_utc, input, values)
        }
    }

    pub fn get(&self, id: LeadId) -> Result<Option<Lead>> {
        get_inner(self.conn, id)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<Lead>> {
        let Some(normalized) = normalize_email(email) else {
            return Ok(None);
        };
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE email = ?1;"))?;
        let mut rows = stmt.query([normalized])?;
        match rows.next()? {
            Some(row) => Ok(Some(lead_from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(stage) = query.stage {
            clauses.push("stage = ?");
            values.push(Value::Text(stage.as_str().to_string()));
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                clauses.push(
                    "(name LIKE ? ESCAPE '\\' OR email LIKE ? ESCAPE '\\' OR company LIKE ? ESCAPE '\\')",
                );
                let pattern = format!("%{}%", escape_like(&search.to_ascii_lowercase()));
                for _ in 0..3 {
                    values.push(Value::Text(pattern.clone()));
                }
            }
        }

        let mut sql = format!("SELECT {LEAD_COLUMNS} FROM leads");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, created_at ASC");
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            values.push(Value::Integer(limit));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;
        let mut leads = Vec::new();
        while let Some(row) = rows.next()? {
            leads.push(lead_from_row(row)?);
        }
        Ok(leads)
    }

    /// Normalized email → lead id, for duplicate detection during import.
    pub fn email_index(&self) -> Result<HashMap<String, LeadId>> {
        let mut stmt = self.conn.prepare("SELECT email, id FROM leads;")?;
        let mut rows = stmt.query([])?;
        let mut index = HashMap::new();
        while let Some(row) = rows.next()? {
            let email: String = row.get(0)?;
            let id = parse_lead_id(row.get(1)?)?;
            index.insert(email, id);
        }
        Ok(index)
    }

    /// Applies the update and logs one field-update activity per changed
    /// field.
    pub fn update(
        &self,
        now_utc: i64,
        id: LeadId,
        update: LeadUpdate,
        author: Option<&str>,
    ) -> Result<Lead> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let lead = update_inner(&tx, now_utc, id, update, author)?;
            tx.commit()?;
            Ok(lead)
        } else {
            update_inner(self.conn, now_utc, id, update, author)
        }
    }

    pub fn delete(&self, id: LeadId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM leads WHERE id = ?1;", [id.to_string()])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM leads;", [], |row| row.get(0))?;
        Ok(count)
    }
}

pub(crate) fn ensure_lead_exists(conn: &Connection, id: LeadId) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM leads WHERE id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound(id.to_string())),
    }
}

fn create_with_values_inner(
    conn: &Connection,
    now_utc: i64,
    input: LeadNew,
    values: &[(String, String)],
) -> Result<Lead> {
    let lead = create_inner(conn, now_utc, input)?;
    for (key, value) in values {
        set_value_inner(conn, lead.id, key, value)?;
    }
    Ok(lead)
}

fn create_inner(conn: &Connection, now_utc: i64, input: LeadNew) -> Result<Lead> {
    let lead = Lead {
        id: LeadId::new(),
        name: input.name.trim().to_string(),
        email: normalize_email(&input.email).unwrap_or_default(),
        phone: clean_optional(input.phone),
        company: clean_optional(input.company),
        source: input.source,
        stage: input.stage,
        follow_up: input.follow_up,
        notes: clean_optional(input.notes),
        created_at: now_utc,
        updated_at: now_utc,
    };
    lead.validate()?;
    ensure_email_free(conn, &lead.email, None)?;

    conn.execute(
        &format!(
            "INSERT INTO leads ({LEAD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);"
        ),
        params![
            lead.id.to_string(),
            lead.name,
            lead.email,
            lead.phone,
            lead.company,
            lead.source.to_string(),
            lead.stage.as_str(),
            lead.follow_up.as_str(),
            lead.notes,
            lead.created_at,
            lead.updated_at,
        ],
    )?;

    Ok(lead)
}

fn update_inner(
    conn: &Connection,
    now_utc: i64,
    id: LeadId,
    update: LeadUpdate,
    author: Option<&str>,
) -> Result<Lead> {
    let current = get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    let mut next = current.clone();

    if let Some(name) = update.name {
        next.name = name.trim().to_string();
    }
    if let Some(email) = update.email {
        next.email = normalize_email(&email).unwrap_or_default();
    }
    if let Some(phone) = update.phone {
        next.phone = clean_optional(phone);
    }
    if let Some(company) = update.company {
        next.company = clean_optional(company);
    }
    if let Some(source) = update.source {
        next.source = source;
    }
    if let Some(stage) = update.stage {
        next.stage = stage;
    }
    if let Some(follow_up) = update.follow_up {
        next.follow_up = follow_up;
    }
    if let Some(notes) = update.notes {
        next.notes = clean_optional(notes);
    }

    let changes = diff_leads(&current, &next);
    if changes.is_empty() {
        return Ok(current);
    }

    next.validate()?;
    if next.email != current.email {
        ensure_email_free(conn, &next.email, Some(id))?;
    }
    next.updated_at = now_utc;

    conn.execute(
        "UPDATE leads
         SET name = ?2, email = ?3, phone = ?4, company = ?5, source = ?6, stage = ?7,
             follow_up = ?8, notes = ?9, updated_at = ?10
         WHERE id = ?1;",
        params![
            id.to_string(),
            next.name,
            next.email,
            next.phone,
            next.company,
            next.source.to_string(),
            next.stage.as_str(),
            next.follow_up.as_str(),
            next.notes,
            next.updated_at,
        ],
    )?;

    for (field, old, new) in changes {
        add_activity(
            conn,
            ActivityNew {
                lead_id: id,
                kind: ActivityKind::FieldUpdate,
                occurred_at: now_utc,
                created_at: now_utc,
                author: author.map(str::to_string),
                content: format!("{field}: {old} -> {new}"),
            },
        )?;
    }

    Ok(next)
}

fn diff_leads(old: &Lead, new: &Lead) -> Vec<(&'static str, String, String)> {
    let mut changes = Vec::new();
    let mut push = |field: &'static str, before: String, after: String| {
        if before != after {
            changes.push((field, before, after));
        }
    };
    push("name", old.name.clone(), new.name.clone());
    push("email", old.email.clone(), new.email.clone());
    push("phone", display_optional(&old.phone), display_optional(&new.phone));
    push(
        "company",
        display_optional(&old.company),
        display_optional(&new.company),
    );
    push("source", old.source.to_string(), new.source.to_string());
    push(
        "stage",
        old.stage.as_str().to_string(),
        new.stage.as_str().to_string(),
    );
    push(
        "follow_up",
        old.follow_up.as_str().to_string(),
        new.follow_up.as_str().to_string(),
    );
    push("notes", display_optional(&old.notes), display_optional(&new.notes));
    changes
}

fn display_optional(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(none)".to_string())
}

fn ensure_email_free(conn: &Connection, email: &str, except: Option<LeadId>) -> Result<()> {
    let owner: Option<String> = conn
        .query_row("SELECT id FROM leads WHERE email = ?1;", [email], |row| {
            row.get(0)
        })
        .optional()?;
    match (owner, except) {
        (Some(owner), Some(except)) if owner == except.to_string() => Ok(()),
        (Some(_), _) => Err(StoreError::DuplicateEmail(email.to_string())),
        (None, _) => Ok(()),
    }
}

fn get_inner(conn: &Connection, id: LeadId) -> Result<Option<Lead>> {
    let mut stmt = conn.prepare(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(lead_from_row(row)?)),
        None => Ok(None),
    }
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn parse_lead_id(raw: String) -> Result<LeadId> {
    LeadId::from_str(&raw).map_err(|_| StoreError::InvalidId(raw))
}

fn lead_from_row(row: &rusqlite::Row<'_>) -> Result<Lead> {
    let id = parse_lead_id(row.get(0)?)?;
    let source_raw: String = row.get(5)?;
    let source = LeadSource::from_str(&source_raw).map_err(|_| StoreError::InvalidStoredValue {
        column: "leads.source",
        value: source_raw.clone(),
    })?;
    let stage_raw: String = row.get(6)?;
    let stage = LeadStage::from_str(&stage_raw).map_err(|_| StoreError::InvalidStoredValue {
        column: "leads.stage",
        value: stage_raw.clone(),
    })?;
    let follow_up_raw: String = row.get(7)?;
    let follow_up =
        FollowUpStatus::from_str(&follow_up_raw).map_err(|_| StoreError::InvalidStoredValue {
            column: "leads.follow_up",
            value: follow_up_raw.clone(),
        })?;

    Ok(Lead {
        id,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        company: row.get(4)?,
        source,
        stage,
        follow_up,
        notes: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}
