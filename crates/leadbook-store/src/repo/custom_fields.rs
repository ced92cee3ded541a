use crate::error::{Result, StoreError};
use crate::repo::leads::ensure_lead_exists;
use leadbook_core::domain::{normalize_field_key, CustomField, CustomFieldId, LeadId};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;

pub struct CustomFieldsRepo<'a> {
    conn: &'a Connection,
}

impl<'a> CustomFieldsRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Defines a field. The key is derived from `key` when given, else from
    /// the label.
    pub fn create(&self, now_utc: i64, label: &str, key: Option<&str>) -> Result<CustomField> {
        let label = label.trim();
        let key = normalize_field_key(key.unwrap_or(label))?;
        if field_exists(self.conn, &key)? {
            return Err(StoreError::DuplicateCustomField(key));
        }

        let field = CustomField {
            id: CustomFieldId::new(),
            label: if label.is_empty() {
                key.clone()
            } else {
                label.to_string()
            },
            key,
            created_at: now_utc,
        };

        self.conn.execute(
            "INSERT INTO custom_fields (id, key, label, created_at) VALUES (?1, ?2, ?3, ?4);",
            params![field.id.to_string(), field.key, field.label, field.created_at],
        )?;
        Ok(field)
    }

    pub fn list(&self) -> Result<Vec<CustomField>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, key, label, created_at FROM custom_fields ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut fields = Vec::new();
        while let Some(row) = rows.next()? {
            let id_str: String = row.get(0)?;
            let id = CustomFieldId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str))?;
            fields.push(CustomField {
                id,
                key: row.get(1)?,
                label: row.get(2)?,
                created_at: row.get(3)?,
            });
        }
        Ok(fields)
    }

    /// Removes the definition and every stored value for it.
    pub fn delete(&self, key: &str) -> Result<()> {
        let key = normalize_field_key(key)?;
        let deleted = self
            .conn
            .execute("DELETE FROM custom_fields WHERE key = ?1;", [&key])?;
        if deleted == 0 {
            return Err(StoreError::NotFound(key));
        }
        Ok(())
    }

    /// Upserts a value. An empty value clears it.
    pub fn set_value(&self, lead_id: LeadId, key: &str, value: &str) -> Result<()> {
        ensure_lead_exists(self.conn, lead_id)?;
        set_value_inner(self.conn, lead_id, key, value)
    }

    pub fn values_for_lead(&self, lead_id: LeadId) -> Result<BTreeMap<String, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT field_key, value FROM lead_custom_values WHERE lead_id = ?1;",
        )?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut values = BTreeMap::new();
        while let Some(row) = rows.next()? {
            values.insert(row.get(0)?, row.get(1)?);
        }
        Ok(values)
    }
}

pub(crate) fn set_value_inner(
    conn: &Connection,
    lead_id: LeadId,
    key: &str,
    value: &str,
) -> Result<()> {
    let key = normalize_field_key(key)?;
    if !field_exists(conn, &key)? {
        return Err(StoreError::UnknownCustomField(key));
    }

    let value = value.trim();
    if value.is_empty() {
        conn.execute(
            "DELETE FROM lead_custom_values WHERE lead_id = ?1 AND field_key = ?2;",
            params![lead_id.to_string(), key],
        )?;
        return Ok(());
    }

    conn.execute(
        "INSERT INTO lead_custom_values (lead_id, field_key, value) VALUES (?1, ?2, ?3)
         ON CONFLICT(lead_id, field_key) DO UPDATE SET value = excluded.value;",
        params![lead_id.to_string(), key, value],
    )?;
    Ok(())
}

fn field_exists(conn: &Connection, key: &str) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM custom_fields WHERE key = ?1;", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}
