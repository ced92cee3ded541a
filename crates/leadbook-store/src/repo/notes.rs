use crate::error::{Result, StoreError};
use crate::repo::leads::ensure_lead_exists;
use leadbook_core::domain::{LeadId, Note, NoteId};
use leadbook_core::CoreError;
use rusqlite::{params, Connection};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct NoteNew {
    pub lead_id: LeadId,
    pub author: Option<String>,
    pub body: String,
}

pub struct NotesRepo<'a> {
    conn: &'a Connection,
}

impl<'a> NotesRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn add(&self, now_utc: i64, input: NoteNew) -> Result<Note> {
        let body = input.body.trim().to_string();
        if body.is_empty() {
            return Err(CoreError::EmptyNote.into());
        }
        ensure_lead_exists(self.conn, input.lead_id)?;

        let note = Note {
            id: NoteId::new(),
            lead_id: input.lead_id,
            author: input
                .author
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            body,
            created_at: now_utc,
        };

        self.conn.execute(
            "INSERT INTO notes (id, lead_id, author, body, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.lead_id.to_string(),
                note.author,
                note.body,
                note.created_at,
            ],
        )?;

        Ok(note)
    }

    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, lead_id, author, body, created_at
             FROM notes
             WHERE lead_id = ?1
             ORDER BY created_at DESC, id ASC;",
        )?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let id_str: String = row.get(0)?;
            let id = NoteId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str))?;
            let lead_str: String = row.get(1)?;
            let lead_id =
                LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str))?;
            notes.push(Note {
                id,
                lead_id,
                author: row.get(2)?,
                body: row.get(3)?,
                created_at: row.get(4)?,
            });
        }
        Ok(notes)
    }
}
