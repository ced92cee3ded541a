use crate::error::{Result, StoreError};
use crate::repo::activities::{add_activity, ActivityNew};
use crate::repo::leads::ensure_lead_exists;
use leadbook_core::domain::{ActivityKind, LeadId, Task, TaskId};
use rusqlite::{params, Connection};
use std::str::FromStr;

const TASK_COLUMNS: &str = "id, lead_id, title, due_at, completed_at, created_at";

#[derive(Debug, Clone)]
pub struct TaskNew {
    pub lead_id: LeadId,
    pub title: String,
    pub due_at: Option<i64>,
}

pub struct TasksRepo<'a> {
    conn: &'a Connection,
}

impl<'a> TasksRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, now_utc: i64, input: TaskNew, author: Option<&str>) -> Result<Task> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let task = create_inner(&tx, now_utc, input, author)?;
            tx.commit()?;
            Ok(task)
        } else {
            create_inner(self.conn, now_utc, input, author)
        }
    }

    /// Completing an already completed task returns it unchanged.
    pub fn complete(&self, now_utc: i64, id: TaskId, author: Option<&str>) -> Result<Task> {
        if self.conn.is_autocommit() {
            let tx = self.conn.unchecked_transaction()?;
            let task = complete_inner(&tx, now_utc, id, author)?;
            tx.commit()?;
            Ok(task)
        } else {
            complete_inner(self.conn, now_utc, id, author)
        }
    }

    pub fn get(&self, id: TaskId) -> Result<Option<Task>> {
        get_inner(self.conn, id)
    }

    /// Open tasks first, ordered by due date (undated last), then completed.
    pub fn list_for_lead(&self, lead_id: LeadId) -> Result<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TASK_COLUMNS}
             FROM tasks
             WHERE lead_id = ?1
             ORDER BY completed_at IS NOT NULL ASC,
                      due_at IS NULL ASC,
                      due_at ASC,
                      created_at ASC;"
        ))?;
        let mut rows = stmt.query([lead_id.to_string()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(task_from_row(row)?);
        }
        Ok(tasks)
    }

    pub fn list_open_for_lead(&self, lead_id: LeadId) -> Result<Vec<Task>> {
        Ok(self
            .list_for_lead(lead_id)?
            .into_iter()
            .filter(Task::is_open)
            .collect())
    }
}

fn create_inner(
    conn: &Connection,
    now_utc: i64,
    input: TaskNew,
    author: Option<&str>,
) -> Result<Task> {
    let task = Task {
        id: TaskId::new(),
        lead_id: input.lead_id,
        title: input.title.trim().to_string(),
        due_at: input.due_at,
        completed_at: None,
        created_at: now_utc,
    };
    task.validate()?;
    ensure_lead_exists(conn, task.lead_id)?;

    conn.execute(
        &format!("INSERT INTO tasks ({TASK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6);"),
        params![
            task.id.to_string(),
            task.lead_id.to_string(),
            task.title,
            task.due_at,
            task.completed_at,
            task.created_at,
        ],
    )?;

    add_activity(
        conn,
        ActivityNew {
            lead_id: task.lead_id,
            kind: ActivityKind::TaskCreated,
            occurred_at: now_utc,
            created_at: now_utc,
            author: author.map(str::to_string),
            content: format!("Task created: {}", task.title),
        },
    )?;

    Ok(task)
}

fn complete_inner(
    conn: &Connection,
    now_utc: i64,
    id: TaskId,
    author: Option<&str>,
) -> Result<Task> {
    let mut task = get_inner(conn, id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    if !task.is_open() {
        return Ok(task);
    }

    conn.execute(
        "UPDATE tasks SET completed_at = ?2 WHERE id = ?1;",
        params![id.to_string(), now_utc],
    )?;
    task.completed_at = Some(now_utc);

    add_activity(
        conn,
        ActivityNew {
            lead_id: task.lead_id,
            kind: ActivityKind::TaskCompleted,
            occurred_at: now_utc,
            created_at: now_utc,
            author: author.map(str::to_string),
            content: format!("Task completed: {}", task.title),
        },
    )?;

    Ok(task)
}

fn get_inner(conn: &Connection, id: TaskId) -> Result<Option<Task>> {
    let mut stmt = conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    match rows.next()? {
        Some(row) => Ok(Some(task_from_row(row)?)),
        None => Ok(None),
    }
}

fn task_from_row(row: &rusqlite::Row<'_>) -> Result<Task> {
    let id_str: String = row.get(0)?;
    let id = TaskId::from_str(&id_str).map_err(|_| StoreError::InvalidId(id_str))?;
    let lead_str: String = row.get(1)?;
    let lead_id = LeadId::from_str(&lead_str).map_err(|_| StoreError::InvalidId(lead_str))?;
    Ok(Task {
        id,
        lead_id,
        title: row.get(2)?,
        due_at: row.get(3)?,
        completed_at: row.get(4)?,
        created_at: row.get(5)?,
    })
}
