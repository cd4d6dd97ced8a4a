use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::sync::watch;

use super::TaskRepository;
use crate::domain::task::{Priority, Task, TaskId};

const COLUMNS: &str = "id, title, description, priority, due_date, is_completed";
const PRIORITY_WEIGHT: &str =
    "CASE priority WHEN 'HIGH' THEN 1 WHEN 'MEDIUM' THEN 2 WHEN 'LOW' THEN 3 ELSE 4 END";

pub struct SqliteTaskRepo {
    conn: Connection,
    changes: watch::Sender<Vec<Task>>,
}

impl SqliteTaskRepo {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create db dir {}", parent.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("failed to open db {}", path.display()))?;
        init_schema(&conn)?;
        tracing::info!(path = %path.display(), "opened task database");
        let repo = Self {
            conn,
            changes: watch::channel(Vec::new()).0,
        };
        repo.publish()?;
        Ok(repo)
    }

    fn select(&self, tail: &str, args: impl rusqlite::Params) -> Result<Vec<Task>> {
        let sql = format!("SELECT {COLUMNS} FROM tasks {tail}");
        let mut stmt = self
            .conn
            .prepare(&sql)
            .with_context(|| format!("failed to prepare {sql:?}"))?;
        let rows = stmt
            .query_map(args, row_to_task)
            .context("failed to query tasks")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("failed to decode task")
    }

    fn publish(&self) -> Result<()> {
        let all = self.all()?;
        self.changes.send_replace(all);
        Ok(())
    }

    // The write is already committed; a failed re-read only leaves observers stale.
    fn publish_after_write(&self) {
        if let Err(err) = self.publish() {
            tracing::warn!("failed to refresh task observers: {err:#}");
        }
    }
}

impl TaskRepository for SqliteTaskRepo {
    fn insert(&mut self, task: &Task) -> Result<TaskId> {
        self.conn
            .execute(
                "INSERT INTO tasks (title, description, priority, due_date, is_completed)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.due_date,
                    task.is_completed as i32
                ],
            )
            .context("failed to insert task")?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, title = %task.title, "inserted task");
        self.publish_after_write();
        Ok(id)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE tasks
                 SET title = ?1, description = ?2, priority = ?3, due_date = ?4, is_completed = ?5
                 WHERE id = ?6",
                params![
                    task.title,
                    task.description,
                    task.priority.as_str(),
                    task.due_date,
                    task.is_completed as i32,
                    task.id
                ],
            )
            .with_context(|| format!("failed to update task {}", task.id))?;
        tracing::debug!(id = task.id, changed, "updated task");
        if changed > 0 {
            self.publish_after_write();
        }
        Ok(())
    }

    fn delete(&mut self, task: &Task) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![task.id])
            .with_context(|| format!("failed to delete task {}", task.id))?;
        tracing::debug!(id = task.id, changed, "deleted task");
        if changed > 0 {
            self.publish_after_write();
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<Task>> {
        self.select("ORDER BY id ASC", [])
    }

    fn all_sorted_by_priority(&self) -> Result<Vec<Task>> {
        self.select(&format!("ORDER BY {PRIORITY_WEIGHT} ASC, id ASC"), [])
    }

    fn all_sorted_by_due_date(&self) -> Result<Vec<Task>> {
        self.select("ORDER BY due_date ASC, id ASC", [])
    }

    fn all_sorted_alphabetically(&self) -> Result<Vec<Task>> {
        self.select("ORDER BY title COLLATE NOCASE ASC, id ASC", [])
    }

    fn by_id(&self, id: TaskId) -> Result<Option<Task>> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                row_to_task,
            )
            .optional()
            .with_context(|| format!("failed to load task {id}"))
    }

    fn by_completion(&self, completed: bool) -> Result<Vec<Task>> {
        self.select(
            "WHERE is_completed = ?1 ORDER BY id ASC",
            params![completed as i32],
        )
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Task>> {
        self.changes.subscribe()
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
PRAGMA journal_mode=WAL;
CREATE TABLE IF NOT EXISTS tasks (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  description TEXT,
  priority TEXT NOT NULL,
  due_date INTEGER NOT NULL,
  is_completed INTEGER NOT NULL DEFAULT 0
);
"#,
    )
    .context("failed to initialize schema")?;
    Ok(())
}

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get("priority")?;
    let priority = priority.parse::<Priority>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, e.into())
    })?;
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority,
        due_date: row.get("due_date")?,
        is_completed: row.get::<_, i32>("is_completed")? != 0,
    })
}

pub fn default_db_path() -> Result<PathBuf> {
    let base = dirs::data_dir().context("failed to resolve data dir")?;
    Ok(base.join("itask").join("tasks.sqlite"))
}
