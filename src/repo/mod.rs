use anyhow::Result;
use tokio::sync::watch;

use crate::domain::task::{Task, TaskId};

pub mod memory;
pub mod prefs;
pub mod sqlite;

/// Persistent task table. Writes by id are no-ops when the id is absent.
pub trait TaskRepository {
    /// Inserts `task`, ignoring its id, and returns the id the store assigned.
    fn insert(&mut self, task: &Task) -> Result<TaskId>;
    fn update(&mut self, task: &Task) -> Result<()>;
    fn delete(&mut self, task: &Task) -> Result<()>;

    /// Every task in insertion order.
    fn all(&self) -> Result<Vec<Task>>;
    fn all_sorted_by_priority(&self) -> Result<Vec<Task>>;
    fn all_sorted_by_due_date(&self) -> Result<Vec<Task>>;
    fn all_sorted_alphabetically(&self) -> Result<Vec<Task>>;
    fn by_id(&self, id: TaskId) -> Result<Option<Task>>;
    fn by_completion(&self, completed: bool) -> Result<Vec<Task>>;

    /// Live mirror of the whole table, republished after each write.
    fn observe_all(&self) -> watch::Receiver<Vec<Task>>;
}

impl<R: TaskRepository + ?Sized> TaskRepository for Box<R> {
    fn insert(&mut self, task: &Task) -> Result<TaskId> {
        (**self).insert(task)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        (**self).update(task)
    }

    fn delete(&mut self, task: &Task) -> Result<()> {
        (**self).delete(task)
    }

    fn all(&self) -> Result<Vec<Task>> {
        (**self).all()
    }

    fn all_sorted_by_priority(&self) -> Result<Vec<Task>> {
        (**self).all_sorted_by_priority()
    }

    fn all_sorted_by_due_date(&self) -> Result<Vec<Task>> {
        (**self).all_sorted_by_due_date()
    }

    fn all_sorted_alphabetically(&self) -> Result<Vec<Task>> {
        (**self).all_sorted_alphabetically()
    }

    fn by_id(&self, id: TaskId) -> Result<Option<Task>> {
        (**self).by_id(id)
    }

    fn by_completion(&self, completed: bool) -> Result<Vec<Task>> {
        (**self).by_completion(completed)
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Task>> {
        (**self).observe_all()
    }
}
