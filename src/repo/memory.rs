use anyhow::Result;
use tokio::sync::watch;

use super::TaskRepository;
use crate::domain::options::SortOption;
use crate::domain::task::{Task, TaskId};

pub struct InMemoryTaskRepo {
    items: Vec<Task>,
    next_id: TaskId,
    changes: watch::Sender<Vec<Task>>,
}

impl Default for InMemoryTaskRepo {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            changes: watch::channel(Vec::new()).0,
        }
    }
}

impl InMemoryTaskRepo {
    pub fn with_seed(seed: impl IntoIterator<Item = Task>) -> Self {
        let mut repo = Self::default();
        for task in seed {
            repo.push(task);
        }
        repo.publish();
        repo
    }

    fn push(&mut self, task: Task) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Task { id, ..task });
        id
    }

    fn publish(&self) {
        self.changes.send_replace(self.items.clone());
    }

    fn sorted_by(&self, sort: SortOption) -> Vec<Task> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| sort.compare(a, b));
        items
    }
}

impl TaskRepository for InMemoryTaskRepo {
    fn insert(&mut self, task: &Task) -> Result<TaskId> {
        let id = self.push(task.clone());
        self.publish();
        Ok(id)
    }

    fn update(&mut self, task: &Task) -> Result<()> {
        if let Some(slot) = self.items.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
            self.publish();
        }
        Ok(())
    }

    fn delete(&mut self, task: &Task) -> Result<()> {
        if let Some(pos) = self.items.iter().position(|t| t.id == task.id) {
            self.items.remove(pos);
            self.publish();
        }
        Ok(())
    }

    fn all(&self) -> Result<Vec<Task>> {
        Ok(self.items.clone())
    }

    fn all_sorted_by_priority(&self) -> Result<Vec<Task>> {
        Ok(self.sorted_by(SortOption::Priority))
    }

    fn all_sorted_by_due_date(&self) -> Result<Vec<Task>> {
        Ok(self.sorted_by(SortOption::DueDate))
    }

    fn all_sorted_alphabetically(&self) -> Result<Vec<Task>> {
        Ok(self.sorted_by(SortOption::Alphabetical))
    }

    fn by_id(&self, id: TaskId) -> Result<Option<Task>> {
        Ok(self.items.iter().find(|t| t.id == id).cloned())
    }

    fn by_completion(&self, completed: bool) -> Result<Vec<Task>> {
        Ok(self
            .items
            .iter()
            .filter(|t| t.is_completed == completed)
            .cloned()
            .collect())
    }

    fn observe_all(&self) -> watch::Receiver<Vec<Task>> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Priority;

    #[test]
    fn ids_are_assigned_in_order() {
        let mut repo = InMemoryTaskRepo::default();
        let a = repo.insert(&Task::new("a", None, Priority::Low, 1)).unwrap();
        let b = repo.insert(&Task::new("b", None, Priority::Low, 2)).unwrap();
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn deleted_ids_are_not_reused() {
        let mut repo = InMemoryTaskRepo::default();
        let id = repo.insert(&Task::new("a", None, Priority::Low, 1)).unwrap();
        let stored = repo.by_id(id).unwrap().unwrap();
        repo.delete(&stored).unwrap();
        let again = repo.insert(&stored).unwrap();
        assert_ne!(again, id);
    }

    #[test]
    fn update_of_unknown_id_is_ignored() {
        let mut repo = InMemoryTaskRepo::with_seed([Task::new("a", None, Priority::Low, 1)]);
        let mut ghost = Task::new("ghost", None, Priority::High, 1);
        ghost.id = 42;
        repo.update(&ghost).unwrap();
        let all = repo.all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "a");
    }

    #[test]
    fn seeded_tasks_are_observable() {
        let repo = InMemoryTaskRepo::with_seed([
            Task::new("a", None, Priority::Low, 1),
            Task::new("b", None, Priority::High, 2),
        ]);
        assert_eq!(repo.observe_all().borrow().len(), 2);
        assert_eq!(repo.by_completion(false).unwrap().len(), 2);
        assert_eq!(repo.all_sorted_by_priority().unwrap()[0].title, "b");
    }
}
