use crate::domain::options::{FilterOption, SortOption};
use crate::domain::task::Task;

/// Filter, then sort, the full task set into what the list shows.
/// The sort is stable, so ties keep store order.
pub fn derive_view(tasks: &[Task], sort: SortOption, filter: FilterOption) -> Vec<Task> {
    let mut view: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    view.sort_by(|a, b| sort.compare(a, b));
    view
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
}

impl TaskStats {
    pub fn of(tasks: &[Task], now_ms: i64) -> Self {
        let completed = tasks.iter().filter(|t| t.is_completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
            overdue: tasks.iter().filter(|t| t.is_overdue(now_ms)).count(),
        }
    }

    /// Whole percent of tasks completed, 0 for an empty list.
    pub fn completion_percent(&self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}
