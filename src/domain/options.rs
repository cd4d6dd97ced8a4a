use std::cmp::Ordering;

use super::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    Priority,
    #[default]
    DueDate,
    Alphabetical,
}

impl SortOption {
    pub const ALL: [SortOption; 3] = [
        SortOption::Priority,
        SortOption::DueDate,
        SortOption::Alphabetical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Priority => "Priority",
            SortOption::DueDate => "Due date",
            SortOption::Alphabetical => "Alphabetical",
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortOption::Priority => a.priority.weight().cmp(&b.priority.weight()),
            SortOption::DueDate => a.due_date.cmp(&b.due_date),
            SortOption::Alphabetical => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOption {
    #[default]
    All,
    Completed,
    Pending,
}

impl FilterOption {
    pub const ALL: [FilterOption; 3] = [
        FilterOption::All,
        FilterOption::Completed,
        FilterOption::Pending,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterOption::All => "All",
            FilterOption::Completed => "Completed",
            FilterOption::Pending => "Pending",
        }
    }

    pub fn next(self) -> Self {
        let pos = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(pos + 1) % Self::ALL.len()]
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            FilterOption::All => true,
            FilterOption::Completed => task.is_completed,
            FilterOption::Pending => !task.is_completed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_cycle_through_every_variant() {
        let mut sort = SortOption::default();
        for _ in 0..SortOption::ALL.len() {
            sort = sort.next();
        }
        assert_eq!(sort, SortOption::DueDate);
        assert_eq!(SortOption::DueDate.next(), SortOption::Alphabetical);
        assert_eq!(FilterOption::Pending.next(), FilterOption::All);
    }
}
