use anyhow::{Context, Result};
use tokio::sync::watch;

use crate::domain::options::{FilterOption, SortOption};
use crate::domain::task::{Task, TaskId};
use crate::repo::TaskRepository;
use crate::usecase::view::{TaskStats, derive_view};

/// What the list screen shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Initial,
    Loading,
    Empty,
    Success(Vec<Task>),
    Error(String),
}

/// Owns the in-memory mirror of the task table and the derived view.
///
/// Every write goes to the store first and is followed by a full reload.
/// The filtered and sorted view is recomputed whenever the task set, the
/// sort option or the filter option changes, and published on a watch
/// channel together with the two options.
pub struct TaskListController<R: TaskRepository> {
    repo: R,
    all_tasks: Vec<Task>,
    deleted: Vec<Task>,
    selected: Option<Task>,
    state: watch::Sender<ListState>,
    sort: watch::Sender<SortOption>,
    filter: watch::Sender<FilterOption>,
}

impl<R: TaskRepository> TaskListController<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            all_tasks: Vec::new(),
            deleted: Vec::new(),
            selected: None,
            state: watch::channel(ListState::Initial).0,
            sort: watch::channel(SortOption::default()).0,
            filter: watch::channel(FilterOption::default()).0,
        }
    }

    pub fn load(&mut self) -> Result<()> {
        self.state.send_replace(ListState::Loading);
        match self.repo.all().context("failed to load tasks") {
            Ok(tasks) => {
                tracing::debug!(count = tasks.len(), "loaded tasks");
                self.all_tasks = tasks;
                self.publish_view();
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    pub fn add(&mut self, task: &Task) -> Result<TaskId> {
        let id = self
            .repo
            .insert(task)
            .context("failed to add task")
            .map_err(|err| self.fail(err))?;
        tracing::info!(id, title = %task.title, "added task");
        self.load()?;
        Ok(id)
    }

    pub fn update(&mut self, task: &Task) -> Result<()> {
        if !task.is_persisted() {
            tracing::debug!(title = %task.title, "skipping update of unsaved task");
            return self.load();
        }
        self.repo
            .update(task)
            .context("failed to update task")
            .map_err(|err| self.fail(err))?;
        if self.selected.as_ref().is_some_and(|s| s.id == task.id) {
            self.selected = Some(task.clone());
        }
        self.load()
    }

    pub fn delete(&mut self, task: &Task) -> Result<()> {
        self.deleted.push(task.clone());
        if let Err(err) = self.repo.delete(task).context("failed to delete task") {
            self.deleted.pop();
            return Err(self.fail(err));
        }
        tracing::info!(id = task.id, title = %task.title, "deleted task");
        if self.selected.as_ref().is_some_and(|s| s.id == task.id) {
            self.selected = None;
        }
        self.load()
    }

    pub fn complete(&mut self, task: &Task) -> Result<()> {
        self.set_completed(task, true)
    }

    pub fn set_completed(&mut self, task: &Task, is_completed: bool) -> Result<()> {
        self.update(&task.with_completed(is_completed))
    }

    /// Re-inserts the most recently deleted task. The store assigns it a new
    /// id. Returns `None` when nothing is left to restore.
    pub fn undo_delete(&mut self) -> Result<Option<TaskId>> {
        let Some(task) = self.deleted.pop() else {
            return Ok(None);
        };
        let id = match self.repo.insert(&task).context("failed to restore task") {
            Ok(id) => id,
            Err(err) => {
                self.deleted.push(task);
                return Err(self.fail(err));
            }
        };
        tracing::info!(old_id = task.id, id, "restored deleted task");
        self.load()?;
        Ok(Some(id))
    }

    pub fn can_undo_delete(&self) -> bool {
        !self.deleted.is_empty()
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.sort.send_replace(sort);
        self.refresh_view();
    }

    pub fn set_filter(&mut self, filter: FilterOption) {
        self.filter.send_replace(filter);
        self.refresh_view();
    }

    pub fn sort(&self) -> SortOption {
        *self.sort.borrow()
    }

    pub fn filter(&self) -> FilterOption {
        *self.filter.borrow()
    }

    pub fn select(&mut self, task: &Task) {
        self.selected = Some(task.clone());
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected.as_ref()
    }

    pub fn all_tasks(&self) -> &[Task] {
        &self.all_tasks
    }

    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// The filtered and sorted list currently published. Empty unless the
    /// last load succeeded.
    pub fn derived_view(&self) -> Vec<Task> {
        match &*self.state.borrow() {
            ListState::Success(tasks) => tasks.clone(),
            _ => Vec::new(),
        }
    }

    pub fn stats(&self, now_ms: i64) -> TaskStats {
        TaskStats::of(&self.all_tasks, now_ms)
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ListState> {
        self.state.subscribe()
    }

    pub fn subscribe_sort(&self) -> watch::Receiver<SortOption> {
        self.sort.subscribe()
    }

    pub fn subscribe_filter(&self) -> watch::Receiver<FilterOption> {
        self.filter.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn repo_for_tests(&mut self) -> &mut R {
        &mut self.repo
    }

    fn publish_view(&self) {
        let view = derive_view(&self.all_tasks, self.sort(), self.filter());
        let next = if view.is_empty() {
            ListState::Empty
        } else {
            ListState::Success(view)
        };
        self.state.send_replace(next);
    }

    // An error or pending load stays on screen until the next load.
    fn refresh_view(&self) {
        let shown = matches!(
            *self.state.borrow(),
            ListState::Success(_) | ListState::Empty
        );
        if shown {
            self.publish_view();
        }
    }

    fn fail(&self, err: anyhow::Error) -> anyhow::Error {
        tracing::error!("{err:#}");
        self.state.send_replace(ListState::Error(err.to_string()));
        err
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use anyhow::anyhow;

    use super::*;
    use crate::domain::task::Priority;
    use crate::repo::memory::InMemoryTaskRepo;

    const D1: i64 = 1_700_000_000_000;
    const D2: i64 = D1 + 86_400_000;

    fn groceries() -> Task {
        Task::new("Buy groceries", None, Priority::Low, D1)
    }

    fn doctor() -> Task {
        Task::new(
            "Doctor Appointment",
            Some("bring card".into()),
            Priority::Medium,
            D2,
        )
    }

    fn controller() -> TaskListController<InMemoryTaskRepo> {
        let mut c = TaskListController::new(InMemoryTaskRepo::default());
        c.load().unwrap();
        c.add(&groceries()).unwrap();
        c.add(&doctor()).unwrap();
        c
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn find(c: &TaskListController<InMemoryTaskRepo>, title: &str) -> Task {
        c.all_tasks()
            .iter()
            .find(|t| t.title == title)
            .cloned()
            .unwrap()
    }

    #[test]
    fn starts_initial_with_defaults() {
        let c = TaskListController::new(InMemoryTaskRepo::default());
        assert_eq!(c.state(), ListState::Initial);
        assert_eq!(c.sort(), SortOption::DueDate);
        assert_eq!(c.filter(), FilterOption::All);
    }

    #[test]
    fn empty_store_loads_as_empty() {
        let mut c = TaskListController::new(InMemoryTaskRepo::default());
        c.load().unwrap();
        assert_eq!(c.state(), ListState::Empty);
        assert!(c.derived_view().is_empty());
    }

    #[test]
    fn priority_sort_puts_medium_before_low() {
        let mut c = controller();
        c.set_sort(SortOption::Priority);
        assert_eq!(
            titles(&c.derived_view()),
            ["Doctor Appointment", "Buy groceries"]
        );
    }

    #[test]
    fn due_date_is_the_default_order() {
        let c = controller();
        assert_eq!(
            titles(&c.derived_view()),
            ["Buy groceries", "Doctor Appointment"]
        );
    }

    #[test]
    fn filters_follow_completion() {
        let mut c = controller();
        c.set_filter(FilterOption::Pending);
        assert_eq!(c.derived_view().len(), 2);

        let task = find(&c, "Buy groceries");
        c.complete(&task).unwrap();
        assert_eq!(titles(&c.derived_view()), ["Doctor Appointment"]);

        c.set_filter(FilterOption::Completed);
        assert_eq!(titles(&c.derived_view()), ["Buy groceries"]);
    }

    #[test]
    fn add_round_trips_all_fields_but_id() {
        let mut c = TaskListController::new(InMemoryTaskRepo::default());
        let draft = doctor();
        let id = c.add(&draft).unwrap();
        let stored = find(&c, "Doctor Appointment");
        assert_eq!(stored.id, id);
        assert!(stored.same_content(&draft));
    }

    #[test]
    fn load_is_idempotent() {
        let mut c = controller();
        c.load().unwrap();
        let first = c.all_tasks().to_vec();
        c.load().unwrap();
        assert_eq!(c.all_tasks(), first.as_slice());
    }

    #[test]
    fn delete_then_undo_restores_with_new_id() {
        let mut c = controller();
        let task = find(&c, "Buy groceries");
        c.delete(&task).unwrap();
        assert!(!titles(&c.derived_view()).contains(&"Buy groceries"));
        assert!(c.can_undo_delete());

        let restored_id = c.undo_delete().unwrap().unwrap();
        assert_ne!(restored_id, task.id);
        let restored = find(&c, "Buy groceries");
        assert!(restored.same_content(&task));
        assert!(!c.can_undo_delete());
    }

    #[test]
    fn undo_is_last_in_first_out() {
        let mut c = controller();
        let first = find(&c, "Buy groceries");
        let second = find(&c, "Doctor Appointment");
        c.delete(&first).unwrap();
        c.delete(&second).unwrap();
        assert!(c.all_tasks().is_empty());

        c.undo_delete().unwrap();
        assert_eq!(titles(c.all_tasks()), ["Doctor Appointment"]);
        c.undo_delete().unwrap();
        assert_eq!(c.all_tasks().len(), 2);
        assert_eq!(c.undo_delete().unwrap(), None);
    }

    #[test]
    fn update_of_unknown_task_changes_nothing() {
        let mut c = controller();
        let mut ghost = groceries();
        ghost.id = 999;
        ghost.title = "Ghost".into();
        c.update(&ghost).unwrap();
        assert_eq!(
            titles(c.all_tasks()),
            ["Buy groceries", "Doctor Appointment"]
        );
    }

    #[test]
    fn observers_see_view_and_option_changes() {
        let mut c = controller();
        let mut state = c.subscribe_state();
        let mut sort = c.subscribe_sort();
        state.borrow_and_update();

        c.set_sort(SortOption::Alphabetical);
        assert!(sort.has_changed().unwrap());
        assert_eq!(*sort.borrow_and_update(), SortOption::Alphabetical);
        assert!(state.has_changed().unwrap());
        match &*state.borrow_and_update() {
            ListState::Success(tasks) => {
                assert_eq!(titles(tasks), ["Buy groceries", "Doctor Appointment"])
            }
            other => panic!("unexpected state {other:?}"),
        }

        let mut filter = c.subscribe_filter();
        assert_eq!(*filter.borrow_and_update(), FilterOption::All);
        c.set_filter(FilterOption::Completed);
        assert!(filter.has_changed().unwrap());
        assert_eq!(*filter.borrow_and_update(), FilterOption::Completed);
        assert_eq!(*state.borrow_and_update(), ListState::Empty);
    }

    #[test]
    fn selection_tracks_updates_and_deletes() {
        let mut c = controller();
        let task = find(&c, "Doctor Appointment");
        c.select(&task);
        c.complete(&task).unwrap();
        assert!(c.selected_task().unwrap().is_completed);

        c.delete(&task).unwrap();
        assert!(c.selected_task().is_none());
    }

    #[test]
    fn stats_reflect_all_tasks() {
        let mut c = controller();
        c.set_filter(FilterOption::Completed);
        let stats = c.stats(D1 + 1);
        assert_eq!(stats.total, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.overdue, 1);
    }

    /// Store whose reads or writes can be switched to fail.
    struct FlakyRepo {
        inner: InMemoryTaskRepo,
        fail_reads: Rc<Cell<bool>>,
        fail_writes: Rc<Cell<bool>>,
    }

    impl FlakyRepo {
        fn check(flag: &Cell<bool>) -> Result<()> {
            if flag.get() {
                Err(anyhow!("disk I/O error"))
            } else {
                Ok(())
            }
        }
    }

    impl TaskRepository for FlakyRepo {
        fn insert(&mut self, task: &Task) -> Result<TaskId> {
            Self::check(&self.fail_writes)?;
            self.inner.insert(task)
        }

        fn update(&mut self, task: &Task) -> Result<()> {
            Self::check(&self.fail_writes)?;
            self.inner.update(task)
        }

        fn delete(&mut self, task: &Task) -> Result<()> {
            Self::check(&self.fail_writes)?;
            self.inner.delete(task)
        }

        fn all(&self) -> Result<Vec<Task>> {
            Self::check(&self.fail_reads)?;
            self.inner.all()
        }

        fn all_sorted_by_priority(&self) -> Result<Vec<Task>> {
            self.inner.all_sorted_by_priority()
        }

        fn all_sorted_by_due_date(&self) -> Result<Vec<Task>> {
            self.inner.all_sorted_by_due_date()
        }

        fn all_sorted_alphabetically(&self) -> Result<Vec<Task>> {
            self.inner.all_sorted_alphabetically()
        }

        fn by_id(&self, id: TaskId) -> Result<Option<Task>> {
            self.inner.by_id(id)
        }

        fn by_completion(&self, completed: bool) -> Result<Vec<Task>> {
            self.inner.by_completion(completed)
        }

        fn observe_all(&self) -> watch::Receiver<Vec<Task>> {
            self.inner.observe_all()
        }
    }

    fn flaky() -> (
        TaskListController<FlakyRepo>,
        Rc<Cell<bool>>,
        Rc<Cell<bool>>,
    ) {
        let reads = Rc::new(Cell::new(false));
        let writes = Rc::new(Cell::new(false));
        let repo = FlakyRepo {
            inner: InMemoryTaskRepo::with_seed([groceries()]),
            fail_reads: reads.clone(),
            fail_writes: writes.clone(),
        };
        let mut c = TaskListController::new(repo);
        c.load().unwrap();
        (c, reads, writes)
    }

    #[test]
    fn read_failure_surfaces_error_state() {
        let (mut c, reads, _) = flaky();
        reads.set(true);
        assert!(c.load().is_err());
        assert_eq!(c.state(), ListState::Error("failed to load tasks".into()));
        assert!(c.derived_view().is_empty());

        c.set_sort(SortOption::Priority);
        assert!(matches!(c.state(), ListState::Error(_)));

        reads.set(false);
        c.load().unwrap();
        assert_eq!(titles(&c.derived_view()), ["Buy groceries"]);
    }

    #[test]
    fn write_failures_surface_like_read_failures() {
        let (mut c, _, writes) = flaky();
        writes.set(true);
        assert!(c.add(&doctor()).is_err());
        assert_eq!(c.state(), ListState::Error("failed to add task".into()));

        let task = c.all_tasks()[0].clone();
        assert!(c.complete(&task).is_err());
        assert_eq!(c.state(), ListState::Error("failed to update task".into()));
    }

    #[test]
    fn failed_delete_leaves_nothing_to_undo() {
        let (mut c, _, writes) = flaky();
        let task = c.all_tasks()[0].clone();
        writes.set(true);
        assert!(c.delete(&task).is_err());
        assert!(!c.can_undo_delete());
    }

    #[test]
    fn failed_restore_keeps_task_for_retry() {
        let (mut c, _, writes) = flaky();
        let task = c.all_tasks()[0].clone();
        c.delete(&task).unwrap();

        writes.set(true);
        assert!(c.undo_delete().is_err());
        assert!(c.can_undo_delete());

        writes.set(false);
        assert!(c.undo_delete().unwrap().is_some());
        assert_eq!(c.all_tasks().len(), 1);
    }
}
