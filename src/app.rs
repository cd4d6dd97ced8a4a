use anyhow::Result;
use tokio::sync::watch;

use crate::controller::settings::SettingsController;
use crate::controller::task_list::{ListState, TaskListController};
use crate::domain::task::{Priority, Task};
use crate::repo::TaskRepository;
use crate::repo::prefs::PreferenceStore;
use crate::timeutil;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
    Create,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    DueDate,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Priority,
            FormField::Priority => FormField::DueDate,
            FormField::DueDate => FormField::Title,
        }
    }
}

/// Input for a new task.
#[derive(Debug, Clone)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub field: FormField,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: String::new(),
            field: FormField::Title,
        }
    }
}

impl CreateForm {
    pub fn push(&mut self, c: char) {
        match self.field {
            FormField::Title => self.title.push(c),
            FormField::Description => self.description.push(c),
            FormField::Priority => {}
            FormField::DueDate => self.due_date.push(c),
        }
    }

    pub fn pop(&mut self) {
        match self.field {
            FormField::Title => {
                self.title.pop();
            }
            FormField::Description => {
                self.description.pop();
            }
            FormField::Priority => {}
            FormField::DueDate => {
                self.due_date.pop();
            }
        }
    }

    /// Validates the form into an unsaved task, or returns the message to show.
    pub fn build(&self, now_ms: i64) -> Result<Task, &'static str> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Please enter a title");
        }
        let due = timeutil::parse_due_date(&self.due_date, now_ms)
            .ok_or("Please select a due date")?;
        let description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_owned);
        Ok(Task::new(title, description, self.priority, due))
    }
}

/// Last reversible action, offered on the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum UndoAction {
    Deleted,
    Completed(Task),
}

pub struct App<R: TaskRepository, P: PreferenceStore> {
    pub tasks: TaskListController<R>,
    pub settings: SettingsController<P>,
    pub list: watch::Receiver<ListState>,
    pub screen: Screen,
    pub selected: usize,
    pub form: CreateForm,
    pub status: Option<String>,
    undo: Option<UndoAction>,
}

impl<R: TaskRepository, P: PreferenceStore> App<R, P> {
    pub fn new(repo: R, prefs: P) -> Self {
        let tasks = TaskListController::new(repo);
        let list = tasks.subscribe_state();
        let mut app = Self {
            tasks,
            settings: SettingsController::new(prefs),
            list,
            screen: Screen::List,
            selected: 0,
            form: CreateForm::default(),
            status: None,
            undo: None,
        };
        app.reload();
        app
    }

    pub fn view(&self) -> Vec<Task> {
        match &*self.list.borrow() {
            ListState::Success(tasks) => tasks.clone(),
            _ => Vec::new(),
        }
    }

    /// Clamps the cursor after the published list changed.
    pub fn sync_view(&mut self) {
        if self.list.has_changed().unwrap_or(false) {
            let len = match &*self.list.borrow_and_update() {
                ListState::Success(tasks) => tasks.len(),
                _ => 0,
            };
            if self.selected >= len {
                self.selected = len.saturating_sub(1);
            }
        }
    }

    /// Header counts, hidden while the list shows an error.
    pub fn summary(&self, now_ms: i64) -> String {
        if matches!(&*self.list.borrow(), ListState::Error(_)) {
            return "Counts unavailable".to_string();
        }
        let stats = self.tasks.stats(now_ms);
        format!(
            "All: {} / Done: {} / Pending: {} / Overdue: {} ({}%)",
            stats.total,
            stats.completed,
            stats.pending,
            stats.overdue,
            stats.completion_percent()
        )
    }

    pub fn reload(&mut self) {
        let result = self.tasks.load();
        self.report(result, "Reloaded");
    }

    pub fn select_next(&mut self) {
        let len = self.view().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn task_at_cursor(&self) -> Option<Task> {
        self.view().into_iter().nth(self.selected)
    }

    pub fn open_detail(&mut self) {
        if let Some(task) = self.task_at_cursor() {
            self.tasks.select(&task);
            self.screen = Screen::Detail;
        }
    }

    pub fn back_to_list(&mut self) {
        self.tasks.clear_selection();
        self.screen = Screen::List;
    }

    pub fn toggle_selected(&mut self) {
        if let Some(task) = self.task_at_cursor() {
            self.set_completed(&task, !task.is_completed);
        }
    }

    pub fn complete_current(&mut self) {
        if let Some(task) = self.tasks.selected_task().cloned() {
            self.set_completed(&task, true);
            self.back_to_list();
        }
    }

    fn set_completed(&mut self, task: &Task, done: bool) {
        if task.is_completed == done {
            self.set_status(if done { "Already completed" } else { "Already pending" });
            return;
        }
        let result = self.tasks.set_completed(task, done);
        if done {
            if self.report(result, "Task completed (u to undo)") {
                self.undo = Some(UndoAction::Completed(task.clone()));
            }
        } else {
            self.report(result, "Task marked pending");
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(task) = self.task_at_cursor() {
            self.delete(&task);
        }
    }

    pub fn delete_current(&mut self) {
        if let Some(task) = self.tasks.selected_task().cloned() {
            self.delete(&task);
            self.back_to_list();
        }
    }

    fn delete(&mut self, task: &Task) {
        let result = self.tasks.delete(task);
        if self.report(result, "Task deleted (u to undo)") {
            self.undo = Some(UndoAction::Deleted);
        }
    }

    pub fn undo(&mut self) {
        match self.undo.take() {
            Some(UndoAction::Deleted) => {
                let result = self.tasks.undo_delete().map(|_| ());
                self.report(result, "Task restored");
            }
            Some(UndoAction::Completed(task)) => {
                // The completed copy carries the same id.
                let result = self.tasks.set_completed(&task, false);
                self.report(result, "Completion undone");
            }
            None if self.tasks.can_undo_delete() => {
                let result = self.tasks.undo_delete().map(|_| ());
                self.report(result, "Task restored");
            }
            None => self.set_status("Nothing to undo"),
        }
    }

    pub fn cycle_sort(&mut self) {
        let next = self.tasks.sort().next();
        self.tasks.set_sort(next);
        self.set_status(&format!("Sorted by {}", next.label()));
    }

    pub fn cycle_filter(&mut self) {
        let next = self.tasks.filter().next();
        self.tasks.set_filter(next);
        self.selected = 0;
        self.set_status(&format!("Showing {}", next.label()));
    }

    pub fn start_create(&mut self) {
        self.form = CreateForm {
            due_date: timeutil::format_input_date(timeutil::now_millis()),
            ..CreateForm::default()
        };
        self.screen = Screen::Create;
        self.set_status("Tab next field ; Enter save ; Esc cancel");
    }

    pub fn cancel_create(&mut self) {
        self.form = CreateForm::default();
        self.screen = Screen::List;
        self.set_status("Canceled");
    }

    pub fn submit_form(&mut self) {
        let task = match self.form.build(timeutil::now_millis()) {
            Ok(task) => task,
            Err(msg) => {
                self.set_status(msg);
                return;
            }
        };
        let result = self.tasks.add(&task).map(|_| ());
        if self.report(result, "Task added") {
            self.form = CreateForm::default();
            self.screen = Screen::List;
        }
    }

    pub fn open_settings(&mut self) {
        self.screen = Screen::Settings;
        self.set_status("m cycle mode ; p cycle palette ; Esc back");
    }

    pub fn cycle_theme_mode(&mut self) {
        let next = self.settings.theme_mode().next();
        self.settings.update_theme_mode(next);
        self.set_status(&format!("Theme mode: {}", next.label()));
    }

    pub fn cycle_theme_set(&mut self) {
        let next = self.settings.theme_set().next();
        self.settings.update_theme_set(next);
        self.set_status(&format!("Palette: {}", next.name));
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }

    fn report(&mut self, result: Result<()>, ok_msg: &str) -> bool {
        match result {
            Ok(()) => {
                self.set_status(ok_msg);
                true
            }
            Err(err) => {
                self.set_status(&format!("Error: {err}"));
                false
            }
        }
    }
}
