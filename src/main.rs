mod app;
mod config;
mod controller;
mod domain;
mod logging;
mod repo;
mod timeutil;
mod ui;
mod usecase;

use anyhow::Result;
use clap::Parser;

use app::App;
use config::{Config, TaskStoreKind};
use domain::task::{Priority, Task};
use repo::memory::InMemoryTaskRepo;
use repo::prefs::{InMemoryPreferenceStore, JsonPreferenceStore, PreferenceStore};
use repo::sqlite::SqliteTaskRepo;

const DAY_MS: i64 = 86_400_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "itask — task manager TUI", long_about = None)]
pub struct Args {
    /// Tick interval of render loop in milliseconds
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Start with demo tasks (in memory)
    #[arg(long, default_value_t = false)]
    demo: bool,

    /// Use in-memory store instead of SQLite
    #[arg(long, default_value_t = false)]
    memory: bool,

    /// Path to SQLite DB file (default: OS data dir)
    #[arg(long)]
    db_path: Option<std::path::PathBuf>,

    /// Path to the settings JSON file (default: OS config dir)
    #[arg(long)]
    settings_path: Option<std::path::PathBuf>,

    /// Path to the log file (default: OS data dir)
    #[arg(long)]
    log_path: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::resolve(&args)?;
    logging::init(&config.log_path)?;
    tracing::info!(?config, "starting");

    let repo: Box<dyn repo::TaskRepository> = match &config.task_store {
        TaskStoreKind::Demo => Box::new(InMemoryTaskRepo::with_seed(seed_tasks())),
        TaskStoreKind::Memory => Box::new(InMemoryTaskRepo::default()),
        TaskStoreKind::Sqlite(path) => Box::new(SqliteTaskRepo::open(path)?),
    };
    let prefs: Box<dyn PreferenceStore> = match &config.settings_path {
        Some(path) => Box::new(JsonPreferenceStore::open(path)),
        None => Box::new(InMemoryPreferenceStore::default()),
    };

    let app = App::new(repo, prefs);
    let res = ui::run(app, config.tick_rate);
    if let Err(err) = &res {
        tracing::error!("exiting with error: {err:#}");
    }
    res
}

fn seed_tasks() -> Vec<Task> {
    let now = timeutil::now_millis();
    vec![
        Task::new(
            "Buy groceries",
            Some("Milk, eggs, bread".into()),
            Priority::Low,
            now + DAY_MS,
        ),
        Task::new(
            "Doctor Appointment",
            None,
            Priority::Medium,
            now + 3 * DAY_MS,
        ),
        Task::new(
            "Submit tax return",
            Some("Forms are in the desk drawer".into()),
            Priority::High,
            now - DAY_MS,
        ),
    ]
}
