use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::Args;
use crate::repo::prefs::default_settings_path;
use crate::repo::sqlite::default_db_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStoreKind {
    Sqlite(PathBuf),
    Memory,
    Demo,
}

/// Runtime settings resolved from the command line and OS directories.
#[derive(Debug, Clone)]
pub struct Config {
    pub tick_rate: Duration,
    pub task_store: TaskStoreKind,
    /// `None` keeps preferences in memory for the session.
    pub settings_path: Option<PathBuf>,
    pub log_path: PathBuf,
}

impl Config {
    pub fn resolve(args: &Args) -> Result<Self> {
        let ephemeral = args.demo || args.memory;
        let task_store = if args.demo {
            TaskStoreKind::Demo
        } else if args.memory {
            TaskStoreKind::Memory
        } else if let Some(path) = &args.db_path {
            TaskStoreKind::Sqlite(path.clone())
        } else {
            TaskStoreKind::Sqlite(default_db_path()?)
        };

        let settings_path = match &args.settings_path {
            Some(path) => Some(path.clone()),
            None if ephemeral => None,
            None => Some(default_settings_path()?),
        };

        let log_path = match &args.log_path {
            Some(path) => path.clone(),
            None => default_log_path(),
        };

        Ok(Self {
            tick_rate: Duration::from_millis(args.tick_ms),
            task_store,
            settings_path,
            log_path,
        })
    }
}

fn default_log_path() -> PathBuf {
    dirs::data_dir()
        .map(|base| base.join("itask"))
        .unwrap_or_else(std::env::temp_dir)
        .join("itask.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn demo_mode_keeps_everything_in_memory() {
        let args = Args::parse_from(["itask", "--demo", "--log-path", "/tmp/x.log"]);
        let config = Config::resolve(&args).unwrap();
        assert_eq!(config.task_store, TaskStoreKind::Demo);
        assert_eq!(config.settings_path, None);
        assert_eq!(config.log_path, PathBuf::from("/tmp/x.log"));
        assert_eq!(config.tick_rate, Duration::from_millis(120));
    }

    #[test]
    fn explicit_paths_win() {
        let args = Args::parse_from([
            "itask",
            "--db-path",
            "/tmp/t.sqlite",
            "--settings-path",
            "/tmp/s.json",
            "--tick-ms",
            "50",
        ]);
        let config = Config::resolve(&args).unwrap();
        assert_eq!(
            config.task_store,
            TaskStoreKind::Sqlite(PathBuf::from("/tmp/t.sqlite"))
        );
        assert_eq!(config.settings_path, Some(PathBuf::from("/tmp/s.json")));
        assert_eq!(config.tick_rate, Duration::from_millis(50));
    }
}
