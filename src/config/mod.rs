use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

pub mod error;
pub mod load;
pub mod paths;

pub use error::ConfigError;
pub use load::load_default_config;
pub use paths::{default_config_path, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH, RCLONE_CONFIG_PATH};

pub const DEFAULT_SCHEDULE: &str = "0 2 * * *";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub chat_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub default_retention_days: u32,
    #[serde(default)]
    pub rclone_remote_name: String,
    #[serde(default)]
    pub remote_base_path: String,
    #[serde(default = "default_schedule")]
    pub default_schedule: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_retention_days: 0,
            rclone_remote_name: String::new(),
            remote_base_path: String::new(),
            default_schedule: default_schedule(),
        }
    }
}

impl GlobalConfig {
    /// Remote-side directory for a task: `remote_base_path/task_name`.
    pub fn remote_destination(&self, task_name: &str) -> String {
        let base = self.remote_base_path.trim_end_matches('/');
        if base.is_empty() {
            task_name.to_string()
        } else {
            format!("{base}/{task_name}")
        }
    }

    /// Fully qualified rclone target, `remote:base/task`.
    pub fn remote_target(&self, task_name: &str) -> String {
        format!(
            "{}:{}",
            self.rclone_remote_name,
            self.remote_destination(task_name)
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub name: String,
    pub source: PathBuf,
    pub archive_prefix: String,
    #[serde(default)]
    pub retention_days: Option<u32>,
    #[serde(default)]
    pub schedule: Option<String>,
}

impl Task {
    pub fn effective_retention_days(&self, globals: &GlobalConfig) -> u32 {
        self.retention_days
            .unwrap_or(globals.default_retention_days)
    }

    pub fn effective_schedule<'a>(&'a self, globals: &'a GlobalConfig) -> &'a str {
        self.schedule
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(globals.default_schedule.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub globals: GlobalConfig,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl BackupConfig {
    pub fn find_task(&self, name: &str) -> Result<&Task, ConfigError> {
        self.tasks
            .iter()
            .find(|task| task.name == name)
            .ok_or_else(|| ConfigError::TaskNotFound {
                name: name.to_string(),
            })
    }

    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|task| task.name.as_str()).collect()
    }

    /// Checks what every backup run depends on. Schedules are left to
    /// crontab rendering, so a schedule cron rejects never blocks a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.globals.rclone_remote_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "`globals.rclone_remote_name` must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "task `name` must be non-empty".to_string(),
                ));
            }
            if !seen.insert(task.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate task name `{}`",
                    task.name
                )));
            }
            if task.archive_prefix.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task `{}` must set a non-empty `archive_prefix`",
                    task.name
                )));
            }
        }
        Ok(())
    }
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}
