use crate::command::CommandError;
use crate::config::RCLONE_CONFIG_PATH;
use std::path::PathBuf;

pub mod archive;
pub mod invocation;
pub mod runner;

pub use archive::{archive_name, StagedArchive, ARCHIVE_TIMESTAMP_FORMAT};
pub use invocation::{build_archive_command, build_prune_command, build_upload_command};
pub use runner::Pipeline;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("task `{name}` is not defined in config")]
    TaskNotFound { name: String },
    #[error("source directory not found: {path}")]
    SourceMissing { path: String },
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("backup pipeline panicked: {0}")]
    Panicked(String),
}

/// Result of one pipeline run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub task_name: String,
    pub archive_name: Option<String>,
    pub succeeded: bool,
    pub failure_reason: Option<String>,
}

impl ExecutionOutcome {
    pub(crate) fn from_result(
        task_name: &str,
        archive_name: Option<String>,
        result: Result<(), PipelineError>,
    ) -> Self {
        match result {
            Ok(()) => Self {
                task_name: task_name.to_string(),
                archive_name,
                succeeded: true,
                failure_reason: None,
            },
            Err(err) => Self {
                task_name: task_name.to_string(),
                archive_name,
                succeeded: false,
                failure_reason: Some(err.to_string()),
            },
        }
    }
}

/// External binaries and fixed local paths the pipeline drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineTools {
    pub archiver: String,
    pub sync: String,
    pub rclone_config: PathBuf,
    pub temp_dir: PathBuf,
}

impl Default for PipelineTools {
    fn default() -> Self {
        Self {
            archiver: "zip".to_string(),
            sync: "rclone".to_string(),
            rclone_config: PathBuf::from(RCLONE_CONFIG_PATH),
            temp_dir: PathBuf::from("/tmp"),
        }
    }
}
