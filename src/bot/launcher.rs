use crate::config::BackupConfig;
use crate::pipeline::{ExecutionOutcome, Pipeline};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Starts one detached worker thread per confirmed backup. There is no pool
/// and no per-task exclusion: overlapping runs of the same task are allowed.
#[derive(Clone)]
pub struct JobLauncher {
    config: Arc<BackupConfig>,
    pipeline: Pipeline,
}

impl JobLauncher {
    pub fn new(config: Arc<BackupConfig>, pipeline: Pipeline) -> Self {
        Self { config, pipeline }
    }

    pub fn launch(&self, task_name: &str) -> std::io::Result<JoinHandle<ExecutionOutcome>> {
        let config = Arc::clone(&self.config);
        let pipeline = self.pipeline.clone();
        let task = task_name.to_string();
        let handle = thread::Builder::new()
            .name(format!("backup-{}", sanitize_component(task_name)))
            .spawn(move || pipeline.run_task(&config, &task))?;
        tracing::info!(task = %task_name, "backup job launched");
        Ok(handle)
    }
}

fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
