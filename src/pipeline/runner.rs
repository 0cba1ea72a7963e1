use super::{
    archive_name, build_archive_command, build_prune_command, build_upload_command,
    ExecutionOutcome, PipelineError, PipelineTools, StagedArchive,
};
use crate::command::run_command;
use crate::config::BackupConfig;
use crate::notify::{failure_message, success_message, NotificationSink};
use chrono::Local;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Runs resolve, validate, archive, upload, retention, notify and cleanup for
/// one task. Shared between CLI runs and bot-launched jobs.
#[derive(Clone)]
pub struct Pipeline {
    tools: PipelineTools,
    notifier: Arc<dyn NotificationSink>,
}

impl Pipeline {
    pub fn new(tools: PipelineTools, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { tools, notifier }
    }

    pub fn tools(&self) -> &PipelineTools {
        &self.tools
    }

    /// Never fails and never unwinds: every error, including a panic inside a
    /// step, lands in the returned outcome and the failure notification.
    pub fn run_task(&self, config: &BackupConfig, task_name: &str) -> ExecutionOutcome {
        let span = tracing::info_span!("backup", task = %task_name);
        let _entered = span.enter();

        let mut staged = StagedArchive::default();
        let result = contain_panic(|| self.execute(config, task_name, &mut staged))
            .unwrap_or_else(|message| Err(PipelineError::Panicked(message)));

        let outcome = ExecutionOutcome::from_result(
            task_name,
            staged.name().map(str::to_string),
            result,
        );
        if let Err(message) = contain_panic(|| self.report(&outcome)) {
            tracing::error!(panic = %message, "notification sink panicked");
        }
        staged.cleanup();
        outcome
    }

    fn execute(
        &self,
        config: &BackupConfig,
        task_name: &str,
        staged: &mut StagedArchive,
    ) -> Result<(), PipelineError> {
        let task = config
            .find_task(task_name)
            .map_err(|_| PipelineError::TaskNotFound {
                name: task_name.to_string(),
            })?;

        if !task.source.is_dir() {
            return Err(PipelineError::SourceMissing {
                path: task.source.display().to_string(),
            });
        }

        let name = archive_name(&task.archive_prefix, Local::now().naive_local());
        let archive_path = staged.stage(&self.tools.temp_dir, &name);

        tracing::info!(
            source = %task.source.display(),
            archive = %archive_path.display(),
            "creating archive"
        );
        run_command(&build_archive_command(
            &self.tools,
            &archive_path,
            &task.source,
        ))?;

        let target = config.globals.remote_target(&task.name);
        tracing::info!(archive = %name, remote = %target, "uploading archive");
        run_command(&build_upload_command(&self.tools, &archive_path, &target))?;

        let retention_days = task.effective_retention_days(&config.globals);
        if retention_days > 0 {
            tracing::info!(remote = %target, retention_days, "pruning remote archives");
            run_command(&build_prune_command(&self.tools, &target, retention_days))?;
        }
        Ok(())
    }

    fn report(&self, outcome: &ExecutionOutcome) {
        let message = match &outcome.failure_reason {
            None => {
                let archive = outcome.archive_name.as_deref().unwrap_or_default();
                tracing::info!(archive = %archive, "backup succeeded");
                success_message(&outcome.task_name, archive)
            }
            Some(reason) => {
                tracing::error!(reason = %reason, "backup failed");
                failure_message(&outcome.task_name, reason)
            }
        };
        self.notifier.notify(&message);
    }
}

fn contain_panic<T>(step: impl FnOnce() -> T) -> Result<T, String> {
    panic::catch_unwind(AssertUnwindSafe(step))
        .map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return text.clone();
    }
    "unknown panic".to_string()
}
