use crate::bot::{BotRuntime, Frontend, JobLauncher};
use crate::channels::telegram::{resolve_credentials, TelegramApiClient, TelegramError};
use crate::config::{BackupConfig, ConfigError};
use crate::notify::{NotificationSink, TelegramNotifier};
use crate::pipeline::{ExecutionOutcome, Pipeline, PipelineTools};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod cli;
pub mod logging;

pub use cli::{parse_cli_args, usage, CliMode};
pub use logging::init_logging;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("bot startup failed: {0}")]
    Telegram(#[from] TelegramError),
}

/// CLI mode: config and task lookup errors abort before any pipeline step;
/// pipeline failures are reported via notification, not via the result.
pub fn run_task_once(
    config_path: &Path,
    task_name: &str,
    tools: PipelineTools,
) -> Result<ExecutionOutcome, AppError> {
    let config = BackupConfig::load(config_path)?;
    config.find_task(task_name)?;

    let notifier: Arc<dyn NotificationSink> =
        Arc::new(TelegramNotifier::from_config(&config.telegram));
    let pipeline = Pipeline::new(tools, notifier);
    Ok(pipeline.run_task(&config, task_name))
}

/// Bot mode: token and chat id are mandatory. Runs until `stop` is set.
pub fn run_bot(
    config_path: &Path,
    tools: PipelineTools,
    stop: &AtomicBool,
) -> Result<(), AppError> {
    let config = BackupConfig::load(config_path)?;
    let credentials = resolve_credentials(&config.telegram)?;
    let config = Arc::new(config);

    let api = TelegramApiClient::new(credentials.token);
    let notifier: Arc<dyn NotificationSink> =
        Arc::new(TelegramNotifier::new(api.clone(), credentials.chat_id));
    let launcher = JobLauncher::new(Arc::clone(&config), Pipeline::new(tools, notifier));
    let frontend = Frontend::new(Arc::clone(&config), credentials.chat_id);

    tracing::info!(tasks = config.tasks.len(), "starting backup bot");
    BotRuntime::new(api, frontend, launcher).run_until_stop(stop);
    Ok(())
}
