use backupbot::app::{
    init_logging, parse_cli_args, run_bot, run_task_once, usage, AppError, CliMode,
};
use backupbot::config::default_config_path;
use backupbot::pipeline::PipelineTools;
use std::sync::atomic::AtomicBool;

fn run() -> Result<(), AppError> {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = default_config_path();

    match parse_cli_args(&args).map_err(AppError::Usage)? {
        CliMode::Help => println!("{}", usage()),
        CliMode::RunTask(task) => {
            let outcome = run_task_once(&config_path, &task, PipelineTools::default())?;
            tracing::info!(
                task = %outcome.task_name,
                succeeded = outcome.succeeded,
                "backup run finished"
            );
        }
        CliMode::Bot => {
            let stop = AtomicBool::new(false);
            run_bot(&config_path, PipelineTools::default(), &stop)?;
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
