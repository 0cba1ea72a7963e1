use backupbot::app::init_logging;
use backupbot::config::{default_config_path, BackupConfig, ConfigError};
use backupbot::crontab::{render_crontab, DEFAULT_COMMAND};

fn run() -> Result<String, String> {
    init_logging();
    let command = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
    let config = match BackupConfig::load(&default_config_path()) {
        Ok(config) => config,
        Err(ConfigError::NotFound { path }) => {
            tracing::warn!(path = %path, "config not found; emitting empty cron table");
            return Ok(String::new());
        }
        Err(err) => return Err(err.to_string()),
    };
    render_crontab(&config, &command)
}

fn main() {
    match run() {
        Ok(table) => print!("{table}"),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
