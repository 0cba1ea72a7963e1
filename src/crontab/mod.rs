use crate::config::BackupConfig;

pub mod cron;

pub use cron::validate_cron_expression;

pub const DEFAULT_COMMAND: &str = "/usr/local/bin/backupbot";
pub const CRON_USER: &str = "root";
const OUTPUT_REDIRECT: &str = ">> /proc/1/fd/1 2>> /proc/1/fd/2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronEntry {
    pub schedule: String,
    pub task_name: String,
}

impl CronEntry {
    pub fn render(&self, command: &str) -> String {
        format!(
            "{} {CRON_USER} {command} {} {OUTPUT_REDIRECT}",
            self.schedule, self.task_name
        )
    }
}

/// Task names land unquoted in a shell command line, and cron turns `%` into
/// a newline, so only a conservative character set is accepted.
fn is_cron_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

pub fn cron_entries(config: &BackupConfig) -> Result<Vec<CronEntry>, String> {
    config
        .tasks
        .iter()
        .map(|task| {
            if !is_cron_safe_name(&task.name) {
                return Err(format!(
                    "task `{}`: name must use only letters, digits, `-`, `_` or `.` to be scheduled",
                    task.name
                ));
            }
            let schedule = task.effective_schedule(&config.globals);
            validate_cron_expression(schedule)
                .map_err(|err| format!("task `{}`: {err}", task.name))?;
            Ok(CronEntry {
                schedule: schedule.trim().to_string(),
                task_name: task.name.clone(),
            })
        })
        .collect()
}

/// Renders a `/etc/cron.d` table with one line per task. Empty when no tasks
/// are configured.
pub fn render_crontab(config: &BackupConfig, command: &str) -> Result<String, String> {
    let entries = cron_entries(config)?;
    if entries.is_empty() {
        return Ok(String::new());
    }
    let mut out = entries
        .iter()
        .map(|entry| entry.render(command))
        .collect::<Vec<_>>()
        .join("\n");
    out.push('\n');
    Ok(out)
}
