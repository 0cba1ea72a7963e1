#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliMode {
    Bot,
    RunTask(String),
    Help,
}

pub fn parse_cli_args(args: &[String]) -> Result<CliMode, String> {
    match args {
        [] => Ok(CliMode::Bot),
        [flag] if flag == "-h" || flag == "--help" => Ok(CliMode::Help),
        [task] => Ok(CliMode::RunTask(task.clone())),
        _ => Err(usage()),
    }
}

pub fn usage() -> String {
    [
        "Usage:",
        "  backupbot               Start the Telegram bot (long polling)",
        "  backupbot <task_name>   Run one backup task and exit",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{parse_cli_args, CliMode};

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn no_arguments_starts_bot() {
        assert_eq!(parse_cli_args(&[]), Ok(CliMode::Bot));
    }

    #[test]
    fn single_argument_names_task() {
        assert_eq!(
            parse_cli_args(&args(&["docs"])),
            Ok(CliMode::RunTask("docs".to_string()))
        );
        assert_eq!(parse_cli_args(&args(&["--help"])), Ok(CliMode::Help));
    }

    #[test]
    fn extra_arguments_are_usage_errors() {
        let err = parse_cli_args(&args(&["docs", "photos"])).expect_err("usage");
        assert!(err.starts_with("Usage:"));
    }
}
