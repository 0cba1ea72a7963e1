use super::{io_error, CommandError, CommandSpec};
use std::io::{BufReader, Read};
use std::process::{Command, Stdio};
use std::thread;

/// Runs `spec` to completion and returns its stdout. Both streams are drained
/// on reader threads so a chatty child cannot stall on a full pipe.
pub fn run_command(spec: &CommandSpec) -> Result<String, CommandError> {
    let command_form = spec.command_form();
    tracing::info!(command = %command_form, "running command");

    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &spec.cwd {
        command.current_dir(cwd);
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::error!(command = %command_form, "command binary not found");
            return Err(CommandError::MissingBinary {
                program: spec.program.clone(),
            });
        }
        Err(err) => return Err(io_error(&spec.program, err)),
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io_error(&spec.program, std::io::Error::other("missing stdout pipe")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_error(&spec.program, std::io::Error::other("missing stderr pipe")))?;

    let stdout_reader = thread::spawn(move || drain_stream(stdout, "stdout"));
    let stderr_reader = thread::spawn(move || drain_stream(stderr, "stderr"));

    let exit_status = child.wait().map_err(|e| io_error(&spec.program, e))?;
    let stdout = stdout_reader.join().unwrap_or_default();
    let stderr = stderr_reader.join().unwrap_or_default();

    if !exit_status.success() {
        let exit_code = exit_status.code().unwrap_or(-1);
        tracing::error!(
            command = %command_form,
            exit_code,
            stdout = %stdout.trim_end(),
            stderr = %stderr.trim_end(),
            "command failed"
        );
        return Err(CommandError::NonZeroExit {
            program: spec.program.clone(),
            exit_code,
            stderr,
        });
    }

    tracing::info!(
        command = %command_form,
        stdout = %stdout.trim_end(),
        stderr = %stderr.trim_end(),
        "command finished"
    );
    Ok(stdout)
}

/// Reads a child stream to the end; invalid UTF-8 is replaced, not dropped.
fn drain_stream(stream: impl Read, label: &'static str) -> String {
    let mut buf = Vec::new();
    if let Err(err) = BufReader::new(stream).read_to_end(&mut buf) {
        tracing::warn!(stream = label, error = %err, "failed to read command output");
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::run_command;
    use crate::command::{CommandError, CommandSpec};

    #[test]
    fn captures_stdout_on_success() {
        let spec = CommandSpec::new("sh").args(["-c", "echo hello; echo noise 1>&2"]);
        let out = run_command(&spec).expect("success");
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let spec = CommandSpec::new("sh").args(["-c", "echo 'network unreachable' 1>&2; exit 3"]);
        match run_command(&spec).expect_err("failure") {
            CommandError::NonZeroExit {
                program,
                exit_code,
                stderr,
            } => {
                assert_eq!(program, "sh");
                assert_eq!(exit_code, 3);
                assert_eq!(stderr.trim(), "network unreachable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_utf8_stderr_keeps_readable_text() {
        let spec = CommandSpec::new("sh").args([
            "-c",
            "printf 'network unreachable \\377\\n' 1>&2; exit 1",
        ]);
        match run_command(&spec).expect_err("failure") {
            CommandError::NonZeroExit { stderr, .. } => {
                assert!(stderr.starts_with("network unreachable "), "{stderr:?}");
                assert!(stderr.contains('\u{FFFD}'), "{stderr:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_binary_is_explicit() {
        let spec = CommandSpec::new("/nonexistent/backupbot-test-binary");
        assert!(matches!(
            run_command(&spec),
            Err(CommandError::MissingBinary { .. })
        ));
    }

    #[test]
    fn command_form_joins_argv() {
        let spec = CommandSpec::new("zip").args(["-r", "/tmp/a.zip", "/data"]);
        assert_eq!(spec.command_form(), "zip -r /tmp/a.zip /data");
    }
}
