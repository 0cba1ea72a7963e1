use std::path::PathBuf;

pub mod runner;

pub use runner::run_command;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("command binary not found: {program}")]
    MissingBinary { program: String },
    #[error("command `{program}` failed with exit code {exit_code}:\n{stderr}")]
    NonZeroExit {
        program: String,
        exit_code: i32,
        stderr: String,
    },
    #[error("io error running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// One external process invocation: a program plus its argv tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command_form(&self) -> String {
        if self.args.is_empty() {
            return self.program.clone();
        }
        format!("{} {}", self.program, self.args.join(" "))
    }
}

pub(crate) fn io_error(program: &str, source: std::io::Error) -> CommandError {
    CommandError::Io {
        program: program.to_string(),
        source,
    }
}
