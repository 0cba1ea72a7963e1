use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

pub fn archive_name(prefix: &str, at: NaiveDateTime) -> String {
    format!("{prefix}_{}.zip", at.format(ARCHIVE_TIMESTAMP_FORMAT))
}

/// Local temporary archive for one run. The file is removed on `cleanup` or,
/// failing that, on drop, so unwinding out of a step still clears it.
#[derive(Debug, Default)]
pub struct StagedArchive {
    name: Option<String>,
    path: Option<PathBuf>,
}

impl StagedArchive {
    pub fn stage(&mut self, temp_dir: &Path, name: &str) -> PathBuf {
        let path = temp_dir.join(name);
        self.name = Some(name.to_string());
        self.path = Some(path.clone());
        path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn cleanup(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        if !path.exists() {
            return;
        }
        match fs::remove_file(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "temporary archive removed"),
            Err(err) => tracing::warn!(
                path = %path.display(),
                error = %err,
                "failed to remove temporary archive"
            ),
        }
    }
}

impl Drop for StagedArchive {
    fn drop(&mut self) {
        self.cleanup();
    }
}
