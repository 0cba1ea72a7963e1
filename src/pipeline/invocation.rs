use super::PipelineTools;
use crate::command::CommandSpec;
use std::path::Path;

pub const UPLOAD_TIMEOUT: &str = "1h";
pub const MULTI_THREAD_CUTOFF: &str = "256M";
pub const MULTI_THREAD_CHUNK_SIZE: &str = "128M";
pub const MULTI_THREAD_STREAMS: &str = "4";

pub fn build_archive_command(
    tools: &PipelineTools,
    archive: &Path,
    source: &Path,
) -> CommandSpec {
    CommandSpec::new(&tools.archiver).args([
        "-r".to_string(),
        archive.display().to_string(),
        source.display().to_string(),
    ])
}

pub fn build_upload_command(
    tools: &PipelineTools,
    archive: &Path,
    remote_target: &str,
) -> CommandSpec {
    CommandSpec::new(&tools.sync)
        .arg("-v")
        .arg("--config")
        .arg(tools.rclone_config.display().to_string())
        .args(["--timeout", UPLOAD_TIMEOUT])
        .args(["--multi-thread-cutoff", MULTI_THREAD_CUTOFF])
        .args(["--multi-thread-chunk-size", MULTI_THREAD_CHUNK_SIZE])
        .args(["--multi-thread-streams", MULTI_THREAD_STREAMS])
        .arg("copy")
        .arg(archive.display().to_string())
        .arg(remote_target)
}

pub fn build_prune_command(
    tools: &PipelineTools,
    remote_target: &str,
    retention_days: u32,
) -> CommandSpec {
    CommandSpec::new(&tools.sync)
        .arg("--config")
        .arg(tools.rclone_config.display().to_string())
        .arg("delete")
        .arg(remote_target)
        .arg("--min-age")
        .arg(format!("{retention_days}d"))
}
