use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "/config/config.yml";
pub const RCLONE_CONFIG_PATH: &str = "/config/rclone/rclone.conf";
pub const CONFIG_PATH_ENV: &str = "BACKUPBOT_CONFIG";

pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
