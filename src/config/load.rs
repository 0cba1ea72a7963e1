use super::{default_config_path, BackupConfig, ConfigError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

impl BackupConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ConfigError::NotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Read {
                path: path.display().to_string(),
                source,
            },
        })?;
        Self::from_yaml(&raw, path)
    }

    pub(crate) fn from_yaml(raw: &str, path: &Path) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads, parses and validates the config at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::from_path(path)?;
        config.validate()?;
        Ok(config)
    }
}

pub fn load_default_config() -> Result<BackupConfig, ConfigError> {
    BackupConfig::load(&default_config_path())
}
