//! Command handlers -- one module per subcommand

pub mod config;
pub mod detectors;
pub mod scan;

use std::path::{Path, PathBuf};

use bomdetect_core::config::BomDetectConfig;

use crate::cli::DEFAULT_CONFIG_PATH;
use crate::error::CliError;

/// Where the configuration comes from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: PathBuf,
    explicit: bool,
}

impl ConfigSource {
    /// Resolve the `--config` flag. Without it, `bomdetect.toml` is optional.
    pub fn from_flag(flag: Option<PathBuf>) -> Self {
        match flag {
            Some(path) => Self {
                path,
                explicit: true,
            },
            None => Self {
                path: PathBuf::from(DEFAULT_CONFIG_PATH),
                explicit: false,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the effective configuration (file + env overrides + defaults).
    ///
    /// An explicitly named file must exist; the default file may be absent.
    pub async fn load(&self) -> Result<BomDetectConfig, CliError> {
        let config = if self.explicit {
            BomDetectConfig::load(&self.path).await?
        } else {
            BomDetectConfig::load_or_default(&self.path).await?
        };
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_source_defaults_to_optional_file() {
        let source = ConfigSource::from_flag(None);
        assert_eq!(source.path(), Path::new(DEFAULT_CONFIG_PATH));
        assert!(!source.explicit);
    }

    #[tokio::test]
    async fn test_explicit_missing_file_is_config_error() {
        let source = ConfigSource::from_flag(Some(PathBuf::from("/nonexistent/bomdetect.toml")));
        let err = source.load().await.expect_err("missing explicit file should fail");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_implicit_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let source = ConfigSource {
            path: dir.path().join("bomdetect.toml"),
            explicit: false,
        };
        let config = source.load().await.expect("defaults should load");
        assert_eq!(config.general.log_level, "info");
    }
}
