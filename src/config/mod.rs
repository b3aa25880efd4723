//! Board configuration loading and management

use crate::core::error::{BoardResult, ConfigError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters of the board's synchronization behavior.
///
/// Defaults match the production board: a 30 second authoritative refresh,
/// a 10 second bound on confirmation requests, and two contradicting
/// refreshes before a pending transition is considered stuck.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardConfig {
    /// Seconds between authoritative full refreshes
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Upper bound on a status-update confirmation request, in seconds.
    /// A request still in flight past this bound is treated as failed and
    /// the optimistic move is reverted.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    /// How many consecutive refreshes may contradict a pending transition
    /// before it is force-resolved to the authoritative status
    #[serde(default = "default_max_stale_refreshes")]
    pub max_stale_refreshes: u8,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_confirmation_timeout_secs() -> u64 {
    10
}

fn default_max_stale_refreshes() -> u8 {
    2
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            max_stale_refreshes: default_max_stale_refreshes(),
        }
    }
}

impl BoardConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> BoardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_string(),
                }
            } else {
                ConfigError::IoError {
                    message: e.to_string(),
                }
            }
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> BoardResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in its accepted range
    pub fn validate(&self) -> BoardResult<()> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll_interval_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "confirmation_timeout_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.max_stale_refreshes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_stale_refreshes".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Refresh period as a `Duration`
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Confirmation bound as a `Duration`
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::BoardError;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BoardConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_stale_refreshes, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_str_with_partial_fields() {
        let config = BoardConfig::from_yaml_str("poll_interval_secs: 15\n").unwrap();
        assert_eq!(config.poll_interval_secs, 15);
        // Unspecified fields fall back to defaults
        assert_eq!(config.confirmation_timeout_secs, 10);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = BoardConfig::from_yaml_str("poll_interval_secs: 0\n").unwrap_err();
        assert!(matches!(
            err,
            BoardError::Config(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_from_yaml_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs: 20").unwrap();
        writeln!(file, "confirmation_timeout_secs: 5").unwrap();
        writeln!(file, "max_stale_refreshes: 3").unwrap();

        let config = BoardConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.poll_interval_secs, 20);
        assert_eq!(config.confirmation_timeout_secs, 5);
        assert_eq!(config.max_stale_refreshes, 3);
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = BoardConfig::from_yaml_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(
            err,
            BoardError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_yaml_is_reported_with_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs: [not a number").unwrap();

        let err = BoardConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap_err();
        match err {
            BoardError::Config(ConfigError::ParseError { file, .. }) => {
                assert!(file.is_some());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
