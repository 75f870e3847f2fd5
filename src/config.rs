//! Centralized configuration management for account-search

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// How record responses are applied when several fetches overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrdering {
    /// Apply every response as it arrives; the last response to complete wins
    #[default]
    CompletionOrder,
    /// Discard responses that belong to a request older than the newest one issued
    LatestRequest,
}

impl FetchOrdering {
    pub fn as_str(&self) -> &str {
        match self {
            FetchOrdering::CompletionOrder => "completion",
            FetchOrdering::LatestRequest => "latest",
        }
    }
}

impl FromStr for FetchOrdering {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "completion" | "completion-order" => Ok(FetchOrdering::CompletionOrder),
            "latest" | "latest-request" => Ok(FetchOrdering::LatestRequest),
            other => Err(anyhow::anyhow!(
                "Unsupported fetch ordering: {}. Supported values: completion, latest",
                other
            )),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the SQLite database file holding accounts
    pub database_path: PathBuf,
    /// Log file written by the CLI and TUI
    pub log_file: PathBuf,
    /// Controller behaviour
    pub controller: ControllerSettings,
}

/// Settings consumed by the search controller
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub fetch_ordering: FetchOrdering,
    /// Number of past notifications kept for display
    pub toast_history: usize,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            fetch_ordering: FetchOrdering::CompletionOrder,
            toast_history: 20,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let database_path = std::env::var("ACCOUNT_SEARCH_DB_PATH")
            .unwrap_or_else(|_| "./accounts.db".to_string())
            .into();

        let log_file = std::env::var("ACCOUNT_SEARCH_LOG_FILE")
            .unwrap_or_else(|_| "./account-search.log".to_string())
            .into();

        let controller = ControllerSettings {
            fetch_ordering: parse_env_var("ACCOUNT_SEARCH_FETCH_ORDERING")?
                .unwrap_or_default(),
            toast_history: parse_env_var("ACCOUNT_SEARCH_TOAST_HISTORY")?.unwrap_or(20),
        };

        Ok(Config {
            database_path,
            log_file,
            controller,
        })
    }

    /// Get database path as string
    pub fn database_path_str(&self) -> &str {
        self.database_path.to_str().unwrap_or("./accounts.db")
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(anyhow::anyhow!(
                    "Database parent directory does not exist: {}",
                    parent.display()
                ));
            }
        }

        if self.controller.toast_history == 0 {
            return Err(anyhow::anyhow!("ACCOUNT_SEARCH_TOAST_HISTORY must be at least 1"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var_name) {
        Ok(val) => val
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| {
                format!("Failed to parse environment variable {} = '{}'", var_name, val)
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.database_path_str(), "./accounts.db");
        assert_eq!(config.controller.fetch_ordering, FetchOrdering::CompletionOrder);
        assert_eq!(config.controller.toast_history, 20);
    }

    #[test]
    fn test_config_validation() {
        let config = Config::from_env().unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_fetch_ordering_parsing() {
        assert_eq!("latest".parse::<FetchOrdering>().unwrap(), FetchOrdering::LatestRequest);
        assert_eq!("Completion".parse::<FetchOrdering>().unwrap(), FetchOrdering::CompletionOrder);
        assert!("newest".parse::<FetchOrdering>().is_err());
    }

    #[test]
    fn test_zero_toast_history_rejected() {
        let mut config = Config::from_env().unwrap();
        config.controller.toast_history = 0;
        assert!(config.validate().is_err());
    }
}
