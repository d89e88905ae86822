//! Error types for timetable operations.

use thiserror::Error;

/// Errors that can abort a timetable invocation.
///
/// Only `Fetch` with no cached fallback is expected to reach the user;
/// everything recoverable (stale cache, ambiguous resolution, config and
/// scrape disagreeing) is logged and degraded instead.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Network fetch failed and there was no cached record to fall back to.
    #[error("fetch failed: {message}")]
    Fetch { message: String },

    /// The cache record could not be read or replaced.
    #[error("cache error: {message}")]
    Cache { message: String },

    /// The configuration file could not be read or is invalid.
    #[error("config error: {message}")]
    Config { message: String },

    /// Scraped content did not match the expected portal layout.
    #[error("parse error: {message}")]
    Parse { message: String },
}

impl TimetableError {
    pub fn fetch(message: impl Into<String>) -> Self {
        TimetableError::Fetch {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        TimetableError::Config {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        TimetableError::Parse {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::Fetch {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for TimetableError {
    fn from(err: std::io::Error) -> Self {
        TimetableError::Cache {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::Cache {
            message: err.to_string(),
        }
    }
}
