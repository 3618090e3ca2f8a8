//! ============================================================================
//! Core Types for the Pocket Reader
//! ============================================================================
//! Data structures exchanged with the Pocket API and persisted on disk,
//! plus the error taxonomy shared by every orchestration step.
//! ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials
// ============================================================================

/// Access token issued by `/v3/oauth/authorize`.
///
/// Any additional fields returned by the API are kept in `extra` and written
/// back verbatim when the credentials are cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub username: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            username: username.into(),
            extra: serde_json::Map::new(),
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

/// One saved item as returned by `/v3/get` with `detailType=simple`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub given_title: String,
    pub resolved_title: String,
    pub excerpt: String,
    pub given_url: String,
    /// Unix seconds, sent by the API as a decimal string
    pub time_added: String,
}

impl Article {
    /// Title shown in the report: the user-given title unless it is empty.
    pub fn display_title(&self) -> &str {
        display_title(&self.given_title, &self.resolved_title)
    }

    pub fn time_added_secs(&self) -> Result<i64, PocketError> {
        self.time_added.trim().parse::<i64>().map_err(|e| {
            PocketError::Data(format!(
                "invalid time_added '{}': {}",
                self.time_added, e
            ))
        })
    }
}

pub fn display_title<'a>(given_title: &'a str, resolved_title: &'a str) -> &'a str {
    if given_title.is_empty() {
        resolved_title
    } else {
        given_title
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Coarse error category, for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Api,
    Io,
    Data,
    Callback,
}

/// Error types for the Pocket reader
#[derive(Debug, thiserror::Error)]
pub enum PocketError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP POST {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(
        "Request to {path} failed with status: {status} reason: {reason} (X-Error-Code: {}, X-Error: {})",
        .error_code.as_deref().unwrap_or("-"),
        .error_message.as_deref().unwrap_or("-")
    )]
    Api {
        path: String,
        status: u16,
        reason: String,
        error_code: Option<String>,
        error_message: Option<String>,
        body: String,
    },

    #[error("Failed to parse {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected data: {0}")]
    Data(String),

    #[error("Cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot start callback server on {addr}: {reason}")]
    CallbackBind { addr: String, reason: String },

    #[error("Callback server error: {0}")]
    CallbackServer(String),

    #[error("Timed out after {0:?} waiting for the authorization callback")]
    CallbackTimeout(Duration),
}

impl PocketError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PocketError::Config(_) => ErrorKind::Config,
            PocketError::Transport { .. } => ErrorKind::Transport,
            PocketError::Api { .. } => ErrorKind::Api,
            PocketError::Decode { .. } | PocketError::Encode { .. } | PocketError::Data(_) => {
                ErrorKind::Data
            }
            PocketError::Io { .. } => ErrorKind::Io,
            PocketError::CallbackBind { .. }
            | PocketError::CallbackServer(_)
            | PocketError::CallbackTimeout(_) => ErrorKind::Callback,
        }
    }

    /// Failures the tool anticipates (network, API, callback, config) as
    /// opposed to local data and I/O faults.
    pub fn is_handled(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Data | ErrorKind::Io)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PocketError::Io {
            path: path.into(),
            source,
        }
    }
}
