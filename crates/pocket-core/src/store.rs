// ============================================================================
// File Store — credentials cache and article dump
// ============================================================================
// Whole-file reads and writes. The credentials file is plain pretty-printed
// JSON in the working directory unless configured otherwise.
// ============================================================================

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{Credentials, PocketError};

pub fn read_to_string(path: &Path) -> Result<String, PocketError> {
    std::fs::read_to_string(path).map_err(|e| PocketError::io(path, e))
}

pub fn write(path: &Path, content: &str) -> Result<(), PocketError> {
    std::fs::write(path, content).map_err(|e| PocketError::io(path, e))?;
    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Cached access token on disk
pub struct CredentialsStore {
    path: PathBuf,
}

impl CredentialsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<Credentials, PocketError> {
        let content = read_to_string(&self.path)?;
        serde_json::from_str(&content).map_err(|e| PocketError::Decode {
            context: self.path.display().to_string(),
            source: e,
        })
    }

    pub fn save(&self, credentials: &Credentials) -> Result<(), PocketError> {
        let content = serde_json::to_string_pretty(credentials).map_err(|e| {
            PocketError::Encode {
                context: "credentials".to_string(),
                source: e,
            }
        })?;
        write(&self.path, &content)
    }
}
