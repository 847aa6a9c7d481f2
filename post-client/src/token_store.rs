use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::BlogClientResult;

/// How long a stored token stays usable on the client side.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct StoredToken {
    token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
/// Persists the bearer token as `{token, expires_at}` JSON in a single file.
///
/// An expired, blank or unreadable file is treated as "no token".
pub struct TokenStore {
    path: PathBuf,
    ttl: Duration,
}

impl TokenStore {
    /// Store with the default 7-day expiry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_ttl(path, Duration::days(TOKEN_TTL_DAYS))
    }

    /// Store with a custom expiry.
    pub fn with_ttl(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `token`, replacing any previous one, and returns its expiry.
    pub fn save(&self, token: &str) -> BlogClientResult<DateTime<Utc>> {
        let stored = StoredToken {
            token: token.to_string(),
            expires_at: Utc::now() + self.ttl,
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(std::io::Error::other)?;
        fs::write(&self.path, json)?;
        Ok(stored.expires_at)
    }

    /// Returns the stored token unless it is missing or expired.
    pub fn load(&self) -> BlogClientResult<Option<String>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let stored = match serde_json::from_slice::<StoredToken>(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "ignoring unreadable token file");
                return Ok(None);
            }
        };

        if stored.expires_at <= Utc::now() {
            debug!(path = %self.path.display(), "stored token expired");
            self.clear()?;
            return Ok(None);
        }

        let token = stored.token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    /// Removes the token file; a missing file is not an error.
    pub fn clear(&self) -> BlogClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
