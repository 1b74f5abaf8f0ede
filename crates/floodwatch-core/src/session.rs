//! Session lifecycle management
//!
//! The signed-in user is persisted as a small JSON document with a fixed
//! expiry. All access goes through [`SessionStore`]; nothing else touches
//! the session file.

use crate::{Result, config::SessionConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Role of the signed-in user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Can resolve incidents
    Admin,
    /// Can view the dashboard and file reports
    User,
}

/// The signed-in user, as consumed by the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Display/login name
    pub username: String,

    /// Role controlling resolution access
    pub role: UserRole,
}

impl User {
    /// Whether this user may resolve incidents
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// A persisted session with a fixed expiry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// The signed-in user
    pub user: User,

    /// Instant after which the session is invalid
    pub expiry: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry
    }
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    duration: chrono::Duration,
}

impl SessionStore {
    /// Create a store from configuration
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            path: config.session_file.clone(),
            duration: chrono::Duration::seconds(
                i64::try_from(config.session_duration_seconds).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Load the persisted session, if any
    ///
    /// A missing file yields `None`. A corrupt file is an error; expiry is
    /// not checked here (see [`Self::load_valid`]).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Session`] if the file exists but cannot be
    /// read or parsed.
    pub fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| crate::Error::session(format!("failed to read session file: {e}")))?;
        let session = serde_json::from_str(&data)
            .map_err(|e| crate::Error::session(format!("failed to parse session file: {e}")))?;
        Ok(Some(session))
    }

    /// Load the persisted session, clearing it when expired
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Session`] if the file cannot be read,
    /// parsed, or removed.
    pub fn load_valid(&self, now: DateTime<Utc>) -> Result<Option<Session>> {
        match self.load()? {
            Some(session) if session.is_expired(now) => {
                tracing::info!(username = %session.user.username, "session expired, clearing");
                self.clear()?;
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Persist a new session for `user`, expiring after the configured
    /// duration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Session`] if the file cannot be written.
    pub fn save(&self, user: User, now: DateTime<Utc>) -> Result<Session> {
        let session = Session {
            user,
            expiry: now + self.duration,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = serde_json::to_string_pretty(&session)?;
        std::fs::write(&self.path, data)
            .map_err(|e| crate::Error::session(format!("failed to write session file: {e}")))?;

        Ok(session)
    }

    /// Remove any persisted session; missing file is a no-op
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Session`] if the file exists but cannot be
    /// removed.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .map_err(|e| crate::Error::session(format!("failed to clear session: {e}")))?;
        }
        Ok(())
    }
}
