//! The cached-credential file.
//!
//! A single JSON file in Google's `authorized_user` shape holds the OAuth
//! client identity plus the refresh token obtained from the interactive
//! flow. Reads fail soft: a missing, unreadable, or unparsable file is
//! reported as "no cached credential" so the caller falls back to
//! interactive authorization instead of crashing. Writes fail hard.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GoogleError, GoogleResult};

/// Cached user credentials in Google's `authorized_user` format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// Always `"authorized_user"` for credentials written by this store.
    #[serde(rename = "type")]
    pub kind: String,

    /// The OAuth 2.0 client ID the refresh token was issued against.
    pub client_id: String,

    /// The matching OAuth 2.0 client secret.
    pub client_secret: String,

    /// The long-lived refresh token.
    pub refresh_token: String,
}

impl StoredCredentials {
    /// The credential type this store reads and writes.
    pub const AUTHORIZED_USER: &'static str = "authorized_user";

    /// Creates `authorized_user` credentials.
    pub fn authorized_user(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            kind: Self::AUTHORIZED_USER.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
        }
    }

    /// Returns true if the credentials can actually mint access tokens.
    pub fn is_usable(&self) -> bool {
        self.kind == Self::AUTHORIZED_USER
            && !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
    }
}

/// File-backed store for the single cached credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the credential file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached credentials, if any usable ones exist.
    ///
    /// Every failure mode - absent file, unreadable file, parse error,
    /// wrong credential type, blank refresh token - is reported as `None`.
    pub fn load(&self) -> Option<StoredCredentials> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("no cached credentials at {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str::<StoredCredentials>(&content) {
            Ok(credentials) if credentials.is_usable() => Some(credentials),
            Ok(_) => {
                debug!("cached credentials at {:?} are unusable", self.path);
                None
            }
            Err(e) => {
                debug!("failed to parse cached credentials at {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Saves credentials to disk.
    ///
    /// Unlike [`load`](Self::load) this propagates every failure: losing a
    /// freshly granted token silently would force a pointless
    /// re-authorization on the next run. The write goes through a temp file
    /// and rename, and the file ends up mode 0600 on Unix.
    pub fn save(&self, credentials: &StoredCredentials) -> GoogleResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GoogleError::configuration(format!("failed to create credential directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(credentials)
            .map_err(|e| GoogleError::internal(format!("failed to serialize credentials: {}", e)))?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content).map_err(|e| {
            GoogleError::configuration(format!("failed to write credential file: {}", e))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            GoogleError::configuration(format!("failed to rename credential file: {}", e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved credentials to {:?}", self.path);
        Ok(())
    }
}
