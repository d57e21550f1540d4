//! Application OAuth credentials.
//!
//! The application-credential file is the JSON downloaded from the Google
//! Cloud Console OAuth page. It is consumed only when the interactive flow
//! runs; cached runs never touch it.

use std::path::Path;

use serde::Deserialize;

use crate::error::{GoogleError, GoogleResult};

/// OAuth 2.0 client identity for this application.
#[derive(Debug, Clone)]
pub struct AppCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

/// On-disk shape of the Google credentials JSON.
///
/// Google nests desktop-application credentials under `installed` and web
/// credentials under `web`; some tooling writes the fields at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<NestedCredentials>,
    web: Option<NestedCredentials>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl AppCredentials {
    /// Creates credentials from a known client ID and secret.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from an application-credential JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> GoogleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GoogleError::configuration(format!(
                "failed to read credentials file {:?}: {}",
                path, e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from the JSON content of the file.
    pub fn from_json(json: &str) -> GoogleResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            GoogleError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(nested) = file.installed.or(file.web) {
            return Ok(Self::new(nested.client_id, nested.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(GoogleError::configuration(
            "credentials file needs an 'installed'/'web' section or root-level client_id/client_secret",
        ))
    }

    /// Sanity-checks the credential shape.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}
