//! Authorization for the Google services.
//!
//! The [`Authorizer`] turns the cached-credential file into an authorized
//! [`GoogleAuth`] handle, falling back to the interactive browser flow when
//! no usable cache exists. Cached credentials are wrapped directly - no
//! local expiry check - and the handle mints or refreshes its access token
//! lazily on first use. Authorization is a hard prerequisite: when the
//! interactive flow fails, the whole pipeline aborts.

mod credentials;
mod flow;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::GoogleResult;

pub use credentials::AppCredentials;
pub use flow::{InteractiveFlow, TokenGrant};
pub use store::{CredentialStore, StoredCredentials};

/// Read-only access to Meet conference records.
pub const MEET_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/meetings.space.readonly";

/// Read-only access to Meet artifacts stored in Drive.
pub const DRIVE_MEET_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.meet.readonly";

/// Permission to send mail as the authorized user.
pub const GMAIL_SEND_SCOPE: &str = "https://www.googleapis.com/auth/gmail.send";

/// The scope set the archive pipeline needs.
pub fn archive_scopes() -> Vec<String> {
    vec![
        MEET_READONLY_SCOPE.to_string(),
        DRIVE_MEET_READONLY_SCOPE.to_string(),
        GMAIL_SEND_SCOPE.to_string(),
    ]
}

/// Loopback ports tried for the OAuth redirect.
const DEFAULT_PORT_RANGE: (u16, u16) = (8400, 8420);

/// Safety margin subtracted from reported token lifetimes.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Produces authorized handles for a requested scope set.
#[derive(Debug)]
pub struct Authorizer {
    store: CredentialStore,
    credentials_path: PathBuf,
    scopes: Vec<String>,
    port_range: (u16, u16),
    token_url: String,
}

impl Authorizer {
    /// Creates an authorizer over the given credential store and
    /// application-credential file.
    pub fn new(
        store: CredentialStore,
        credentials_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            store,
            credentials_path: credentials_path.into(),
            scopes,
            port_range: DEFAULT_PORT_RANGE,
            token_url: flow::GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Overrides the loopback port range for the interactive flow.
    pub fn with_port_range(mut self, start: u16, end: u16) -> Self {
        self.port_range = (start, end);
        self
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Produces an authorized handle.
    ///
    /// A usable cached credential wraps directly into the handle; otherwise
    /// the interactive flow runs and, on success, the fresh credential is
    /// persisted before the handle is returned.
    pub async fn authorize(&self) -> GoogleResult<GoogleAuth> {
        if let Some(saved) = self.store.load() {
            debug!("using cached credentials from {:?}", self.store.path());
            return Ok(GoogleAuth::from_stored_at(saved, &self.token_url));
        }
        self.authorize_interactive().await
    }

    /// Runs the interactive flow unconditionally, replacing any cache.
    pub async fn authorize_interactive(&self) -> GoogleResult<GoogleAuth> {
        let app = AppCredentials::from_file(&self.credentials_path)?;
        let interactive = InteractiveFlow::new(app.clone()).with_token_url(&self.token_url);
        let grant = interactive.run(&self.scopes, self.port_range).await?;

        let stored =
            StoredCredentials::authorized_user(app.client_id, app.client_secret, grant.refresh_token);
        self.store.save(&stored)?;
        info!("authorization complete, credentials cached at {:?}", self.store.path());

        Ok(GoogleAuth::from_stored_at(stored, &self.token_url))
    }
}

/// A cached access token and when to stop trusting it.
#[derive(Debug, Clone)]
struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

/// How the handle proves who it is.
#[derive(Debug)]
enum Identity {
    /// Mint access tokens from a stored refresh token.
    Refresh(StoredCredentials),
    /// A fixed token, never refreshed. Lets tests and callers with
    /// externally minted tokens bypass the token endpoint.
    Static(String),
}

#[derive(Debug)]
struct AuthInner {
    http: reqwest::Client,
    token_url: String,
    identity: Identity,
    access: RwLock<Option<AccessToken>>,
}

/// An authorized client handle.
///
/// Cheap to clone; every clone shares the same lazily refreshed access
/// token, so one process mints at most one token per expiry window no
/// matter how many service clients hold the handle.
#[derive(Debug, Clone)]
pub struct GoogleAuth {
    inner: Arc<AuthInner>,
}

impl GoogleAuth {
    /// Wraps stored credentials into a handle using Google's token endpoint.
    pub fn from_stored(credentials: StoredCredentials) -> Self {
        Self::from_stored_at(credentials, flow::GOOGLE_TOKEN_URL)
    }

    /// Wraps stored credentials with an explicit token endpoint.
    pub fn from_stored_at(credentials: StoredCredentials, token_url: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                http: reqwest::Client::new(),
                token_url: token_url.into(),
                identity: Identity::Refresh(credentials),
                access: RwLock::new(None),
            }),
        }
    }

    /// Creates a handle around a fixed access token.
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                http: reqwest::Client::new(),
                token_url: flow::GOOGLE_TOKEN_URL.to_string(),
                identity: Identity::Static(token.into()),
                access: RwLock::new(None),
            }),
        }
    }

    /// Returns a currently valid access token, refreshing if needed.
    pub async fn access_token(&self) -> GoogleResult<String> {
        let credentials = match &self.inner.identity {
            Identity::Static(token) => return Ok(token.clone()),
            Identity::Refresh(credentials) => credentials,
        };

        {
            let cached = self.inner.access.read().await;
            if let Some(token) = cached.as_ref()
                && Utc::now() < token.expires_at
            {
                return Ok(token.secret.clone());
            }
        }

        let mut cached = self.inner.access.write().await;
        // Another clone may have refreshed while we waited for the lock.
        if let Some(token) = cached.as_ref()
            && Utc::now() < token.expires_at
        {
            return Ok(token.secret.clone());
        }

        let (secret, expires_in) = flow::refresh_access_token(
            &self.inner.http,
            &self.inner.token_url,
            &credentials.client_id,
            &credentials.client_secret,
            &credentials.refresh_token,
        )
        .await?;

        let lifetime = expires_in.unwrap_or(3600) - EXPIRY_MARGIN_SECS;
        *cached = Some(AccessToken {
            secret: secret.clone(),
            expires_at: Utc::now() + Duration::seconds(lifetime.max(0)),
        });

        Ok(secret)
    }
}
