//! Google service plumbing for the meeting archiver.
//!
//! This crate wraps the four external services the archive pipeline talks
//! to, all behind one authorized handle:
//!
//! - [`auth`] - credential store, interactive OAuth, and the [`GoogleAuth`]
//!   handle with lazy access-token refresh
//! - [`meet`] - locating conference records, recordings, and transcripts
//! - [`drive`] - streaming recording downloads and transcript exports
//! - [`gemini`] - Markdown meeting summaries (API key, not OAuth)
//! - [`gmail`] - sending the minutes email
//!
//! # Example
//!
//! ```ignore
//! use meetminutes_google::{archive_scopes, Authorizer, CredentialStore, MeetClient};
//!
//! let authorizer = Authorizer::new(
//!     CredentialStore::new("token.json"),
//!     "credentials.json",
//!     archive_scopes(),
//! );
//! let auth = authorizer.authorize().await?;
//! let records = MeetClient::new(auth.clone()).locate("zyf-jnvc-qac", window).await?;
//! ```

pub mod auth;
pub mod drive;
pub mod error;
pub mod gemini;
pub mod gmail;
pub mod meet;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{
    AppCredentials, Authorizer, CredentialStore, GoogleAuth, StoredCredentials, archive_scopes,
};
pub use drive::{DriveClient, MARKDOWN_EXPORT, PLAIN_TEXT_EXPORT};
pub use error::{GoogleError, GoogleErrorCode, GoogleResult};
pub use gemini::GeminiClient;
pub use gmail::{GmailClient, MinutesEmail};
pub use meet::{ConferenceRecord, MeetClient, MeetingRecords, Recording, Transcript};
