//! Gmail minutes delivery.
//!
//! The minutes email is one RFC 822-style message - `To`, `Content-type`,
//! `MIME-Version`, `Subject`, a blank line, then the HTML body -
//! base64url-encoded into the `users/me/messages/send` endpoint. No
//! delivery confirmation is surfaced beyond the API acknowledgment.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use meetminutes_core::Meeting;

use crate::auth::GoogleAuth;
use crate::error::{GoogleError, GoogleResult, status_error, transport_error};

/// Base URL for the Gmail REST API v1.
const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// A composed minutes email, ready to encode and send.
#[derive(Debug, Clone)]
pub struct MinutesEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line, `[MINUTES] <meeting name> <date>`.
    pub subject: String,
    /// Rendered HTML body.
    pub html_body: String,
}

impl MinutesEmail {
    /// Composes the minutes email for one meeting occurrence.
    ///
    /// The recipient defaults to the meeting's configured address when no
    /// override is given.
    pub fn compose(
        meeting: &Meeting,
        recipient_override: Option<&str>,
        date: NaiveDate,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: recipient_override.unwrap_or(&meeting.email).to_string(),
            subject: format!("[MINUTES] {} {}", meeting.name, date.format("%Y-%m-%d")),
            html_body: html_body.into(),
        }
    }

    /// Renders the raw RFC 822-style message.
    pub fn to_raw(&self) -> String {
        format!(
            "To: {}\r\nContent-type: text/html;charset=iso-8859-1\r\nMIME-Version: 1.0\r\nSubject: {}\r\n\r\n{}",
            self.to, self.subject, self.html_body
        )
    }

    /// Encodes the raw message the way the send endpoint expects it.
    pub fn to_encoded(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.to_raw())
    }
}

#[derive(Debug, Serialize)]
struct SendRequest {
    raw: String,
}

/// Client for sending mail as the authorized user.
#[derive(Debug)]
pub struct GmailClient {
    http: reqwest::Client,
    auth: GoogleAuth,
    base_url: String,
}

impl GmailClient {
    /// Creates a client using the production endpoint.
    pub fn new(auth: GoogleAuth) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: GMAIL_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends a composed message.
    pub async fn send(&self, email: &MinutesEmail) -> GoogleResult<()> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/users/me/messages/send", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&SendRequest {
                raw: email.to_encoded(),
            })
            .send()
            .await
            .map_err(|e| transport_error("gmail", e))?;
        if !response.status().is_success() {
            return Err(status_error("gmail", response).await);
        }

        // Drain the acknowledgment; its content is not surfaced.
        response.text().await.map_err(|e| {
            GoogleError::network(format!("failed to read send response: {}", e))
                .with_service("gmail")
        })?;

        info!("sent minutes email '{}' to {}", email.subject, email.to);
        Ok(())
    }
}
