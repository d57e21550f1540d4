//! Interactive OAuth 2.0 authorization.
//!
//! Desktop-application Authorization Code flow with PKCE (RFC 7636) over a
//! loopback redirect: generate a code verifier and its SHA-256 challenge,
//! bind a localhost callback server, send the user's browser to Google's
//! consent page, exchange the returned code (plus verifier) for tokens.
//! `access_type=offline` and `prompt=consent` make Google issue the refresh
//! token the credential store persists.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{GoogleError, GoogleResult};

use super::credentials::AppCredentials;

/// Google's authorization endpoint.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's token endpoint.
pub(crate) const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// How long to wait for the user to finish in the browser.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Raw bytes of entropy in the PKCE code verifier.
const VERIFIER_BYTES: usize = 32;

/// Tokens granted by a completed interactive flow.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// Short-lived access token, usable immediately.
    pub access_token: String,
    /// Long-lived refresh token for the credential store.
    pub refresh_token: String,
    /// Access token lifetime in seconds, when reported.
    pub expires_in: Option<i64>,
}

/// The interactive authorization flow.
#[derive(Debug)]
pub struct InteractiveFlow {
    credentials: AppCredentials,
    http: reqwest::Client,
    auth_url: String,
    token_url: String,
}

impl InteractiveFlow {
    /// Creates a flow for the given application credentials.
    pub fn new(credentials: AppCredentials) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Overrides the token endpoint.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Runs the flow to completion and returns the granted tokens.
    ///
    /// # Errors
    ///
    /// Fails if no loopback port can be bound, the user denies consent, the
    /// callback never arrives, the returned state does not match, Google
    /// declines the code exchange, or no refresh token is granted.
    pub async fn run(&self, scopes: &[String], port_range: (u16, u16)) -> GoogleResult<TokenGrant> {
        let verifier = random_urlsafe(VERIFIER_BYTES);
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        let state = random_urlsafe(16);

        let (listener, port) = bind_loopback(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/oauth2/callback", port);
        let consent_url = self.consent_url(&redirect_uri, scopes, &challenge, &state);

        info!("starting interactive authorization, opening browser");
        debug!("consent URL: {}", consent_url);

        if let Err(e) = open::that(&consent_url) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser to authorize:\n\n{}\n", consent_url);
        }

        let (code, returned_state) = wait_for_callback(listener)?;
        if returned_state != state {
            return Err(GoogleError::authentication("OAuth state mismatch").with_service("oauth"));
        }

        info!("authorization code received, exchanging for tokens");
        self.exchange_code(&code, &verifier, &redirect_uri).await
    }

    /// Builds the consent-page URL.
    fn consent_url(
        &self,
        redirect_uri: &str,
        scopes: &[String],
        challenge: &str,
        state: &str,
    ) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.credentials.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scopes.join(" ")),
            urlencoding::encode(challenge),
            urlencoding::encode(state),
        )
    }

    /// Exchanges an authorization code for tokens.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> GoogleResult<TokenGrant> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = request_token(&self.http, &self.token_url, &params, "token exchange").await?;

        let refresh_token = response.refresh_token.ok_or_else(|| {
            GoogleError::authentication("no refresh token granted; revoke access and retry")
                .with_service("oauth")
        })?;

        info!("tokens obtained");
        Ok(TokenGrant {
            access_token: response.access_token,
            refresh_token,
            expires_in: response.expires_in,
        })
    }
}

/// Mints a fresh access token from a refresh token.
pub(crate) async fn refresh_access_token(
    http: &reqwest::Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> GoogleResult<(String, Option<i64>)> {
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let response = request_token(http, token_url, &params, "token refresh").await?;
    debug!("access token refreshed");
    Ok((response.access_token, response.expires_in))
}

/// POSTs a form to the token endpoint and parses the response.
async fn request_token(
    http: &reqwest::Client,
    token_url: &str,
    params: &[(&str, &str)],
    what: &str,
) -> GoogleResult<TokenResponse> {
    let response = http
        .post(token_url)
        .form(params)
        .send()
        .await
        .map_err(|e| {
            GoogleError::network(format!("{} request failed: {}", what, e)).with_service("oauth")
        })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        GoogleError::network(format!("failed to read {} response: {}", what, e))
            .with_service("oauth")
    })?;

    if !status.is_success() {
        return Err(GoogleError::authentication(format!(
            "{} failed ({}): {}",
            what, status, body
        ))
        .with_service("oauth"));
    }

    serde_json::from_str(&body).map_err(|e| {
        GoogleError::invalid_response(format!("invalid {} response: {}", what, e))
            .with_service("oauth")
    })
}

/// Response from Google's token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Generates a random base64url string from `bytes` bytes of entropy.
fn random_urlsafe(bytes: usize) -> String {
    let mut rng = rand::rng();
    let raw: Vec<u8> = (0..bytes).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(&raw)
}

/// Binds the callback listener to the first free port in the range.
fn bind_loopback(port_range: (u16, u16)) -> GoogleResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!("callback server bound on port {}", port);
            return Ok((listener, port));
        }
    }
    Err(GoogleError::configuration(format!(
        "no free loopback port in range {}-{}",
        port_range.0, port_range.1
    ))
    .with_service("oauth"))
}

/// Waits for the browser redirect and extracts the code and state.
fn wait_for_callback(listener: TcpListener) -> GoogleResult<(String, String)> {
    let (tx, rx) = mpsc::channel();

    let _handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => error!("failed to accept callback connection: {}", e),
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(GoogleError::authentication(
            "timed out waiting for the browser callback",
        )
        .with_service("oauth")),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(GoogleError::internal("callback channel disconnected").with_service("oauth"))
        }
    }
}

/// Handles one HTTP request on the callback server.
///
/// Returns `None` for requests that are not the redirect (favicon fetches
/// and the like) so the accept loop keeps waiting.
fn handle_callback(mut stream: TcpStream) -> Option<GoogleResult<(String, String)>> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;
    if !target.starts_with("/oauth2/callback") {
        return None;
    }

    let query = target.split_once('?').map(|(_, q)| q).unwrap_or("");
    let mut code = None;
    let mut state = None;
    let mut denial = None;

    for param in query.split('&') {
        if let Some((key, value)) = param.split_once('=') {
            let value = urlencoding::decode(value).unwrap_or_default().into_owned();
            match key {
                "code" => code = Some(value),
                "state" => state = Some(value),
                "error" => denial = Some(value),
                _ => {}
            }
        }
    }

    let page = if denial.is_some() || code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization failed</h1>\
        <p>You can close this tab.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h1>Authorization complete</h1>\
        <p>You can close this tab and return to the terminal.</p></body></html>"
    };
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();

    if let Some(denial) = denial {
        return Some(Err(GoogleError::authentication(format!(
            "authorization denied: {}",
            denial
        ))
        .with_service("oauth")));
    }

    match (code, state) {
        (Some(code), Some(state)) => Some(Ok((code, state))),
        (Some(code), None) => Some(Ok((code, String::new()))),
        _ => Some(Err(GoogleError::authentication(
            "callback was missing the authorization code",
        )
        .with_service("oauth"))),
    }
}
