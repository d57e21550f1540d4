//! Gemini summary generation.
//!
//! The transcript goes up as a base64 inline blob alongside a fixed
//! instruction prompt; whatever Markdown the model returns is the summary,
//! unvalidated. No retry and no timeout beyond the transport default; the
//! caller decides whether a failure is fatal or falls back to a placeholder
//! summary.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GoogleError, GoogleResult, status_error, transport_error};

/// Base URL for the Generative Language REST API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The model used for meeting summaries.
const SUMMARY_MODEL: &str = "gemini-1.5-flash";

/// MIME type of the inline transcript payload.
const TRANSCRIPT_MIME: &str = "text/md";

/// The instruction prompt sent with every transcript.
const SUMMARY_PROMPT: &str = "
You are a useful meeting summary generator for W3C Community Group meetings.
You will be given a transcript in Markdown format of a meeting. The transcript
will contain the attendees and a full transcript of the discussion during
the meeting among the attendees. You will be expected to summarize the
meeting and provide the summary in Markdown format with a list of topics
covered during the meeting, and key points made in the meeting.
Only include topics covered and key points.
";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// Client for the Gemini summary endpoint.
///
/// Authenticates with an API key rather than OAuth.
#[derive(Debug)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generates a Markdown summary of a meeting transcript.
    pub async fn summarize(&self, transcript: &str) -> GoogleResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type: TRANSCRIPT_MIME.to_string(),
                            data: STANDARD.encode(transcript),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(SUMMARY_PROMPT.to_string()),
                    },
                ],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, SUMMARY_MODEL);
        debug!("requesting summary for {} transcript bytes", transcript.len());

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error("gemini", e))?;
        if !response.status().is_success() {
            return Err(status_error("gemini", response).await);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GoogleError::invalid_response(format!("failed to parse summary response: {}", e))
                .with_service("gemini")
        })?;

        let summary = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                GoogleError::invalid_response("summary response had no candidates")
                    .with_service("gemini")
            })?;

        info!("summary generated ({} chars)", summary.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GoogleErrorCode;
    use crate::testing::{Route, StubServer};

    fn client(server: &StubServer) -> GeminiClient {
        GeminiClient::new("test-key").with_base_url(format!("{}/v1beta", server.url()))
    }

    const OK_RESPONSE: &str = r###"{
        "candidates": [
            {"content": {"parts": [{"text": "## Topics\n\n- item"}], "role": "model"}}
        ]
    }"###;

    #[tokio::test]
    async fn summarize_returns_candidate_text() {
        let server = StubServer::start(vec![Route::json(
            "POST",
            "/v1beta/models/gemini-1.5-flash:generateContent",
            OK_RESPONSE,
        )])
        .await;

        let summary = client(&server).summarize("transcript body").await.unwrap();
        assert_eq!(summary, "## Topics\n\n- item");
    }

    #[tokio::test]
    async fn summarize_sends_inline_transcript_and_prompt() {
        let server = StubServer::start(vec![Route::json(
            "POST",
            "/v1beta/models/gemini-1.5-flash:generateContent",
            OK_RESPONSE,
        )])
        .await;

        client(&server).summarize("transcript body").await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].query().unwrap().contains("key=test-key"));

        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(
            parts[0]["inlineData"]["data"],
            STANDARD.encode("transcript body")
        );
        assert_eq!(parts[0]["inlineData"]["mimeType"], "text/md");
        let prompt = parts[1]["text"].as_str().unwrap();
        assert!(prompt.contains("meeting summary generator"));
        assert!(prompt.contains("topics"));
    }

    #[tokio::test]
    async fn empty_candidates_is_an_invalid_response() {
        let server = StubServer::start(vec![Route::json(
            "POST",
            "/v1beta/models/gemini-1.5-flash:generateContent",
            r#"{"candidates": []}"#,
        )])
        .await;

        let err = client(&server).summarize("transcript").await.unwrap_err();
        assert_eq!(err.code(), GoogleErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn api_error_propagates() {
        let server = StubServer::start(vec![Route::new(
            "POST",
            "/v1beta/models/gemini-1.5-flash:generateContent",
            429,
            r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#,
        )])
        .await;

        let err = client(&server).summarize("transcript").await.unwrap_err();
        assert_eq!(err.code(), GoogleErrorCode::RateLimited);
    }
}
