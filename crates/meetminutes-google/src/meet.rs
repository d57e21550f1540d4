//! Google Meet conference-record locator.
//!
//! Finds the recording and transcript references for one meeting code on
//! one calendar day. Zero conference records is a valid outcome ("no
//! meeting held"), reported as an empty [`MeetingRecords`] rather than an
//! error. Within one conference record the first listed recording and
//! transcript win; across multiple records for the same day, the last
//! record processed overwrites earlier ones.

use serde::Deserialize;
use tracing::{debug, info};

use meetminutes_core::DayWindow;

use crate::auth::GoogleAuth;
use crate::error::{GoogleError, GoogleResult, status_error, transport_error};

/// Base URL for the Meet REST API v2.
const MEET_API_BASE: &str = "https://meet.googleapis.com/v2";

/// One occurrence of a meeting at a specific time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceRecord {
    /// Resource name, e.g. `conferenceRecords/abc-123`.
    pub name: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A recording reference pointing at a Drive file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    /// Resource name of the recording.
    pub name: String,
    /// Where the recording landed in Drive.
    pub drive_destination: DriveDestination,
    #[serde(default)]
    pub state: Option<String>,
}

/// Drive location of a recording.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveDestination {
    /// Drive file ID of the video.
    pub file: String,
    #[serde(default)]
    pub export_uri: Option<String>,
}

/// A transcript reference pointing at a Docs document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Resource name of the transcript.
    pub name: String,
    /// Where the transcript document lives.
    pub docs_destination: DocsDestination,
    #[serde(default)]
    pub state: Option<String>,
}

/// Docs location of a transcript.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsDestination {
    /// Document ID of the transcript.
    pub document: String,
    #[serde(default)]
    pub export_uri: Option<String>,
}

/// Artifacts located for one meeting code and day.
///
/// Both fields are optional and absence means "not found" - never an error.
/// Downstream stages treat an empty bag as "nothing to archive".
#[derive(Debug, Clone, Default)]
pub struct MeetingRecords {
    /// The located recording, if any.
    pub recording: Option<Recording>,
    /// The located transcript, if any. Only populated for conference
    /// records that also had a recording.
    pub transcript: Option<Transcript>,
}

impl MeetingRecords {
    /// Returns true when neither artifact was found.
    pub fn is_empty(&self) -> bool {
        self.recording.is_none() && self.transcript.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConferenceRecordsResponse {
    #[serde(default)]
    conference_records: Vec<ConferenceRecord>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordingsResponse {
    #[serde(default)]
    recordings: Vec<Recording>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscriptsResponse {
    #[serde(default)]
    transcripts: Vec<Transcript>,
}

/// Client for the Meet conference-records API.
#[derive(Debug)]
pub struct MeetClient {
    http: reqwest::Client,
    auth: GoogleAuth,
    base_url: String,
}

impl MeetClient {
    /// Creates a client using the production endpoint.
    pub fn new(auth: GoogleAuth) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth,
            base_url: MEET_API_BASE.to_string(),
        }
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the server-side filter for one meeting code and day window.
    fn filter_expression(meeting_code: &str, window: &DayWindow) -> String {
        format!(
            r#"space.meeting_code = "{}" AND start_time>="{}" AND end_time<="{}""#,
            meeting_code,
            window.start_rfc3339(),
            window.end_rfc3339()
        )
    }

    /// Locates recording and transcript references for a meeting code on
    /// one day.
    pub async fn locate(
        &self,
        meeting_code: &str,
        window: DayWindow,
    ) -> GoogleResult<MeetingRecords> {
        let filter = Self::filter_expression(meeting_code, &window);
        debug!("listing conference records with filter: {}", filter);

        let conference_records = self.list_conference_records(&filter).await?;
        if conference_records.is_empty() {
            info!("no conference records for {} in window", meeting_code);
            return Ok(MeetingRecords::default());
        }

        let mut records = MeetingRecords::default();
        for record in &conference_records {
            let recordings = self.list_recordings(&record.name).await?;
            let Some(recording) = recordings.into_iter().next() else {
                continue;
            };
            debug!("found recording {} under {}", recording.name, record.name);
            records.recording = Some(recording);

            let transcripts = self.list_transcripts(&record.name).await?;
            if let Some(transcript) = transcripts.into_iter().next() {
                debug!("found transcript {} under {}", transcript.name, record.name);
                records.transcript = Some(transcript);
            }
        }

        info!(
            "located artifacts for {}: recording={}, transcript={}",
            meeting_code,
            records.recording.is_some(),
            records.transcript.is_some()
        );
        Ok(records)
    }

    /// Lists all conference records matching a filter, following pagination.
    async fn list_conference_records(&self, filter: &str) -> GoogleResult<Vec<ConferenceRecord>> {
        let url = format!("{}/conferenceRecords", self.base_url);
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let token = self.auth.access_token().await?;
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(token)
                .query(&[("filter", filter)]);
            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| transport_error("meet", e))?;
            if !response.status().is_success() {
                return Err(status_error("meet", response).await);
            }

            let page: ConferenceRecordsResponse = response
                .json()
                .await
                .map_err(|e| parse_error("conference records", e))?;
            all.extend(page.conference_records);

            match page.next_page_token {
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        Ok(all)
    }

    /// Lists the recordings of one conference record.
    async fn list_recordings(&self, record_name: &str) -> GoogleResult<Vec<Recording>> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/{}/recordings", self.base_url, record_name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error("meet", e))?;
        if !response.status().is_success() {
            return Err(status_error("meet", response).await);
        }
        let parsed: RecordingsResponse = response
            .json()
            .await
            .map_err(|e| parse_error("recordings", e))?;
        Ok(parsed.recordings)
    }

    /// Lists the transcripts of one conference record.
    async fn list_transcripts(&self, record_name: &str) -> GoogleResult<Vec<Transcript>> {
        let token = self.auth.access_token().await?;
        let url = format!("{}/{}/transcripts", self.base_url, record_name);
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| transport_error("meet", e))?;
        if !response.status().is_success() {
            return Err(status_error("meet", response).await);
        }
        let parsed: TranscriptsResponse = response
            .json()
            .await
            .map_err(|e| parse_error("transcripts", e))?;
        Ok(parsed.transcripts)
    }
}

fn parse_error(what: &str, err: reqwest::Error) -> GoogleError {
    GoogleError::invalid_response(format!("failed to parse {} response: {}", what, err))
        .with_service("meet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Route, StubServer};
    use chrono::NaiveDate;

    fn window() -> DayWindow {
        DayWindow::for_date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
    }

    fn client(server: &StubServer) -> MeetClient {
        MeetClient::new(GoogleAuth::with_static_token("test-token"))
            .with_base_url(format!("{}/v2", server.url()))
    }

    #[test]
    fn filter_expression_format() {
        let filter = MeetClient::filter_expression("zyf-jnvc-qac", &window());
        assert_eq!(
            filter,
            r#"space.meeting_code = "zyf-jnvc-qac" AND start_time>="2024-01-10T00:00:00.000Z" AND end_time<="2024-01-11T00:00:00.000Z""#
        );
    }

    #[test]
    fn recording_parses_drive_destination() {
        let recording: Recording = serde_json::from_str(
            r#"{
                "name": "conferenceRecords/abc/recordings/r1",
                "driveDestination": {"file": "drive-file-id", "exportUri": "https://drive.example/x"},
                "state": "FILE_GENERATED"
            }"#,
        )
        .unwrap();
        assert_eq!(recording.drive_destination.file, "drive-file-id");
    }

    #[tokio::test]
    async fn no_conference_records_is_an_empty_bag() {
        let server = StubServer::start(vec![Route::json("GET", "/v2/conferenceRecords", "{}")]).await;

        let records = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();
        assert!(records.is_empty());
        assert!(records.recording.is_none());
        assert!(records.transcript.is_none());
    }

    #[tokio::test]
    async fn locate_sends_the_filter() {
        let server = StubServer::start(vec![Route::json("GET", "/v2/conferenceRecords", "{}")]).await;

        client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        let query = requests[0].query().unwrap().to_string();
        let normalized = query.replace('+', "%20");
        let decoded = urlencoding::decode(&normalized).unwrap();
        assert!(decoded.contains(r#"space.meeting_code = "zyf-jnvc-qac""#));
        assert!(decoded.contains(r#"start_time>="2024-01-10T00:00:00.000Z""#));
    }

    #[tokio::test]
    async fn single_record_yields_first_recording_and_transcript() {
        let server = StubServer::start(vec![
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/recordings",
                r#"{"recordings": [
                    {"name": "conferenceRecords/rec1/recordings/a", "driveDestination": {"file": "file-a"}},
                    {"name": "conferenceRecords/rec1/recordings/b", "driveDestination": {"file": "file-b"}}
                ]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/transcripts",
                r#"{"transcripts": [
                    {"name": "conferenceRecords/rec1/transcripts/t1", "docsDestination": {"document": "doc-1"}}
                ]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords",
                r#"{"conferenceRecords": [{"name": "conferenceRecords/rec1"}]}"#,
            ),
        ])
        .await;

        let records = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();

        // First-wins within one record's listings.
        assert_eq!(records.recording.unwrap().drive_destination.file, "file-a");
        assert_eq!(records.transcript.unwrap().docs_destination.document, "doc-1");
    }

    #[tokio::test]
    async fn two_records_overwrite_last_wins() {
        let server = StubServer::start(vec![
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/recordings",
                r#"{"recordings": [{"name": "r1", "driveDestination": {"file": "file-1"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/transcripts",
                r#"{"transcripts": [{"name": "t1", "docsDestination": {"document": "doc-1"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec2/recordings",
                r#"{"recordings": [{"name": "r2", "driveDestination": {"file": "file-2"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec2/transcripts",
                r#"{"transcripts": [{"name": "t2", "docsDestination": {"document": "doc-2"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords",
                r#"{"conferenceRecords": [
                    {"name": "conferenceRecords/rec1"},
                    {"name": "conferenceRecords/rec2"}
                ]}"#,
            ),
        ])
        .await;

        let records = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();

        // Documented overwrite: the bag exposes only the last-processed
        // record's artifacts, not a merge or a list.
        assert_eq!(records.recording.unwrap().drive_destination.file, "file-2");
        assert_eq!(records.transcript.unwrap().docs_destination.document, "doc-2");
    }

    #[tokio::test]
    async fn record_without_recording_skips_transcript_lookup() {
        let server = StubServer::start(vec![
            Route::json("GET", "/v2/conferenceRecords/rec1/recordings", r#"{}"#),
            Route::json(
                "GET",
                "/v2/conferenceRecords",
                r#"{"conferenceRecords": [{"name": "conferenceRecords/rec1"}]}"#,
            ),
        ])
        .await;

        let records = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();
        assert!(records.is_empty());
        // Transcripts are only checked once a recording exists.
        assert!(server.requests_to("/v2/conferenceRecords/rec1/transcripts").is_empty());
    }

    #[tokio::test]
    async fn later_record_without_transcript_keeps_earlier_one() {
        let server = StubServer::start(vec![
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/recordings",
                r#"{"recordings": [{"name": "r1", "driveDestination": {"file": "file-1"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec1/transcripts",
                r#"{"transcripts": [{"name": "t1", "docsDestination": {"document": "doc-1"}}]}"#,
            ),
            Route::json(
                "GET",
                "/v2/conferenceRecords/rec2/recordings",
                r#"{"recordings": [{"name": "r2", "driveDestination": {"file": "file-2"}}]}"#,
            ),
            Route::json("GET", "/v2/conferenceRecords/rec2/transcripts", r#"{}"#),
            Route::json(
                "GET",
                "/v2/conferenceRecords",
                r#"{"conferenceRecords": [
                    {"name": "conferenceRecords/rec1"},
                    {"name": "conferenceRecords/rec2"}
                ]}"#,
            ),
        ])
        .await;

        let records = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap();

        // The recording slot is overwritten but the transcript slot is only
        // written when a transcript exists, so rec1's survives.
        assert_eq!(records.recording.unwrap().drive_destination.file, "file-2");
        assert_eq!(records.transcript.unwrap().docs_destination.document, "doc-1");
    }

    #[tokio::test]
    async fn server_error_propagates() {
        let server = StubServer::start(vec![Route::new(
            "GET",
            "/v2/conferenceRecords",
            500,
            r#"{"error": "boom"}"#,
        )])
        .await;

        let err = client(&server).locate("zyf-jnvc-qac", window()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
