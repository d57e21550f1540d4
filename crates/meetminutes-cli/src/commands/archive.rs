//! The archive pipeline: locate, retrieve, summarize, notify.
//!
//! One sequential pass per meeting/date: locate the conference record,
//! stream the recording and transcript into the archive directory, wait for
//! the transcript to be complete, generate a summary, and send the minutes
//! email. A failed video download degrades the run (the transcript path
//! still proceeds); a failed summary falls back to a placeholder line; the
//! empty bag from the locator means "no meeting held" and ends the run
//! cleanly.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{error, info, warn};

use meetminutes_core::{ArchiveNaming, DayWindow, Meeting, compose_minutes, markdown_to_html};
use meetminutes_google::{
    Authorizer, CredentialStore, DriveClient, GeminiClient, GmailClient, GoogleAuth, MARKDOWN_EXPORT,
    MeetClient, MinutesEmail, archive_scopes,
};

use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use crate::transcript::wait_for_transcript;

/// The wired service clients the archive pipeline runs against.
pub struct Pipeline {
    meet: MeetClient,
    drive: DriveClient,
    gemini: GeminiClient,
    gmail: GmailClient,
    naming: ArchiveNaming,
    log_dir: PathBuf,
}

impl Pipeline {
    /// Authorizes and wires the production clients from configuration.
    pub async fn connect(config: &AppConfig) -> CliResult<Self> {
        let store = CredentialStore::new(&config.google.token_file);
        let authorizer = Authorizer::new(store, &config.google.credentials_file, archive_scopes());
        let auth = authorizer.authorize().await?;
        Ok(Self::new(auth, config))
    }

    /// Wires production clients around an existing authorized handle.
    pub fn new(auth: GoogleAuth, config: &AppConfig) -> Self {
        Self {
            meet: MeetClient::new(auth.clone()),
            drive: DriveClient::new(auth.clone()),
            gemini: GeminiClient::new(&config.gemini_api_key),
            gmail: GmailClient::new(auth),
            naming: config.archive_naming(),
            log_dir: config.log_dir.clone(),
        }
    }

    /// Wires the pipeline from explicit clients.
    ///
    /// This is the seam tests use to point every client at a stub backend.
    pub fn from_clients(
        meet: MeetClient,
        drive: DriveClient,
        gemini: GeminiClient,
        gmail: GmailClient,
        naming: ArchiveNaming,
        log_dir: PathBuf,
    ) -> Self {
        Self {
            meet,
            drive,
            gemini,
            gmail,
            naming,
            log_dir,
        }
    }

    /// Archives one meeting occurrence end to end.
    pub async fn archive_meeting(
        &self,
        meeting: &Meeting,
        date: NaiveDate,
        recipient_override: Option<&str>,
    ) -> CliResult<()> {
        info!("archiving {} for {}", meeting.name, date);

        let window = DayWindow::for_date(date);
        let records = self.meet.locate(&meeting.meeting_code, window).await?;
        if records.is_empty() {
            info!("nothing to archive for {} on {}", meeting.name, date);
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.log_dir).await?;

        if let Some(ref recording) = records.recording {
            let path = self.log_dir.join(self.naming.video_filename(meeting, date));
            // A failed video download is terminal for the artifact only;
            // the transcript path still runs.
            if let Err(e) = self
                .archive_video(&recording.drive_destination.file, &path)
                .await
            {
                error!("video archival failed for {}: {}", meeting.name, e);
            }
        }

        let Some(ref transcript) = records.transcript else {
            info!(
                "no transcript for {} on {}; skipping minutes email",
                meeting.name, date
            );
            return Ok(());
        };

        let transcript_path = self.log_dir.join(self.naming.markdown_filename(meeting, date));
        self.archive_transcript(&transcript.docs_destination.document, &transcript_path)
            .await?;
        let transcript_text = wait_for_transcript(&transcript_path).await;

        let summary = match self.gemini.summarize(&transcript_text).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("summary generation failed, using placeholder: {}", e);
                format!("{} transcript for {}", meeting.name, date.format("%Y-%m-%d"))
            }
        };

        let body = compose_minutes(
            &summary,
            &self.naming.markdown_url(meeting, date),
            &self.naming.video_url(meeting, date),
            &transcript_text,
        );
        let email = MinutesEmail::compose(
            meeting,
            recipient_override,
            date,
            markdown_to_html(&body),
        );
        self.gmail.send(&email).await?;

        info!("minutes for {} on {} sent to {}", meeting.name, date, email.to);
        Ok(())
    }

    /// Streams the recording into the archive directory.
    async fn archive_video(&self, file_id: &str, path: &Path) -> CliResult<()> {
        let mut file = tokio::fs::File::create(path).await?;
        let written = self.drive.download_to(file_id, &mut file).await?;
        info!("archived video to {:?} ({} bytes)", path, written);
        Ok(())
    }

    /// Streams the transcript export into the archive directory.
    async fn archive_transcript(&self, document_id: &str, path: &Path) -> CliResult<()> {
        let mut file = tokio::fs::File::create(path).await?;
        let written = self
            .drive
            .export_to(document_id, MARKDOWN_EXPORT, &mut file)
            .await?;
        info!("archived transcript to {:?} ({} bytes)", path, written);
        Ok(())
    }
}

/// Runs the archive command over one or all configured meetings.
pub async fn run(
    config: &AppConfig,
    meeting: Option<&str>,
    date: Option<NaiveDate>,
    recipient_override: Option<&str>,
) -> CliResult<()> {
    config.validate().map_err(CliError::Config)?;
    let date = date.unwrap_or_else(|| chrono::Utc::now().date_naive());

    let targets: Vec<&Meeting> = match meeting {
        Some(needle) => vec![config.find_meeting(needle).ok_or_else(|| {
            CliError::Config(format!("no configured meeting matches '{}'", needle))
        })?],
        None => config.meetings.iter().collect(),
    };

    let pipeline = Pipeline::connect(config).await?;

    let mut failed = 0usize;
    for meeting in targets {
        if let Err(e) = pipeline
            .archive_meeting(meeting, date, recipient_override)
            .await
        {
            error!("archiving {} failed: {}", meeting.name, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(CliError::Archive(format!("{} meeting(s) failed", failed)));
    }
    Ok(())
}
