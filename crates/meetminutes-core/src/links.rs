//! Archive link and filename generation.
//!
//! Processed artifacts are published under a fixed base URL with
//! deterministic names: `<base><community>-<slug>-<date>.md` for the
//! minutes text and `...mp4` for the recording. Local archive files use the
//! same basename so the published links match what the archiver wrote.

use chrono::NaiveDate;
use url::Url;

use crate::meeting::Meeting;

/// Deterministic archive naming for one community.
#[derive(Debug, Clone)]
pub struct ArchiveNaming {
    community: String,
    base_url: String,
}

impl ArchiveNaming {
    /// Creates an archive naming scheme.
    ///
    /// `base_url` is used by plain concatenation and is expected to end with
    /// `/`; [`validate`](Self::validate) checks both properties.
    pub fn new(community: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            community: community.into(),
            base_url: base_url.into(),
        }
    }

    /// The shared basename for all artifacts of one meeting occurrence.
    pub fn basename(&self, meeting: &Meeting, date: NaiveDate) -> String {
        format!(
            "{}-{}-{}",
            self.community,
            meeting.slug(),
            date.format("%Y-%m-%d")
        )
    }

    /// Published URL of the Markdown minutes.
    pub fn markdown_url(&self, meeting: &Meeting, date: NaiveDate) -> String {
        format!("{}{}.md", self.base_url, self.basename(meeting, date))
    }

    /// Published URL of the video recording.
    pub fn video_url(&self, meeting: &Meeting, date: NaiveDate) -> String {
        format!("{}{}.mp4", self.base_url, self.basename(meeting, date))
    }

    /// Local filename for the Markdown minutes.
    pub fn markdown_filename(&self, meeting: &Meeting, date: NaiveDate) -> String {
        format!("{}.md", self.basename(meeting, date))
    }

    /// Local filename for the video recording.
    pub fn video_filename(&self, meeting: &Meeting, date: NaiveDate) -> String {
        format!("{}.mp4", self.basename(meeting, date))
    }

    /// Validates the base URL.
    pub fn validate(&self) -> Result<(), String> {
        if self.community.is_empty() {
            return Err("community must not be empty".to_string());
        }
        Url::parse(&self.base_url).map_err(|e| format!("invalid archive url: {}", e))?;
        if !self.base_url.ends_with('/') {
            return Err("archive url must end with '/'".to_string());
        }
        Ok(())
    }
}
