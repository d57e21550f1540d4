//! CLI configuration.
//!
//! All settings live in a single `config.toml` at
//! `~/.config/meetminutes/config.toml` by default, overridable with
//! `--config`. The file names the community, where artifacts are archived
//! and published, the meetings to process, and where the Google credential
//! files live.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use meetminutes_core::{ArchiveNaming, Meeting, find_meeting};

/// Configuration for the meetminutes CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Archive namespace, e.g. `"w3c-ccg"`. Prefixes every artifact name.
    pub community: String,

    /// Directory archived artifacts are written to.
    pub log_dir: PathBuf,

    /// Base URL under which archived artifacts are published. Must end
    /// with `/`.
    pub archive_url: String,

    /// The meetings this community runs.
    #[serde(default)]
    pub meetings: Vec<Meeting>,

    /// API key for the summary service.
    pub gemini_api_key: String,

    /// Google credential file locations.
    #[serde(default)]
    pub google: GoogleSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            community: String::new(),
            log_dir: PathBuf::from("./logs"),
            archive_url: String::new(),
            meetings: Vec::new(),
            gemini_api_key: String::new(),
            google: GoogleSettings::default(),
        }
    }
}

/// Google OAuth file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// The application-credential JSON from the Google Cloud Console.
    pub credentials_file: PathBuf,

    /// The cached-token file written after interactive authorization.
    pub token_file: PathBuf,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the default path, or defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {:?}: {}", path, e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config {:?}: {}", path, e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("meetminutes")
            .join("config.toml")
    }

    /// Returns the archive naming scheme for this community.
    pub fn archive_naming(&self) -> ArchiveNaming {
        ArchiveNaming::new(&self.community, &self.archive_url)
    }

    /// Finds a configured meeting by name or meeting code.
    pub fn find_meeting(&self, needle: &str) -> Option<&Meeting> {
        find_meeting(&self.meetings, needle)
    }

    /// Validates the configuration for an archive run.
    pub fn validate(&self) -> Result<(), String> {
        self.archive_naming().validate()?;

        if self.meetings.is_empty() {
            return Err("no meetings configured".to_string());
        }
        for meeting in &self.meetings {
            if meeting.meeting_code.is_empty() {
                return Err(format!("meeting '{}' has no google_meet_id", meeting.name));
            }
            if meeting.email.is_empty() {
                return Err(format!("meeting '{}' has no email", meeting.name));
            }
        }

        Ok(())
    }
}
