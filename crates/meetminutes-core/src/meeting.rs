//! Meeting configuration entities.
//!
//! A [`Meeting`] describes one recurring Community Group call: a display
//! name, the mailing-list address minutes are sent to, and the Google Meet
//! meeting code used to locate conference records. Meetings are immutable
//! configuration supplied by the caller; the archive slug is derived from
//! the name rather than stored.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Runs of characters that cannot appear in an archive slug.
static NON_SLUG_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("invalid slug regex"));

/// One configured meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    /// Display name, e.g. `"VC API"`. Used in email subjects and to derive
    /// the archive slug.
    pub name: String,

    /// Address the minutes email goes to when no override is given.
    pub email: String,

    /// The Google Meet meeting code, e.g. `"zyf-jnvc-qac"`.
    #[serde(rename = "google_meet_id")]
    pub meeting_code: String,
}

impl Meeting {
    /// Creates a new meeting entry.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        meeting_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            meeting_code: meeting_code.into(),
        }
    }

    /// Returns the derived archive slug for this meeting.
    ///
    /// The slug is the lowercased name with every run of non-alphanumeric
    /// characters collapsed to a single `-` and no leading or trailing
    /// dashes: `"VC API"` becomes `"vc-api"`.
    pub fn slug(&self) -> String {
        let lowered = self.name.to_lowercase();
        NON_SLUG_RUN
            .replace_all(&lowered, "-")
            .trim_matches('-')
            .to_string()
    }
}

/// Finds a meeting by display name or meeting code.
///
/// Name matching is case-insensitive; meeting codes match exactly.
pub fn find_meeting<'a>(meetings: &'a [Meeting], needle: &str) -> Option<&'a Meeting> {
    meetings
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(needle) || m.meeting_code == needle)
}
