//! Transcript readiness poll.
//!
//! The transcript file is written by a streaming export, so for a short
//! window after the meeting it may be absent or truncated. This is a
//! bounded best-effort wait, not a delivery guarantee: callers must
//! tolerate an empty or partial transcript after the deadline.

use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

/// Marker Meet writes into the transcript once the meeting has ended.
pub const MEETING_ENDED_MARKER: &str = "### Meeting ended after";

/// Total time to keep polling.
const WAIT_DEADLINE: Duration = Duration::from_secs(15);

/// Pause between reads.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Waits for the transcript file to be complete.
///
/// Polls once per second for up to 15 seconds, succeeding early once the
/// file exists and contains the end-of-meeting marker. When the deadline
/// elapses, whatever content was last read (possibly empty) is returned.
pub async fn wait_for_transcript(path: &Path) -> String {
    let deadline = Instant::now() + WAIT_DEADLINE;
    let mut content = String::new();

    loop {
        sleep(POLL_INTERVAL).await;

        if let Ok(read) = std::fs::read_to_string(path) {
            content = read;
        }

        if content.contains(MEETING_ENDED_MARKER) {
            debug!("transcript at {:?} is complete", path);
            break;
        }
        if Instant::now() >= deadline {
            debug!(
                "transcript wait deadline elapsed for {:?} ({} bytes read)",
                path,
                content.len()
            );
            break;
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE: &str = "Alice: hello\nBob: hi\n\n### Meeting ended after 00:55:00\n";

    #[tokio::test(start_paused = true)]
    async fn returns_complete_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.md");
        std::fs::write(&path, COMPLETE).unwrap();

        let content = wait_for_transcript(&path).await;
        assert!(content.contains(MEETING_ENDED_MARKER));
        assert!(content.contains("Alice: hello"));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_file_returns_empty_within_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never-written.md");

        let started = Instant::now();
        let content = wait_for_transcript(&path).await;

        assert!(content.is_empty());
        // Bounded wait: the poll gives up at the deadline.
        let waited = started.elapsed();
        assert!(waited >= WAIT_DEADLINE);
        assert!(waited < WAIT_DEADLINE + Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn partial_content_is_returned_at_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.md");
        std::fs::write(&path, "Alice: hello\n").unwrap();

        let content = wait_for_transcript(&path).await;
        assert_eq!(content, "Alice: hello\n");
        assert!(!content.contains(MEETING_ENDED_MARKER));
    }

    #[tokio::test(start_paused = true)]
    async fn file_completed_mid_wait_is_picked_up() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.md");
        std::fs::write(&path, "Alice: hello\n").unwrap();

        let writer_path = path.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(3)).await;
            std::fs::write(&writer_path, COMPLETE).unwrap();
        });

        let content = wait_for_transcript(&path).await;
        assert!(content.contains(MEETING_ENDED_MARKER));
    }
}
