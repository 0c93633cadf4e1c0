// ABOUTME: SongRecord value type for one extracted song request with provenance fields.
// ABOUTME: Construction enforces the non-empty-title invariant; includes display helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// One extracted song request.
///
/// Created by a strategy, possibly merged away by the coordinator's
/// deduplication step, otherwise handed to the caller unchanged. The title is
/// guaranteed non-empty after trimming; violating that at construction is a
/// record validation fault the caller logs and skips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    title: String,
    pub duration: Option<String>,
    pub requester: Option<String>,
    pub status: Option<String>,
    pub video_url: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub selector_used: String,
    pub element_index: usize,
}

impl SongRecord {
    /// Create a record. The title is trimmed and must be non-empty.
    pub fn new(
        title: impl Into<String>,
        selector_used: impl Into<String>,
        element_index: usize,
        captured_at: DateTime<Utc>,
    ) -> Result<Self, ExtractError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ExtractError::record("new", "song title cannot be empty"));
        }
        Ok(Self {
            title,
            duration: None,
            requester: None,
            status: None,
            video_url: None,
            captured_at,
            selector_used: selector_used.into(),
            element_index,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// True if the record carries a direct video-host URL (a search URL does
    /// not count).
    pub fn has_video_link(&self) -> bool {
        self.video_url
            .as_deref()
            .map(|url| {
                (url.contains("youtube.com") || url.contains("youtu.be"))
                    && !url.contains("/results?")
            })
            .unwrap_or(false)
    }

    /// Title with metadata appended, for display purposes.
    pub fn enhanced_title(&self) -> String {
        let mut enhanced = self.title.clone();
        if let Some(ref duration) = self.duration {
            enhanced.push_str(&format!(" [{}]", duration));
        }
        if let Some(ref requester) = self.requester {
            enhanced.push_str(&format!(" - {}", requester));
        }
        if let Some(ref status) = self.status {
            enhanced.push_str(&format!(" ({})", status));
        }
        enhanced
    }
}
