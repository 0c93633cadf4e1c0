// ABOUTME: ExtractionConfig with filtering bounds, cascade toggles, matcher tuning and the known-URL table.
// ABOUTME: Provides default/fast/thorough/silent presets and construction-time validation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ExtractError;

/// Configuration for one extraction run.
///
/// Built once per scan cycle by the caller and passed to every strategy. The
/// `known_urls` table is the one field the coordinator's optimized policy
/// mutates in place before a run: it maps normalized titles to already-resolved
/// video URLs so the table-row strategy can skip the resolution cascade for
/// songs seen on previous cycles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    // Filtering
    pub min_title_length: usize,
    pub max_title_length: usize,
    pub skip_ui_text: bool,
    pub skip_empty_elements: bool,

    // Processing
    pub clean_titles: bool,
    pub extract_video_urls: bool,
    pub extract_metadata: bool,

    // Robustness
    pub use_robust_finding: bool,
    pub max_retries: u32,

    // URL resolution cascade toggles, in cascade order
    pub try_direct_links: bool,
    pub try_script_inspection: bool,
    pub try_click_capture: bool,
    pub try_history_thumbnails: bool,
    pub fallback_to_search: bool,

    // Playback suppression during click capture
    pub mute_audio: bool,
    pub pause_videos: bool,
    pub close_new_contexts: bool,

    // Limits
    pub max_songs_per_strategy: Option<usize>,
    pub min_songs_for_success: usize,

    // Title matcher tuning
    pub jaccard_threshold: f64,
    pub containment_floor: usize,

    /// Normalized title -> known video URL, seeded by the optimized policy.
    pub known_urls: Option<HashMap<String, String>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_title_length: 3,
            max_title_length: 200,
            skip_ui_text: true,
            skip_empty_elements: true,
            clean_titles: true,
            extract_video_urls: true,
            extract_metadata: true,
            use_robust_finding: true,
            max_retries: 3,
            try_direct_links: true,
            try_script_inspection: true,
            try_click_capture: true,
            try_history_thumbnails: true,
            fallback_to_search: true,
            mute_audio: true,
            pause_videos: true,
            close_new_contexts: true,
            max_songs_per_strategy: None,
            min_songs_for_success: 1,
            jaccard_threshold: 0.7,
            containment_floor: 10,
            known_urls: None,
        }
    }
}

impl ExtractionConfig {
    /// A fast configuration: direct links and search only, no side-effecting
    /// cascade steps.
    pub fn fast() -> Self {
        Self {
            try_click_capture: false,
            try_history_thumbnails: false,
            try_script_inspection: false,
            max_retries: 1,
            ..Self::default()
        }
    }

    /// A thorough configuration: every cascade step enabled, more retries.
    pub fn thorough() -> Self {
        Self {
            max_retries: 5,
            ..Self::default()
        }
    }

    /// A silent configuration: never opens new contexts that might play audio.
    pub fn silent() -> Self {
        Self {
            try_click_capture: false,
            ..Self::default()
        }
    }

    /// Validate thresholds. A failure here is fatal to this construction call
    /// only; the caller may fix the config and retry.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.min_title_length == 0 {
            return Err(ExtractError::config(
                "validate",
                "min_title_length must be at least 1",
            ));
        }
        if self.min_title_length > self.max_title_length {
            return Err(ExtractError::config(
                "validate",
                format!(
                    "min_title_length {} exceeds max_title_length {}",
                    self.min_title_length, self.max_title_length
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.jaccard_threshold) {
            return Err(ExtractError::config(
                "validate",
                format!(
                    "jaccard_threshold {} outside [0.0, 1.0]",
                    self.jaccard_threshold
                ),
            ));
        }
        if self.min_songs_for_success == 0 {
            return Err(ExtractError::config(
                "validate",
                "min_songs_for_success must be at least 1",
            ));
        }
        Ok(())
    }

    /// Look up a known video URL by normalized title.
    pub fn known_url(&self, normalized_title: &str) -> Option<&str> {
        self.known_urls
            .as_ref()
            .and_then(|urls| urls.get(normalized_title))
            .map(String::as_str)
    }

    /// Replace the known-URL table. Keys must already be normalized titles.
    pub fn set_known_urls(&mut self, urls: HashMap<String, String>) {
        self.known_urls = Some(urls);
    }
}
