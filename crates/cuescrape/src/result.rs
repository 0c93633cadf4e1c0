// ABOUTME: ExtractionResult type holding extracted songs plus provenance, warnings, and metadata.
// ABOUTME: Success and failure constructors maintain the song-list/success invariants.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::SongRecord;

/// The outcome of one strategy run against one selector.
///
/// Either success (song list present, possibly empty) or failure (no songs,
/// non-empty error message). Warnings and metadata always default to empty
/// collections. Results are single-use: produced and consumed within one
/// coordinator call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    songs: Vec<SongRecord>,
    strategy_used: String,
    selector_used: String,
    element_count: usize,
    success: bool,
    error_message: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
    #[serde(default)]
    metadata: HashMap<String, Value>,
    timestamp: DateTime<Utc>,
}

impl ExtractionResult {
    /// Create a successful result. Success holds regardless of how many songs
    /// were found, including zero.
    pub fn create_success(
        songs: Vec<SongRecord>,
        strategy_used: impl Into<String>,
        selector_used: impl Into<String>,
        element_count: usize,
    ) -> Self {
        Self {
            songs,
            strategy_used: strategy_used.into(),
            selector_used: selector_used.into(),
            element_count,
            success: true,
            error_message: None,
            warnings: Vec::new(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create a failed result. Failure always carries an empty song list and
    /// a non-empty error message.
    pub fn create_failure(
        error_message: impl Into<String>,
        strategy_used: impl Into<String>,
        selector_used: impl Into<String>,
    ) -> Self {
        Self {
            songs: Vec::new(),
            strategy_used: strategy_used.into(),
            selector_used: selector_used.into(),
            element_count: 0,
            success: false,
            error_message: Some(error_message.into()),
            warnings: Vec::new(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn songs(&self) -> &[SongRecord] {
        &self.songs
    }

    /// Consume the result, yielding its songs.
    pub fn into_songs(self) -> Vec<SongRecord> {
        self.songs
    }

    pub fn strategy_used(&self) -> &str {
        &self.strategy_used
    }

    pub fn selector_used(&self) -> &str {
        &self.selector_used
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn metadata(&self) -> &HashMap<String, Value> {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn song_count(&self) -> usize {
        self.songs.len()
    }

    pub fn has_songs(&self) -> bool {
        !self.songs.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }
}
