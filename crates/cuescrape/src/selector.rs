// ABOUTME: Selector value type describing which page elements to query and how to rank them.
// ABOUTME: Includes SelectorKind, classification predicates, and the default five-selector scan set.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ExtractError;

/// The kind of pattern a [`Selector`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKind {
    #[default]
    Css,
    XPath,
    TagName,
    ClassName,
    Id,
}

/// Declarative description of which page elements to query.
///
/// Immutable once constructed. Classification helpers are pure functions of
/// the pattern string; strategies use them to decide whether they can handle
/// a given selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selector {
    pattern: String,
    kind: SelectorKind,
    description: Option<String>,
    priority: i32,
    is_fallback: bool,
    #[serde(default)]
    metadata: HashMap<String, Value>,
}

impl Selector {
    /// Create a selector. The pattern must be non-empty.
    pub fn new(pattern: impl Into<String>, kind: SelectorKind) -> Result<Self, ExtractError> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ExtractError::config("selector", "pattern cannot be empty"));
        }
        Ok(Self {
            pattern,
            kind,
            description: None,
            priority: 1,
            is_fallback: false,
            metadata: HashMap::new(),
        })
    }

    /// Set the priority (higher numbers are scanned first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark this selector as a fallback, eligible for the text-parsing strategy.
    pub fn as_fallback(mut self) -> Self {
        self.is_fallback = true;
        self
    }

    /// Attach a metadata entry, e.g. a per-selector title sub-selector override.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn kind(&self) -> SelectorKind {
        self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    /// Look up a metadata value.
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Look up a string metadata value.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }

    /// True if this selector targets table rows.
    pub fn is_row_selector(&self) -> bool {
        self.pattern.to_lowercase().contains("tr")
    }

    /// True if this selector targets links to a known video host.
    pub fn is_video_link_selector(&self) -> bool {
        let lower = self.pattern.to_lowercase();
        ["youtube", "youtu.be", "href*="]
            .iter()
            .any(|kw| lower.contains(kw))
    }

    /// Selector for song-queue table rows.
    pub fn table_rows() -> Self {
        Self::new("tr", SelectorKind::Css)
            .expect("static selector")
            .with_description("song queue table rows")
            .with_priority(10)
    }

    /// Selector for direct video-host links.
    pub fn video_links() -> Self {
        Self::new(
            "a[href*='youtube.com'], a[href*='youtu.be']",
            SelectorKind::Css,
        )
        .expect("static selector")
        .with_description("direct video links")
        .with_priority(8)
    }

    /// Selector for song-title elements.
    pub fn song_titles() -> Self {
        Self::new(".queue-item-title, .song-title, .title", SelectorKind::Css)
            .expect("static selector")
            .with_description("song title elements")
            .with_priority(5)
    }

    /// Fallback selector for all link elements.
    pub fn generic_links() -> Self {
        Self::new("a", SelectorKind::Css)
            .expect("static selector")
            .with_description("all link elements")
            .with_priority(3)
            .as_fallback()
    }

    /// Fallback selector for text-bearing elements.
    pub fn text_blocks() -> Self {
        Self::new("div, span, p, li", SelectorKind::Css)
            .expect("static selector")
            .with_description("text-containing elements")
            .with_priority(1)
            .as_fallback()
    }

    /// Create a custom selector with an explicit priority.
    pub fn custom(
        pattern: impl Into<String>,
        kind: SelectorKind,
        priority: i32,
    ) -> Result<Self, ExtractError> {
        Ok(Self::new(pattern, kind)?.with_priority(priority))
    }
}

/// The standard scan set for a song-request queue page, highest priority first.
pub fn default_selectors() -> Vec<Selector> {
    vec![
        Selector::table_rows(),
        Selector::video_links(),
        Selector::song_titles(),
        Selector::generic_links(),
        Selector::text_blocks(),
    ]
}
