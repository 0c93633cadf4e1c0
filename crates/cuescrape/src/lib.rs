// ABOUTME: Main library entry point for the cuescrape song-request extraction engine.
// ABOUTME: Re-exports the public API: coordinator, strategies, matcher, DOM traits, and value types.

//! cuescrape - heuristic extraction of song requests from a live queue page.
//!
//! The engine reads structured song-request records out of an unstable,
//! externally-controlled DOM through several independent heuristic
//! strategies, merges and deduplicates their output, and resolves a video URL
//! for each record through a multi-step fallback cascade. The DOM itself is
//! behind the [`dom::DomSession`] trait; callers supply a WebDriver-backed
//! implementation and the polling loop.
//!
//! # Example
//!
//! ```
//! use cuescrape::TitleMatcher;
//!
//! let matcher = TitleMatcher::default();
//! assert!(matcher.titles_match("Imagine", "Imagine (Official Video)"));
//! assert!(matcher.is_ui_text("Page 3"));
//! ```

pub mod config;
pub mod coordinator;
pub mod dom;
pub mod error;
pub mod matching;
pub mod record;
pub mod resolve;
pub mod result;
pub mod selector;
pub mod strategies;

pub use crate::config::ExtractionConfig;
pub use crate::coordinator::ExtractionCoordinator;
pub use crate::dom::{ContextGuard, ContextHandle, DomError, DomSession, ElementHandle};
pub use crate::error::{ErrorCode, ExtractError};
pub use crate::matching::{MatcherOptions, TitleMatcher};
pub use crate::record::SongRecord;
pub use crate::resolve::{extract_video_id, is_video_url, resolve_video_url, search_url};
pub use crate::result::ExtractionResult;
pub use crate::selector::{default_selectors, Selector, SelectorKind};
pub use crate::strategies::{
    ExtractionStrategy, GeneralElementStrategy, TableRowStrategy, TextParsingStrategy,
    YoutubeLinkStrategy,
};
