// ABOUTME: ExtractionStrategy trait plus helpers shared by the four strategy variants.
// ABOUTME: Strategies never raise across the extract boundary; faults become failure results.

//! Extraction strategies.
//!
//! Each strategy is one heuristic for reading song requests out of the live
//! page, bound to a class of selectors through `can_handle`. The coordinator
//! holds them in an explicit priority-ordered collection and dispatches by
//! iteration.

pub mod general_element;
pub mod table_row;
pub mod text_parsing;
pub mod youtube_link;

pub use general_element::GeneralElementStrategy;
pub use table_row::TableRowStrategy;
pub use text_parsing::TextParsingStrategy;
pub use youtube_link::YoutubeLinkStrategy;

use crate::config::ExtractionConfig;
use crate::dom::{DomError, DomSession};
use crate::matching::TitleMatcher;
use crate::result::ExtractionResult;
use crate::selector::Selector;

/// The polymorphic extraction contract.
///
/// `extract` must never panic across the boundary: any internal fault is
/// caught and converted into a failure [`ExtractionResult`]. `validate` is
/// advisory only; implementations log concerns and the coordinator never
/// blocks execution on it.
pub trait ExtractionStrategy<D: DomSession> {
    /// Stable name used in result provenance and the merge-priority table.
    fn name(&self) -> &'static str;

    /// Higher priority strategies win ties during merging.
    fn priority(&self) -> i32;

    /// Whether this strategy knows what to do with the given selector.
    fn can_handle(&self, selector: &Selector) -> bool;

    /// Advisory configuration check, used for logging only.
    fn validate(&self, config: &ExtractionConfig) -> bool {
        let _ = config;
        true
    }

    /// Run the extraction. Must return a failure result instead of erring.
    fn extract(&self, dom: &D, selector: &Selector, config: &ExtractionConfig)
        -> ExtractionResult;
}

/// Re-find a collection and return its `index`-th element, or `None` if the
/// collection has shrunk below the index since it was counted. Used by the
/// robust extraction paths: the page periodically replaces the underlying
/// collection, so handles are re-queried immediately before each access.
pub(crate) fn nth_element<D: DomSession>(
    dom: &D,
    selector: &str,
    index: usize,
) -> Result<Option<D::Element>, DomError> {
    let elements = dom.find(selector)?;
    Ok(elements.into_iter().nth(index))
}

/// Run a raw title through cleanup and the noise filters. `None` means the
/// title is discarded, which is a skip, never an error.
pub(crate) fn accept_title(
    matcher: &TitleMatcher,
    config: &ExtractionConfig,
    raw: &str,
) -> Option<String> {
    let title = if config.clean_titles {
        matcher.clean_title(raw)
    } else {
        raw.trim().to_string()
    };

    let len = title.chars().count();
    if len < config.min_title_length || len > config.max_title_length {
        return None;
    }
    if config.skip_ui_text && matcher.is_ui_text(&title) {
        return None;
    }
    Some(title)
}

/// True once a strategy has hit its configured per-run output cap.
pub(crate) fn cap_reached(config: &ExtractionConfig, count: usize) -> bool {
    config
        .max_songs_per_strategy
        .is_some_and(|cap| count >= cap)
}
