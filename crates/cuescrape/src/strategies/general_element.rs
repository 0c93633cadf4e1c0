// ABOUTME: General-element extraction strategy, the catch-all for selectors no other strategy claims.
// ABOUTME: Scans nested anchors for video URLs and supports the same robust re-query mode as table rows.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::dom::{DomError, DomSession, ElementHandle};
use crate::matching::TitleMatcher;
use crate::record::SongRecord;
use crate::resolve::is_video_url;
use crate::result::ExtractionResult;
use crate::selector::Selector;
use crate::strategies::{accept_title, cap_reached, nth_element, ExtractionStrategy};

/// Extracts songs from general content elements: divs, spans, list items,
/// title elements. Handles everything the table-row and youtube-link
/// strategies do not claim.
#[derive(Debug, Default)]
pub struct GeneralElementStrategy;

impl GeneralElementStrategy {
    pub fn new() -> Self {
        Self
    }

    fn run<D: DomSession>(
        &self,
        dom: &D,
        selector: &Selector,
        config: &ExtractionConfig,
        matcher: &TitleMatcher,
    ) -> Result<ExtractionResult, DomError> {
        let elements = dom.find(selector.pattern())?;
        let element_count = elements.len();
        let captured_at = Utc::now();
        let mut songs = Vec::new();

        if config.use_robust_finding {
            for index in 0..element_count {
                let element = match nth_element(dom, selector.pattern(), index) {
                    Ok(Some(element)) => element,
                    Ok(None) => continue,
                    Err(err) => {
                        debug!(index, error = %err, "element re-query fault");
                        continue;
                    }
                };
                match self.extract_element(&element, selector, index, captured_at, config, matcher)
                {
                    Ok(Some(song)) => {
                        songs.push(song);
                        if cap_reached(config, songs.len()) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(index, error = %err, "element extraction fault");
                    }
                }
            }
        } else {
            for (index, element) in elements.iter().enumerate() {
                match self.extract_element(element, selector, index, captured_at, config, matcher)
                {
                    Ok(Some(song)) => {
                        songs.push(song);
                        if cap_reached(config, songs.len()) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(index, error = %err, "element extraction fault");
                    }
                }
            }
        }

        Ok(ExtractionResult::create_success(
            songs,
            "general_element",
            selector.pattern(),
            element_count,
        ))
    }

    fn extract_element<E: ElementHandle>(
        &self,
        element: &E,
        selector: &Selector,
        index: usize,
        captured_at: DateTime<Utc>,
        config: &ExtractionConfig,
        matcher: &TitleMatcher,
    ) -> Result<Option<SongRecord>, DomError> {
        let element_text = element.text()?.trim().to_string();
        if config.skip_empty_elements && element_text.chars().count() < config.min_title_length {
            return Ok(None);
        }

        // A nested anchor to a video host supplies both the URL and the
        // preferred title text.
        let mut video_url = None;
        let mut anchor_text = None;
        if config.extract_video_urls {
            if let Ok(anchors) = element.find("a") {
                for anchor in anchors {
                    if let Ok(Some(href)) = anchor.attribute("href") {
                        if is_video_url(&href) {
                            anchor_text = anchor
                                .text()
                                .ok()
                                .map(|t| t.trim().to_string())
                                .filter(|t| !t.is_empty());
                            video_url = Some(href);
                            break;
                        }
                    }
                }
            }
        }

        let raw_title = anchor_text.unwrap_or(element_text);
        let Some(title) = accept_title(matcher, config, &raw_title) else {
            return Ok(None);
        };

        let mut record = match SongRecord::new(&title, selector.pattern(), index, captured_at) {
            Ok(record) => record,
            Err(err) => {
                warn!(index, error = %err, "invalid song data from element");
                return Ok(None);
            }
        };
        record.video_url = video_url;
        Ok(Some(record))
    }
}

impl<D: DomSession> ExtractionStrategy<D> for GeneralElementStrategy {
    fn name(&self) -> &'static str {
        "general_element"
    }

    fn priority(&self) -> i32 {
        5
    }

    fn can_handle(&self, selector: &Selector) -> bool {
        !selector.is_row_selector() && !selector.is_video_link_selector()
    }

    fn extract(
        &self,
        dom: &D,
        selector: &Selector,
        config: &ExtractionConfig,
    ) -> ExtractionResult {
        let matcher = TitleMatcher::from_config(config);
        match self.run(dom, selector, config, &matcher) {
            Ok(result) => result,
            Err(err) => {
                warn!(selector = selector.pattern(), error = %err, "general element extraction failed");
                ExtractionResult::create_failure(
                    err.to_string(),
                    "general_element",
                    selector.pattern(),
                )
            }
        }
    }
}
