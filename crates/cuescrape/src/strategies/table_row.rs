// ABOUTME: Table-row extraction strategy: title, label metadata, and video URL per queue row.
// ABOUTME: Highest priority; supports robust per-index re-query and the known-URL optimization.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::dom::{DomError, DomSession, ElementHandle};
use crate::matching::TitleMatcher;
use crate::record::SongRecord;
use crate::resolve::{self, ROW_TITLE};
use crate::result::ExtractionResult;
use crate::selector::Selector;
use crate::strategies::{accept_title, cap_reached, nth_element, ExtractionStrategy};

/// Label elements inside a queue row carrying duration/requester/status text.
const ROW_LABELS: &str = ".queue-item-label, .song-meta";

/// Status keywords recognized in label text.
const STATUS_KEYWORDS: [&str; 3] = ["Playing", "next", "minutes"];

/// Selector metadata key overriding the in-row title sub-selector.
const TITLE_SELECTOR_KEY: &str = "title_selector";

/// Extracts songs from the queue's table rows.
///
/// Per row, locates a nested title element (falling back to the first line of
/// the row's full text), classifies sibling labels into duration, requester
/// and status, and resolves a video URL through the cascade unless the title
/// is already in the config's known-URL table.
#[derive(Debug, Default)]
pub struct TableRowStrategy;

impl TableRowStrategy {
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
        let rows = dom.find(selector.pattern())?;
        let element_count = rows.len();
        let captured_at = Utc::now();
        let mut songs = Vec::new();

        if config.use_robust_finding {
            for index in 0..element_count {
                // The page replaces the row collection between reads, so
                // re-query by index immediately before each access. A
                // collection that shrank below the index is a silent skip.
                let row = match nth_element(dom, selector.pattern(), index) {
                    Ok(Some(row)) => row,
                    Ok(None) => continue,
                    Err(err) => {
                        debug!(index, error = %err, "row re-query fault");
                        continue;
                    }
                };
                match self.extract_row(dom, &row, selector, index, captured_at, config, matcher) {
                    Ok(Some(song)) => {
                        songs.push(song);
                        if cap_reached(config, songs.len()) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(index, error = %err, "row extraction fault");
                    }
                }
            }
        } else {
            for (index, row) in rows.iter().enumerate() {
                match self.extract_row(dom, row, selector, index, captured_at, config, matcher) {
                    Ok(Some(song)) => {
                        songs.push(song);
                        if cap_reached(config, songs.len()) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        debug!(index, error = %err, "row extraction fault");
                    }
                }
            }
        }

        Ok(ExtractionResult::create_success(
            songs,
            "table_row",
            selector.pattern(),
            element_count,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn extract_row<D: DomSession>(
        &self,
        dom: &D,
        row: &D::Element,
        selector: &Selector,
        index: usize,
        captured_at: DateTime<Utc>,
        config: &ExtractionConfig,
        matcher: &TitleMatcher,
    ) -> Result<Option<SongRecord>, DomError> {
        let Some(raw_title) = self.row_title(row, selector)? else {
            return Ok(None);
        };
        let Some(title) = accept_title(matcher, config, &raw_title) else {
            return Ok(None);
        };

        let (duration, requester, status) = if config.extract_metadata {
            self.classify_labels(row).unwrap_or_default()
        } else {
            Default::default()
        };

        let video_url = if config.extract_video_urls {
            let normalized = matcher.normalize(&title);
            match config.known_url(&normalized) {
                Some(url) => {
                    debug!(%title, "reusing known video url");
                    Some(url.to_string())
                }
                None => resolve::resolve_video_url(dom, row, &title, config, matcher),
            }
        } else {
            None
        };

        let mut record = match SongRecord::new(&title, selector.pattern(), index, captured_at) {
            Ok(record) => record,
            Err(err) => {
                warn!(index, error = %err, "invalid song data from row");
                return Ok(None);
            }
        };
        record.duration = duration;
        record.requester = requester;
        record.status = status;
        record.video_url = video_url;
        Ok(Some(record))
    }

    /// The row's title: a nested title element if present, else the first
    /// line of the row's full text.
    fn row_title<E: ElementHandle>(
        &self,
        row: &E,
        selector: &Selector,
    ) -> Result<Option<String>, DomError> {
        let title_query = selector.metadata_str(TITLE_SELECTOR_KEY).unwrap_or(ROW_TITLE);
        if let Some(el) = row.find(title_query)?.into_iter().next() {
            let text = el.text()?;
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }

        let text = row.text()?;
        Ok(text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string))
    }

    /// Classify label text into duration (short, colon-containing), requester
    /// (`By ` prefix) and status (keyword set). Faults yield no metadata.
    fn classify_labels<E: ElementHandle>(
        &self,
        row: &E,
    ) -> Option<(Option<String>, Option<String>, Option<String>)> {
        let mut duration = None;
        let mut requester = None;
        let mut status = None;

        for label in row.find(ROW_LABELS).ok()? {
            let Ok(text) = label.text() else { continue };
            let text = text.trim().to_string();
            if text.contains(':') && text.chars().count() < 10 {
                duration = Some(text);
            } else if text.starts_with("By ") {
                requester = Some(text);
            } else if STATUS_KEYWORDS.iter().any(|kw| text.contains(kw)) {
                status = Some(text);
            }
        }

        Some((duration, requester, status))
    }
}

impl<D: DomSession> ExtractionStrategy<D> for TableRowStrategy {
    fn name(&self) -> &'static str {
        "table_row"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn can_handle(&self, selector: &Selector) -> bool {
        selector.is_row_selector()
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
                warn!(selector = selector.pattern(), error = %err, "table row extraction failed");
                ExtractionResult::create_failure(err.to_string(), "table_row", selector.pattern())
            }
        }
    }
}
