// ABOUTME: YouTube-link extraction strategy for selectors targeting video-host anchors.
// ABOUTME: Titles come from anchor text, falling back to parent text with the URL stripped.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::dom::{DomError, DomSession, ElementHandle};
use crate::matching::TitleMatcher;
use crate::record::SongRecord;
use crate::resolve::is_video_url;
use crate::result::ExtractionResult;
use crate::selector::Selector;
use crate::strategies::{accept_title, cap_reached, ExtractionStrategy};

/// Extracts songs from anchors pointing at a known video host.
#[derive(Debug, Default)]
pub struct YoutubeLinkStrategy;

impl YoutubeLinkStrategy {
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
        let links = dom.find(selector.pattern())?;
        let element_count = links.len();
        let captured_at = Utc::now();
        let mut songs = Vec::new();

        for (index, link) in links.iter().enumerate() {
            match self.extract_link(link, selector, index, captured_at, config, matcher) {
                Ok(Some(song)) => {
                    songs.push(song);
                    if cap_reached(config, songs.len()) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => {
                    debug!(index, error = %err, "link extraction fault");
                }
            }
        }

        Ok(ExtractionResult::create_success(
            songs,
            "youtube_link",
            selector.pattern(),
            element_count,
        ))
    }

    fn extract_link<E: ElementHandle>(
        &self,
        link: &E,
        selector: &Selector,
        index: usize,
        captured_at: DateTime<Utc>,
        config: &ExtractionConfig,
        matcher: &TitleMatcher,
    ) -> Result<Option<SongRecord>, DomError> {
        let href = match link.attribute("href")? {
            Some(href) if is_video_url(&href) => href,
            _ => return Ok(None),
        };

        let mut raw_title = link.text()?.trim().to_string();

        // An anchor whose text is empty or just the URL itself carries no
        // title; use the parent container's text with the URL stripped out.
        if raw_title.is_empty() || raw_title.contains(&href) {
            if let Ok(Some(parent)) = link.parent() {
                if let Ok(parent_text) = parent.text() {
                    raw_title = parent_text.replace(&href, " ").trim().to_string();
                }
            }
        }
        if raw_title.is_empty() {
            return Ok(None);
        }

        let Some(title) = accept_title(matcher, config, &raw_title) else {
            return Ok(None);
        };

        let mut record = match SongRecord::new(&title, selector.pattern(), index, captured_at) {
            Ok(record) => record,
            Err(err) => {
                warn!(index, error = %err, "invalid song data from link");
                return Ok(None);
            }
        };
        record.video_url = Some(href);
        Ok(Some(record))
    }
}

impl<D: DomSession> ExtractionStrategy<D> for YoutubeLinkStrategy {
    fn name(&self) -> &'static str {
        "youtube_link"
    }

    fn priority(&self) -> i32 {
        8
    }

    fn can_handle(&self, selector: &Selector) -> bool {
        selector.is_video_link_selector()
    }

    fn validate(&self, config: &ExtractionConfig) -> bool {
        if !config.extract_video_urls {
            debug!("youtube link strategy works best with extract_video_urls enabled");
        }
        true
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
                warn!(selector = selector.pattern(), error = %err, "youtube link extraction failed");
                ExtractionResult::create_failure(err.to_string(), "youtube_link", selector.pattern())
            }
        }
    }
}
