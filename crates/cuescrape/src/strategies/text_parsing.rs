// ABOUTME: Text-parsing extraction strategy, the last-resort fallback over raw page text.
// ABOUTME: Splits concatenated element text into lines and keeps only song-shaped candidates.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{info, warn};

use crate::config::ExtractionConfig;
use crate::dom::{DomError, DomSession, ElementHandle};
use crate::matching::TitleMatcher;
use crate::record::SongRecord;
use crate::result::ExtractionResult;
use crate::selector::Selector;
use crate::strategies::{accept_title, cap_reached, ExtractionStrategy};

/// Hard cap on candidates per run; raw text is noisy and false positives grow
/// fast past this.
const MAX_CANDIDATES: usize = 50;

/// Prefixes that mark a line as a URL or technical content.
const URL_PREFIXES: [&str; 3] = ["http", "www", "ftp"];

/// UI words that disqualify a line outright.
const LINE_UI_KEYWORDS: [&str; 11] = [
    "click", "toggle", "menu", "button", "login", "sign up", "home", "about", "contact", "help",
    "settings",
];

/// Phrases that are never song titles.
const LINE_STOPWORDS: [&str; 8] = [
    "loading",
    "please wait",
    "error",
    "not found",
    "no results",
    "empty",
    "none",
    "null",
];

/// Parses song titles out of raw text content. Only handles fallback
/// selectors; everything it accepts still has to survive the shared title
/// filters.
#[derive(Debug, Default)]
pub struct TextParsingStrategy;

impl TextParsingStrategy {
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
        let page_text = if matches!(selector.pattern(), "body" | "*") {
            match dom.find("body")?.into_iter().next() {
                Some(body) => body.text()?,
                None => String::new(),
            }
        } else {
            let elements = dom.find(selector.pattern())?;
            let mut parts = Vec::new();
            for element in &elements {
                if let Ok(text) = element.text() {
                    if !text.trim().is_empty() {
                        parts.push(text);
                    }
                }
            }
            parts.join("\n")
        };

        let captured_at = Utc::now();
        let mut songs = Vec::new();
        let mut seen = HashSet::new();
        let line_count = page_text.lines().count();

        for (line_number, line) in page_text.lines().enumerate() {
            let line = line.trim();
            if !self.is_candidate_line(line, config) {
                continue;
            }
            let Some(title) = accept_title(matcher, config, line) else {
                continue;
            };

            // Deduplicate within the run by normalized text.
            let normalized = matcher.normalize(&title);
            if !seen.insert(normalized) {
                continue;
            }

            match SongRecord::new(&title, selector.pattern(), line_number, captured_at) {
                Ok(record) => songs.push(record),
                Err(err) => {
                    warn!(line_number, error = %err, "invalid song data from text line");
                    continue;
                }
            }

            if songs.len() >= MAX_CANDIDATES || cap_reached(config, songs.len()) {
                break;
            }
        }

        info!(
            songs = songs.len(),
            lines = line_count,
            "text parsing pass complete"
        );

        // The combined text is processed as one unit.
        let mut result =
            ExtractionResult::create_success(songs, "text_parsing", selector.pattern(), 1);
        result.add_metadata("text_length", serde_json::json!(page_text.chars().count()));
        result.add_metadata("lines_processed", serde_json::json!(line_count));
        Ok(result)
    }

    /// Whether a line of text could plausibly be a song title.
    fn is_candidate_line(&self, line: &str, config: &ExtractionConfig) -> bool {
        let len = line.chars().count();
        if len < config.min_title_length || len < 5 || len > config.max_title_length {
            return false;
        }

        let lower = line.to_lowercase();
        if URL_PREFIXES.iter().any(|p| lower.starts_with(p)) {
            return false;
        }
        if LINE_UI_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return false;
        }
        if LINE_STOPWORDS.contains(&lower.trim()) {
            return false;
        }

        // Lines dominated by digits and punctuation are timestamps, counters
        // or separators, not titles.
        let noise = line
            .chars()
            .filter(|c| c.is_ascii_digit() || (!c.is_alphanumeric() && *c != ' '))
            .count();
        if noise > len / 2 {
            return false;
        }

        // Highly repetitive lines are decorations.
        let words: Vec<&str> = lower.split_whitespace().collect();
        let unique: HashSet<&&str> = words.iter().collect();
        if unique.len() < (words.len() / 3).max(1) {
            return false;
        }

        true
    }
}

impl<D: DomSession> ExtractionStrategy<D> for TextParsingStrategy {
    fn name(&self) -> &'static str {
        "text_parsing"
    }

    fn priority(&self) -> i32 {
        1
    }

    fn can_handle(&self, selector: &Selector) -> bool {
        selector.is_fallback() || selector.priority() <= 2
    }

    fn validate(&self, config: &ExtractionConfig) -> bool {
        if config.min_title_length < 5 {
            info!("text parsing works better with min_title_length >= 5");
        }
        if !config.skip_ui_text {
            info!("text parsing works better with skip_ui_text enabled");
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
                warn!(selector = selector.pattern(), error = %err, "text parsing extraction failed");
                ExtractionResult::create_failure(err.to_string(), "text_parsing", selector.pattern())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> TextParsingStrategy {
        TextParsingStrategy::new()
    }

    #[test]
    fn test_candidate_line_accepts_plain_titles() {
        let config = ExtractionConfig::default();
        assert!(strategy().is_candidate_line("Bohemian Rhapsody", &config));
        assert!(strategy().is_candidate_line("Imagine - John Lennon", &config));
    }

    #[test]
    fn test_candidate_line_rejects_urls_and_ui() {
        let config = ExtractionConfig::default();
        assert!(!strategy().is_candidate_line("https://example.com/page", &config));
        assert!(!strategy().is_candidate_line("www.example.com", &config));
        assert!(!strategy().is_candidate_line("Click here to sign up", &config));
        assert!(!strategy().is_candidate_line("loading", &config));
    }

    #[test]
    fn test_candidate_line_rejects_digit_heavy_lines() {
        let config = ExtractionConfig::default();
        assert!(!strategy().is_candidate_line("12:34 / 56:78", &config));
        assert!(!strategy().is_candidate_line("=== 123456789 ===", &config));
    }

    #[test]
    fn test_candidate_line_rejects_repetitive_lines() {
        let config = ExtractionConfig::default();
        assert!(!strategy().is_candidate_line("la la la la la la la la la", &config));
    }

    #[test]
    fn test_candidate_line_rejects_short_lines() {
        let config = ExtractionConfig::default();
        assert!(!strategy().is_candidate_line("abcd", &config));
        assert!(!strategy().is_candidate_line("", &config));
    }
}
