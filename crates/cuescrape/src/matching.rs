// ABOUTME: Title-matching service: normalization, fuzzy equality, UI-noise classification and cleanup.
// ABOUTME: All strategies route extracted titles through this before accepting a record.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::record::SongRecord;

/// Noise suffixes stripped during normalization, tried in order; at most one
/// is removed.
const NOISE_SUFFIXES: [&str; 6] = [
    " (official video)",
    " (official audio)",
    " (official)",
    " (lyrics)",
    " m/v",
    " | lyrics",
];

/// Leading markers stripped by title cleanup, in order.
const MARKER_PREFIXES: [&str; 7] = [
    "Now Playing:",
    "Current:",
    "Playing:",
    "\u{266a}",
    "\u{266b}",
    "\u{1f3b5}",
    "\u{1f3b6}",
];

/// Substrings that mark text as page chrome rather than a song title.
static UI_KEYWORDS: Lazy<AhoCorasick> = Lazy::new(|| {
    AhoCorasick::new([
        "click",
        "button",
        "menu",
        "login",
        "sign",
        "register",
        "home",
        "about",
        "contact",
        "help",
        "settings",
        "profile",
        "search",
        "filter",
        "sort",
        "view",
        "show",
        "hide",
        "next",
        "previous",
        "back",
        "forward",
        "submit",
        "cancel",
        "song requests",
        "refresh",
        "queue",
        "loading",
        "error",
        "song queue",
        "song history",
        "requested by",
        "played",
        "ago",
        "by ",
        "duration:",
        "status:",
        "page ",
    ])
    .expect("static keyword set")
});

static PAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^page\s*\d+$").unwrap());
static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());
static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}$").unwrap());
static ATTRIBUTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(by|requested by|played)\s+\w+.*\d+\s+(hour|minute|second)s?\s+ago$").unwrap()
});

/// Single words that are navigation chrome, never songs.
const SINGLE_WORD_UI: [&str; 6] = ["refresh", "loading", "error", "menu", "home", "back"];

/// Exact labels belonging to the page's search controls.
const SEARCH_UI_EXACT: [&str; 4] = ["search youtube", "youtube search", "search", "youtube"];

/// Tuning knobs for fuzzy matching.
#[derive(Debug, Clone, Copy)]
pub struct MatcherOptions {
    /// Word-overlap similarity must strictly exceed this for a match.
    pub jaccard_threshold: f64,
    /// The shorter normalized string must be strictly longer than this for a
    /// containment match; guards against short-string false positives.
    pub containment_floor: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            jaccard_threshold: 0.7,
            containment_floor: 10,
        }
    }
}

/// Service for comparing, classifying and cleaning song titles.
#[derive(Debug, Clone, Default)]
pub struct TitleMatcher {
    opts: MatcherOptions,
}

impl TitleMatcher {
    pub fn new(opts: MatcherOptions) -> Self {
        Self { opts }
    }

    /// Build a matcher from the tuning fields of an extraction config.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(MatcherOptions {
            jaccard_threshold: config.jaccard_threshold,
            containment_floor: config.containment_floor,
        })
    }

    /// Normalize a title for comparison: lowercase, trim, strip at most one
    /// noise suffix, drop everything outside `[a-z0-9 ]`, collapse whitespace.
    /// Idempotent.
    pub fn normalize(&self, title: &str) -> String {
        let mut t = title.trim().to_lowercase();
        for suffix in NOISE_SUFFIXES {
            if let Some(stripped) = t.strip_suffix(suffix) {
                t = stripped.trim_end().to_string();
                break;
            }
        }
        let cleaned: String = t
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// True if two titles likely refer to the same song: normalized equality,
    /// then containment above the length floor, then word-set Jaccard
    /// similarity strictly above the threshold.
    pub fn titles_match(&self, a: &str, b: &str) -> bool {
        let na = self.normalize(a);
        let nb = self.normalize(b);

        if na == nb {
            return true;
        }

        let (shorter, longer) = if na.len() <= nb.len() {
            (&na, &nb)
        } else {
            (&nb, &na)
        };
        if longer.contains(shorter.as_str()) && shorter.len() > self.opts.containment_floor {
            return true;
        }

        let wa: HashSet<&str> = na.split_whitespace().collect();
        let wb: HashSet<&str> = nb.split_whitespace().collect();
        if !wa.is_empty() && !wb.is_empty() {
            let intersection = wa.intersection(&wb).count();
            let union = wa.union(&wb).count();
            if intersection as f64 / union as f64 > self.opts.jaccard_threshold {
                return true;
            }
        }

        false
    }

    /// True if two records likely describe the same song.
    pub fn records_match(&self, a: &SongRecord, b: &SongRecord) -> bool {
        self.titles_match(a.title(), b.title())
    }

    /// True if the text looks like page chrome rather than a song title.
    pub fn is_ui_text(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.chars().count() > 100 {
            return true;
        }

        let lower = trimmed.to_lowercase();
        if UI_KEYWORDS.is_match(&lower) {
            return true;
        }
        if PAGE_RE.is_match(&lower) {
            return true;
        }
        if DIGITS_RE.is_match(&lower) && lower.len() <= 3 {
            return true;
        }
        if TIME_RE.is_match(trimmed) {
            return true;
        }
        if ATTRIBUTION_RE.is_match(&lower) {
            return true;
        }
        if trimmed.chars().count() < 5 && !trimmed.chars().any(|c| c.is_alphabetic()) {
            return true;
        }
        if SINGLE_WORD_UI.contains(&lower.as_str()) {
            return true;
        }
        if SEARCH_UI_EXACT.contains(&lower.as_str()) {
            return true;
        }

        false
    }

    /// Clean a title for display: collapse whitespace, strip leading markers.
    pub fn clean_title(&self, text: &str) -> String {
        let mut title = text.split_whitespace().collect::<Vec<_>>().join(" ");
        for prefix in MARKER_PREFIXES {
            if let Some(stripped) = title.strip_prefix(prefix) {
                title = stripped.trim_start().to_string();
            }
        }
        title
    }
}
