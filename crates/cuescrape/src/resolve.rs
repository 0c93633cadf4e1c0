// ABOUTME: URL resolution cascade: ordered fallback techniques that resolve a video URL for one row.
// ABOUTME: Each step returns Option and swallows its own faults; the terminal search step always succeeds.

//! The video URL resolution cascade.
//!
//! Given a song title and a row handle, the driver tries an ordered list of
//! resolver steps and takes the first value produced. A step's internal
//! faults are treated as "no value" and fall through; they are never
//! surfaced. Steps grow increasingly invasive, ending in click simulation
//! against the live page, so the caller can disable individual steps via the
//! config toggles. The terminal search-URL step is infallible: reaching it is
//! resolution exhaustion, not an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::ExtractionConfig;
use crate::dom::{ContextGuard, DomError, DomSession, ElementHandle};
use crate::matching::TitleMatcher;

/// Known video-host domains.
const VIDEO_DOMAINS: [&str; 2] = ["youtube.com", "youtu.be"];

/// The link control inside a queue row.
pub(crate) const LINK_CONTROL: &str = "button.item-link, a[href*='youtube']";

/// Rows of the separate history region of the page.
const HISTORY_ROWS: &str = "#queue-history tbody tr";

/// The title element inside a queue or history row.
pub(crate) const ROW_TITLE: &str = ".queue-item-title, .song-title, .title";

/// Video thumbnails inside a history row.
const HISTORY_THUMBNAILS: &str = "img[src*='youtube.com']";

static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://(?:www\.)?(?:youtube\.com|youtu\.be)/[^\s"'<>\)]+"#).unwrap()
});

static THUMBNAIL_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/vi/([^/]+)/").unwrap());

static VIDEO_ID_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"youtube\.com/watch\?v=([^&\n?#]+)",
        r"youtu\.be/([^&\n?#]+)",
        r"youtube\.com/embed/([^&\n?#]+)",
        r"youtube\.com/v/([^&\n?#]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Suffixes stripped before building a search URL; these rarely appear in the
/// video titles being searched for.
const SEARCH_STRIP_SUFFIXES: [&str; 5] = [
    " (Official Video)",
    " (Official Audio)",
    " (Official)",
    " (Lyrics)",
    " M/V",
];

/// Script run against the link control to enumerate URL-bearing attributes,
/// including the stringified click handler and the parent's data attributes.
const INSPECT_CONTROL_JS: &str = r#"
var control = arguments[0];
var result = {};
result.dataUrl = control.getAttribute('data-url');
result.dataHref = control.getAttribute('data-href');
result.dataLink = control.getAttribute('data-link');
result.onclick = control.onclick ? control.onclick.toString() : null;
var parent = control.parentElement;
if (parent) {
    result.parentDataUrl = parent.getAttribute('data-url');
    result.parentDataHref = parent.getAttribute('data-href');
}
return result;
"#;

/// Script that pauses and mutes every media element in the active context,
/// run before reading the location of a freshly opened video page.
const SUPPRESS_PLAYBACK_JS: &str = r#"
var videos = document.querySelectorAll('video');
for (var i = 0; i < videos.length; i++) {
    if (arguments[0]) videos[i].pause();
    if (arguments[1]) {
        videos[i].muted = true;
        videos[i].volume = 0;
    }
}
"#;

/// True if the string points at a known video host.
pub fn is_video_url(url: &str) -> bool {
    VIDEO_DOMAINS.iter().any(|domain| url.contains(domain))
}

/// Extract a video id from any of the common video URL forms.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_RES
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Resolve a video URL for one queue row, trying each enabled step in order
/// and taking the first value. Returns `None` only when every step including
/// the terminal search fallback is disabled.
pub fn resolve_video_url<D: DomSession>(
    dom: &D,
    row: &D::Element,
    title: &str,
    config: &ExtractionConfig,
    matcher: &TitleMatcher,
) -> Option<String> {
    let direct = || direct_attribute(row);
    let script = || script_inspection(dom, row);
    let click = || click_capture(dom, row, config);
    let history = || history_thumbnail(dom, title, matcher);

    let steps: [(&str, bool, &dyn Fn() -> Option<String>); 4] = [
        ("direct_attribute", config.try_direct_links, &direct),
        ("script_inspection", config.try_script_inspection, &script),
        ("click_capture", config.try_click_capture, &click),
        ("history_thumbnail", config.try_history_thumbnails, &history),
    ];

    for (name, enabled, step) in steps {
        if !enabled {
            continue;
        }
        if let Some(url) = step() {
            debug!(step = name, %title, %url, "resolved video url");
            return Some(url);
        }
    }

    config.fallback_to_search.then(|| search_url(title))
}

/// Step 1: a URL-bearing attribute directly on the row's link control.
fn direct_attribute<E: ElementHandle>(row: &E) -> Option<String> {
    let controls = row.find(LINK_CONTROL).ok()?;
    for control in controls {
        for attr in ["data-url", "href"] {
            if let Ok(Some(value)) = control.attribute(attr) {
                if is_video_url(&value) {
                    return Some(value);
                }
            }
        }
    }
    None
}

/// Step 2: scripted inspection of the control's candidate attributes and
/// click handler, regex-extracting a video URL from any returned value.
fn script_inspection<D: DomSession>(dom: &D, row: &D::Element) -> Option<String> {
    let control = row.find(LINK_CONTROL).ok()?.into_iter().next()?;
    let value = dom
        .execute_script(INSPECT_CONTROL_JS, Some(&control), &[])
        .ok()?;
    let object = value.as_object()?;
    for (key, candidate) in object {
        let text = match candidate {
            Value::String(s) => s.clone(),
            Value::Null => continue,
            other => other.to_string(),
        };
        if let Some(m) = VIDEO_URL_RE.find(&text) {
            debug!(source = %key, "video url found via script inspection");
            return Some(m.as_str().to_string());
        }
    }
    None
}

/// Step 3: simulate a click, capture the newly opened context's location.
///
/// Playback in the new context is suppressed before the location read so a
/// video page never audibly plays. The context restore is owned by a
/// [`ContextGuard`] and runs even when the read faults.
fn click_capture<D: DomSession>(
    dom: &D,
    row: &D::Element,
    config: &ExtractionConfig,
) -> Option<String> {
    let control = row.find(LINK_CONTROL).ok()?.into_iter().next()?;
    let before = dom.browsing_contexts().ok()?;
    let original = before.first()?.clone();

    dom.simulate_click(&control).ok()?;

    let after = dom.browsing_contexts().ok()?;
    let opened = after.into_iter().find(|ctx| !before.contains(ctx))?;

    let guard = ContextGuard::enter(dom, original, &opened).ok()?;
    let location = read_location_silenced(dom, config);
    if config.close_new_contexts {
        let _ = dom.close_context(&opened);
    }
    drop(guard);

    let location = location.ok()?;
    is_video_url(&location).then_some(location)
}

/// Suppress playback in the active context, then read its location. The
/// suppression script's own faults are ignored; losing it only risks a blip
/// of audio, not a wrong URL.
fn read_location_silenced<D: DomSession>(
    dom: &D,
    config: &ExtractionConfig,
) -> Result<String, DomError> {
    if config.pause_videos || config.mute_audio {
        let _ = dom.execute_script(
            SUPPRESS_PLAYBACK_JS,
            None,
            &[json!(config.pause_videos), json!(config.mute_audio)],
        );
    }
    dom.current_location()
}

/// Step 4: scan the history region for a fuzzy title match and synthesize a
/// canonical URL from its thumbnail's embedded video id.
fn history_thumbnail<D: DomSession>(dom: &D, title: &str, matcher: &TitleMatcher) -> Option<String> {
    let rows = dom.find(HISTORY_ROWS).ok()?;
    for history_row in rows {
        let Some(history_title) = row_title_text(&history_row) else {
            continue;
        };
        if !matcher.titles_match(title, &history_title) {
            continue;
        }
        if let Some(url) = thumbnail_video_url(&history_row) {
            debug!(%title, %url, "video url found via history thumbnail");
            return Some(url);
        }
    }
    None
}

fn row_title_text<E: ElementHandle>(row: &E) -> Option<String> {
    let title_el = row.find(ROW_TITLE).ok()?.into_iter().next()?;
    let text = title_el.text().ok()?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn thumbnail_video_url<E: ElementHandle>(row: &E) -> Option<String> {
    let img = row.find(HISTORY_THUMBNAILS).ok()?.into_iter().next()?;
    let src = img.attribute("src").ok()??;
    let id = THUMBNAIL_ID_RE.captures(&src)?.get(1)?.as_str().to_string();
    Some(format!("https://www.youtube.com/watch?v={}", id))
}

/// Step 5, terminal: a deterministic search URL built from the cleaned title.
/// Always succeeds.
pub fn search_url(title: &str) -> String {
    let mut query = title.trim().to_string();
    for suffix in SEARCH_STRIP_SUFFIXES {
        if let Some(stripped) = query.strip_suffix(suffix) {
            query = stripped.trim_end().to_string();
            break;
        }
    }
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("https://www.youtube.com/results?search_query={}", encoded)
}
