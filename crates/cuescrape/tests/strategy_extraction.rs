// ABOUTME: Integration tests running each extraction strategy against scripted pages.
// ABOUTME: Covers field extraction, robust re-query skips, title fallbacks and text parsing.

mod common;

use pretty_assertions::assert_eq;

use common::PageBuilder;
use cuescrape::config::ExtractionConfig;
use cuescrape::selector::{Selector, SelectorKind};
use cuescrape::strategies::{
    ExtractionStrategy, GeneralElementStrategy, TableRowStrategy, TextParsingStrategy,
    YoutubeLinkStrategy,
};

#[test]
fn table_row_extracts_title_labels_and_url() {
    let (dom, _rows) = common::two_row_queue();
    let config = ExtractionConfig::default();

    let result = TableRowStrategy::new().extract(&dom, &Selector::table_rows(), &config);

    assert!(result.success());
    assert_eq!(result.strategy_used(), "table_row");
    assert_eq!(result.element_count(), 2);
    assert_eq!(result.song_count(), 2);

    let first = &result.songs()[0];
    assert_eq!(first.title(), "Bohemian Rhapsody");
    assert_eq!(first.duration.as_deref(), Some("05:55"));
    assert_eq!(first.requester.as_deref(), Some("By alice"));
    assert_eq!(first.status.as_deref(), Some("Playing now"));
    assert_eq!(
        first.video_url.as_deref(),
        Some("https://www.youtube.com/watch?v=fJ9rUzIMcZQ")
    );
    assert_eq!(first.selector_used, "tr");
    assert_eq!(first.element_index, 0);

    let second = &result.songs()[1];
    assert_eq!(second.title(), "Karma Police");
    assert_eq!(
        second.video_url.as_deref(),
        Some("https://www.youtube.com/watch?v=1uYWYWPc9HU")
    );
}

#[test]
fn table_row_robust_mode_skips_vanished_rows() {
    let (dom, _rows) = common::two_row_queue();
    // The second per-index re-query sees a collection shrunk by one.
    dom.shrink_after_first_find("tr");
    let config = ExtractionConfig::default();

    let result = TableRowStrategy::new().extract(&dom, &Selector::table_rows(), &config);

    // The vanished row is a silent skip, never a failure.
    assert!(result.success());
    assert_eq!(result.element_count(), 2);
    assert_eq!(result.song_count(), 1);
    assert_eq!(result.songs()[0].title(), "Bohemian Rhapsody");
}

#[test]
fn table_row_falls_back_to_first_text_line_for_title() {
    let mut page = PageBuilder::new();
    page.node(&["tr"], "   \nCreep - Radiohead\n03:58");
    let dom = page.build();
    let config = ExtractionConfig::fast();

    let result = TableRowStrategy::new().extract(&dom, &Selector::table_rows(), &config);

    assert_eq!(result.song_count(), 1);
    let song = &result.songs()[0];
    assert_eq!(song.title(), "Creep - Radiohead");
    // No direct link anywhere, so the fast config lands on the search URL.
    assert_eq!(
        song.video_url.as_deref(),
        Some("https://www.youtube.com/results?search_query=Creep+-+Radiohead")
    );
}

#[test]
fn table_row_honors_title_selector_metadata_override() {
    let mut page = PageBuilder::new();
    let row = page.node(&["tr"], "ignored");
    page.child(row, &[".custom-title"], "Paranoid Android");
    let dom = page.build();
    let config = ExtractionConfig::fast();

    let selector = Selector::table_rows()
        .with_metadata("title_selector", serde_json::json!(".custom-title"));
    let result = TableRowStrategy::new().extract(&dom, &selector, &config);

    assert_eq!(result.song_count(), 1);
    assert_eq!(result.songs()[0].title(), "Paranoid Android");
}

#[test]
fn youtube_link_reads_anchor_text_and_href() {
    let mut page = PageBuilder::new();
    let anchor = page.node(&["a[href*='youtube.com']"], "Imagine - John Lennon");
    page.attr(anchor, "href", "https://www.youtube.com/watch?v=YkgkThdzX-8");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let result = YoutubeLinkStrategy::new().extract(&dom, &Selector::video_links(), &config);

    assert!(result.success());
    assert_eq!(result.song_count(), 1);
    let song = &result.songs()[0];
    assert_eq!(song.title(), "Imagine - John Lennon");
    assert_eq!(
        song.video_url.as_deref(),
        Some("https://www.youtube.com/watch?v=YkgkThdzX-8")
    );
}

#[test]
fn youtube_link_falls_back_to_parent_text_when_anchor_text_is_the_url() {
    let mut page = PageBuilder::new();
    let container = page.node(&["div"], "Wonderwall - Oasis https://youtu.be/bx1Bh8ZvH84");
    let anchor = page.child(
        container,
        &["a[href*='youtu.be']"],
        "https://youtu.be/bx1Bh8ZvH84",
    );
    page.attr(anchor, "href", "https://youtu.be/bx1Bh8ZvH84");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let result = YoutubeLinkStrategy::new().extract(&dom, &Selector::video_links(), &config);

    assert_eq!(result.song_count(), 1);
    assert_eq!(result.songs()[0].title(), "Wonderwall - Oasis");
}

#[test]
fn youtube_link_skips_anchors_to_other_hosts() {
    let mut page = PageBuilder::new();
    let anchor = page.node(&["a[href*='youtube.com']"], "Some Song");
    page.attr(anchor, "href", "https://example.com/watch?v=nope");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let result = YoutubeLinkStrategy::new().extract(&dom, &Selector::video_links(), &config);

    assert!(result.success());
    assert_eq!(result.song_count(), 0);
    assert_eq!(result.element_count(), 1);
}

#[test]
fn general_element_prefers_nested_anchor_title_and_url() {
    let mut page = PageBuilder::new();
    let item = page.node(&["li"], "queued 2 minutes ago");
    let anchor = page.child(item, &["a"], "Hotel California - Eagles");
    page.attr(anchor, "href", "https://www.youtube.com/watch?v=EqPtz5qN7HM");
    page.node(&["li"], "Stairway to Heaven");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let result =
        GeneralElementStrategy::new().extract(&dom, &Selector::text_blocks(), &config);

    assert!(result.success());
    assert_eq!(result.element_count(), 2);
    assert_eq!(result.song_count(), 2);

    let linked = &result.songs()[0];
    assert_eq!(linked.title(), "Hotel California - Eagles");
    assert_eq!(
        linked.video_url.as_deref(),
        Some("https://www.youtube.com/watch?v=EqPtz5qN7HM")
    );

    let plain = &result.songs()[1];
    assert_eq!(plain.title(), "Stairway to Heaven");
    assert_eq!(plain.video_url, None);
}

#[test]
fn general_element_skips_short_and_ui_text() {
    let mut page = PageBuilder::new();
    page.node(&["li"], "ok");
    page.node(&["li"], "Refresh");
    page.node(&["li"], "No Surprises");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let result =
        GeneralElementStrategy::new().extract(&dom, &Selector::text_blocks(), &config);

    assert_eq!(result.element_count(), 3);
    assert_eq!(result.song_count(), 1);
    assert_eq!(result.songs()[0].title(), "No Surprises");
}

#[test]
fn text_parsing_keeps_song_shaped_lines_and_deduplicates() {
    let mut page = PageBuilder::new();
    page.node(
        &["body"],
        "Song Requests\n\
         Hotel California - Eagles\n\
         03:45\n\
         Hotel California - Eagles\n\
         Click here to vote\n\
         ====================\n\
         Stairway to Heaven\n\
         Loading",
    );
    let dom = page.build();
    let config = ExtractionConfig::default();

    let selector = Selector::custom("*", SelectorKind::Css, 1)
        .map(Selector::as_fallback)
        .unwrap();
    let result = TextParsingStrategy::new().extract(&dom, &selector, &config);

    assert!(result.success());
    assert_eq!(result.element_count(), 1);
    let titles: Vec<&str> = result.songs().iter().map(|s| s.title()).collect();
    assert_eq!(titles, vec!["Hotel California - Eagles", "Stairway to Heaven"]);
    assert_eq!(
        result.metadata().get("lines_processed"),
        Some(&serde_json::json!(8))
    );
}

#[test]
fn text_parsing_joins_non_body_element_text() {
    let mut page = PageBuilder::new();
    page.node(&["p"], "Karma Police - Radiohead");
    page.node(&["p"], "http://example.com/ignore-me");
    let dom = page.build();
    let config = ExtractionConfig::default();

    let selector = Selector::custom("p", SelectorKind::Css, 1)
        .map(Selector::as_fallback)
        .unwrap();
    let result = TextParsingStrategy::new().extract(&dom, &selector, &config);

    assert_eq!(result.song_count(), 1);
    assert_eq!(result.songs()[0].title(), "Karma Police - Radiohead");
}
