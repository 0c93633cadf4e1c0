// ABOUTME: ExtractionCoordinator sequencing the four strategies across selectors and merging output.
// ABOUTME: Exposes the comprehensive, deduplicated, optimized, and best-effort policies.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::json;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::dom::DomSession;
use crate::matching::TitleMatcher;
use crate::record::SongRecord;
use crate::result::ExtractionResult;
use crate::selector::{default_selectors, Selector};
use crate::strategies::{
    ExtractionStrategy, GeneralElementStrategy, TableRowStrategy, TextParsingStrategy,
    YoutubeLinkStrategy,
};

/// Merge priority for a strategy name, used when deduplicating and breaking
/// best-effort ties. Unknown strategy names get 0 so third-party strategies
/// merge after all built-in ones.
fn merge_priority(strategy_name: &str) -> i32 {
    match strategy_name {
        "table_row" => 10,
        "youtube_link" => 8,
        "general_element" => 5,
        "text_parsing" => 1,
        _ => 0,
    }
}

/// Coordinates the extraction strategies across a selector set.
///
/// Holds the strategies sorted descending by priority and dispatches them by
/// iteration. No policy here is fatal: the worst outcome of a run is an empty
/// or partial record set, which callers treat as "retry next cycle".
pub struct ExtractionCoordinator<D: DomSession> {
    strategies: Vec<Box<dyn ExtractionStrategy<D>>>,
}

impl<D: DomSession> ExtractionCoordinator<D> {
    pub fn new() -> Self {
        let mut strategies: Vec<Box<dyn ExtractionStrategy<D>>> = vec![
            Box::new(TableRowStrategy::new()),
            Box::new(YoutubeLinkStrategy::new()),
            Box::new(GeneralElementStrategy::new()),
            Box::new(TextParsingStrategy::new()),
        ];
        strategies.sort_by_key(|s| std::cmp::Reverse(s.priority()));
        info!(count = strategies.len(), "initialized extraction strategies");
        Self { strategies }
    }

    /// Names of the held strategies, in dispatch order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// The standard selector scan set.
    pub fn default_selectors(&self) -> Vec<Selector> {
        default_selectors()
    }

    /// Run every compatible strategy against every selector, highest selector
    /// priority first, and return one result per (strategy, selector) pair.
    /// An unexpected panic inside a strategy is synthesized into a failure
    /// result rather than escalated.
    pub fn extract_comprehensive(
        &self,
        dom: &D,
        selectors: &[Selector],
        config: &ExtractionConfig,
    ) -> Vec<ExtractionResult> {
        let mut all_results = Vec::new();

        for selector in ordered_by_priority(selectors) {
            debug!(selector = selector.pattern(), "processing selector");
            let mut handled = false;

            for strategy in &self.strategies {
                if !strategy.can_handle(selector) {
                    continue;
                }
                handled = true;
                if !strategy.validate(config) {
                    // Advisory only; log and run anyway.
                    warn!(
                        strategy = strategy.name(),
                        "strategy reported configuration concerns"
                    );
                }

                let result = self.run_strategy(strategy.as_ref(), dom, selector, config);
                info!(
                    strategy = result.strategy_used(),
                    selector = selector.pattern(),
                    songs = result.song_count(),
                    success = result.success(),
                    "strategy run complete"
                );
                all_results.push(result);
            }

            if !handled {
                warn!(
                    selector = selector.pattern(),
                    "no strategy can handle selector"
                );
            }
        }

        all_results
    }

    /// Run Comprehensive, then merge successful results into a single result
    /// with duplicates removed by fuzzy title matching, preferring records
    /// from higher merge-priority strategies.
    pub fn extract_deduplicated(
        &self,
        dom: &D,
        selectors: &[Selector],
        config: &ExtractionConfig,
    ) -> ExtractionResult {
        let all_results = self.extract_comprehensive(dom, selectors, config);
        let matcher = TitleMatcher::from_config(config);
        let songs = combine_and_deduplicate(&all_results, &matcher);

        let total_elements: usize = all_results.iter().map(ExtractionResult::element_count).sum();
        let strategies_used = unique_in_order(all_results.iter().map(|r| r.strategy_used()));
        let selectors_used = unique_in_order(all_results.iter().map(|r| r.selector_used()));
        let successful = all_results.iter().filter(|r| r.success()).count();

        info!(
            songs = songs.len(),
            runs = all_results.len(),
            "coordinator merged unique songs"
        );

        let mut result = ExtractionResult::create_success(
            songs,
            format!("coordinator({})", strategies_used.join(",")),
            format!("multiple({})", selectors_used.join(",")),
            total_elements,
        );
        result.add_metadata("total_results", json!(all_results.len()));
        result.add_metadata("successful_results", json!(successful));
        result.add_metadata("failed_results", json!(all_results.len() - successful));
        result.add_metadata("strategies_used", json!(strategies_used));
        result.add_metadata("selectors_used", json!(selectors_used));
        result.add_metadata("deduplication_enabled", json!(true));

        for individual in &all_results {
            for warning in individual.warnings() {
                result.add_warning(format!("{}: {}", individual.strategy_used(), warning));
            }
        }

        result
    }

    /// Deduplicated extraction that first seeds the config's known-URL table
    /// from already-resolved records, so the table-row strategy skips the
    /// resolution cascade for titles seen on previous cycles. This exists to
    /// avoid repeating the cascade's slow click-capture step every poll.
    pub fn extract_optimized(
        &self,
        dom: &D,
        selectors: &[Selector],
        config: &mut ExtractionConfig,
        known_urls: &HashMap<String, String>,
    ) -> ExtractionResult {
        let matcher = TitleMatcher::from_config(config);
        let normalized: HashMap<String, String> = known_urls
            .iter()
            .map(|(title, url)| (matcher.normalize(title), url.clone()))
            .collect();
        info!(
            known = normalized.len(),
            "seeding known video urls for optimized extraction"
        );
        config.set_known_urls(normalized.clone());

        let mut result = self.extract_deduplicated(dom, selectors, config);

        let mut reused = 0usize;
        let mut extracted = 0usize;
        for song in result.songs() {
            if let Some(url) = &song.video_url {
                let key = matcher.normalize(song.title());
                if normalized.get(&key) == Some(url) {
                    reused += 1;
                } else {
                    extracted += 1;
                }
            }
        }
        if reused > 0 {
            info!(reused, extracted, "known video urls reused");
        }
        result.add_metadata("urls_reused", json!(reused));
        result.add_metadata("urls_extracted", json!(extracted));
        result
    }

    /// Scan selectors and strategies in priority order, keeping a running
    /// best result, and stop as soon as the best is a success with at least
    /// `min_songs_for_success` songs. Returns a canonical failure result only
    /// when no strategy succeeded anywhere.
    pub fn extract_best_effort(
        &self,
        dom: &D,
        selectors: &[Selector],
        config: &ExtractionConfig,
    ) -> ExtractionResult {
        let mut best: Option<ExtractionResult> = None;

        'selectors: for selector in ordered_by_priority(selectors) {
            for strategy in &self.strategies {
                if !strategy.can_handle(selector) {
                    continue;
                }
                let result = self.run_strategy(strategy.as_ref(), dom, selector, config);

                if is_better(&result, best.as_ref()) {
                    debug!(
                        strategy = result.strategy_used(),
                        songs = result.song_count(),
                        "new best result"
                    );
                    best = Some(result);
                }

                if let Some(current) = &best {
                    if current.success() && current.song_count() >= config.min_songs_for_success {
                        info!(
                            songs = current.song_count(),
                            "sufficient songs found, stopping scan"
                        );
                        break 'selectors;
                    }
                }
            }
        }

        best.unwrap_or_else(|| {
            ExtractionResult::create_failure(
                "no extraction strategy produced results",
                "coordinator",
                "multiple",
            )
        })
    }

    fn run_strategy(
        &self,
        strategy: &dyn ExtractionStrategy<D>,
        dom: &D,
        selector: &Selector,
        config: &ExtractionConfig,
    ) -> ExtractionResult {
        let name = strategy.name();
        match catch_unwind(AssertUnwindSafe(|| strategy.extract(dom, selector, config))) {
            Ok(result) => result,
            Err(_) => {
                warn!(strategy = name, "strategy panicked, recording failure");
                ExtractionResult::create_failure(
                    format!("strategy {} panicked", name),
                    name,
                    selector.pattern(),
                )
            }
        }
    }
}

impl<D: DomSession> Default for ExtractionCoordinator<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Selectors sorted descending by priority; the sort is stable, so equal
/// priorities keep their caller-supplied order.
fn ordered_by_priority(selectors: &[Selector]) -> Vec<&Selector> {
    let mut ordered: Vec<&Selector> = selectors.iter().collect();
    ordered.sort_by_key(|s| std::cmp::Reverse(s.priority()));
    ordered
}

/// Merge songs from successful results, walking higher merge-priority
/// strategies first and accepting a record only if its title matches no
/// already-accepted record.
fn combine_and_deduplicate(
    results: &[ExtractionResult],
    matcher: &TitleMatcher,
) -> Vec<SongRecord> {
    let mut successful: Vec<&ExtractionResult> = results.iter().filter(|r| r.success()).collect();
    successful.sort_by_key(|r| std::cmp::Reverse(merge_priority(r.strategy_used())));

    let mut accepted: Vec<SongRecord> = Vec::new();
    for result in successful {
        for song in result.songs() {
            let duplicate = accepted
                .iter()
                .any(|existing| matcher.records_match(song, existing));
            if duplicate {
                debug!(title = song.title(), "skipped duplicate song");
            } else {
                debug!(title = song.title(), "added unique song");
                accepted.push(song.clone());
            }
        }
    }
    accepted
}

/// Total order for best-effort: any success beats any failure, then higher
/// song count, then higher merge priority. A failure never replaces an
/// absent best, so best-effort can only return failure when nothing
/// succeeded.
fn is_better(new: &ExtractionResult, current: Option<&ExtractionResult>) -> bool {
    let Some(current) = current else {
        return new.success();
    };
    if !current.success() && new.success() {
        return true;
    }
    if !new.success() {
        return false;
    }
    if new.song_count() != current.song_count() {
        return new.song_count() > current.song_count();
    }
    merge_priority(new.strategy_used()) > merge_priority(current.strategy_used())
}

fn unique_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item) {
            out.push(item.to_string());
        }
    }
    out
}
