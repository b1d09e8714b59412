//! One search round: a bounded batch of queries driven through the search
//! and fetch collaborators, feeding deduplicated records into the state.
//!
//! Error policy: a collaborator failure for one query costs that query its
//! hits and is noted in `last_error`; it never aborts the round. The round
//! counter advances exactly once per call, even when no query ran.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, instrument, warn};

use forager_extract::{extract, is_relevant};
use forager_search::{PageFetcher, SearchProvider};
use forager_shared::{Category, Record, Result, RunConfig, RunState};

use crate::driver::ProgressReporter;

/// How many enhanced variants of a base query actually execute.
const MAX_VARIANTS_PER_QUERY: usize = 2;

/// Execute one round against the given state.
#[instrument(skip_all, fields(iteration = state.iteration() + 1, goal = %state.goal().text))]
pub async fn run_round(
    state: &mut RunState,
    config: &RunConfig,
    search: &dyn SearchProvider,
    fetcher: &dyn PageFetcher,
    progress: &dyn ProgressReporter,
) {
    let selected: Vec<String> = state
        .unattempted_queries()
        .into_iter()
        .take(config.queries_per_round)
        .collect();

    info!(queries = selected.len(), "starting search round");

    for (i, query) in selected.iter().enumerate() {
        progress.searching(query, i + 1, selected.len());

        if i > 0 {
            pace(config.search_delay_ms).await;
        }

        if let Err(e) = execute_query(state, config, search, fetcher, progress, query).await {
            warn!(query = %query, error = %e, "query failed, continuing round");
            state.note_error(e.to_string());
        }

        // Attempted even on error, so the ledger never re-selects it.
        state.mark_attempted(query);
    }

    state.bump_iteration();

    info!(
        results = state.results().len(),
        target = state.target_count(),
        "round complete"
    );
}

/// Run one base query: enhanced variants → search → filter → fetch →
/// extract → dedup insert.
async fn execute_query(
    state: &mut RunState,
    config: &RunConfig,
    search: &dyn SearchProvider,
    fetcher: &dyn PageFetcher,
    progress: &dyn ProgressReporter,
    query: &str,
) -> Result<()> {
    let category = state.goal().category;

    for (i, variant) in enhanced_queries(query, category).iter().enumerate() {
        if i > 0 {
            pace(config.search_delay_ms).await;
        }

        let hits = search.search(variant, config.results_per_search).await?;
        debug!(variant = %variant, hits = hits.len(), "search returned");

        for hit in hits {
            if !is_relevant(&hit, category) {
                continue;
            }

            let mut record = Record::from_hit(&hit);

            // A fetch failure degrades to the base record; the hit survives.
            let content = match fetcher.fetch(&hit.url).await {
                Ok(content) => content,
                Err(e) => {
                    debug!(url = %hit.url, error = %e, "fetch failed, keeping base record");
                    String::new()
                }
            };

            if !content.is_empty() {
                extract(&content, &hit.url, category).merge_into(&mut record);
            }

            if state.insert_record(record) {
                progress.result_found(state.results().len(), state.target_count());
            }

            pace(config.fetch_delay_ms).await;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Query enhancement
// ---------------------------------------------------------------------------

/// Category-specific suffixes that sharpen a web search.
fn search_tricks(category: Category) -> &'static [&'static str] {
    match category {
        Category::Email => &[
            "site:linkedin.com",
            "\"@company.com\"",
            "contact email",
            "recruiter email",
            "hiring manager",
        ],
        Category::Website => &["best tools 2024", "top resources", "list of sites", "directory"],
        Category::Job => &[
            "site:indeed.com",
            "site:glassdoor.com",
            "site:linkedin.com/jobs",
            "hiring",
            "careers",
        ],
        Category::General => &[],
    }
}

/// The raw query plus trick-suffixed variants, capped at the number of
/// variants a round actually executes.
fn enhanced_queries(query: &str, category: Category) -> Vec<String> {
    let mut variants = vec![query.to_string()];
    for trick in search_tricks(category).iter().take(MAX_VARIANTS_PER_QUERY) {
        variants.push(format!("{query} {trick}"));
    }
    variants.truncate(MAX_VARIANTS_PER_QUERY);
    variants
}

// ---------------------------------------------------------------------------
// Pacing
// ---------------------------------------------------------------------------

/// Sleep for a random interval in `[min, max]` ms. A zero max disables
/// pacing (tests and scripted runs).
async fn pace(range: [u64; 2]) {
    let [min, max] = range;
    if max == 0 {
        return;
    }
    let ms = if min >= max {
        max
    } else {
        rand::rng().random_range(min..=max)
    };
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
