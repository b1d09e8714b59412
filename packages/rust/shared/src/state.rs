//! The mutable run-state aggregate threaded through the control loop.
//!
//! `RunState` is owned exclusively by the run driver and passed by `&mut`
//! to each stage. All invariant-bearing mutations (query dedup, attempted
//! tracking, result uniqueness) go through the methods here, so no stage
//! can violate the uniqueness or ordering guarantees.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Goal, GoalStatus, Record, RunId};

/// Fallback target when the planner cannot determine a quantity.
pub const DEFAULT_TARGET_COUNT: usize = 10;

/// Mutable state of a single goal run.
///
/// Created once per goal invocation, mutated in place through one round at
/// a time, and summarized into a report when a terminal status is reached.
/// No `RunState` outlives its run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run identifier, for logs and reports.
    id: RunId,
    /// The immutable goal.
    goal: Goal,
    /// How many results we are after. Set once by the planner.
    target_count: usize,
    /// Whether the planner has fixed the target (vs. the provisional default).
    #[serde(default)]
    target_fixed: bool,
    /// Accepted results in discovery order, unique by URL and email.
    results: Vec<Record>,
    /// Every query ever proposed, in first-appearance order, no duplicates.
    queries: Vec<String>,
    /// Queries already executed in some round. Always a subset of `queries`.
    attempted: HashSet<String>,
    /// Lifecycle status; terminal states freeze the run.
    status: GoalStatus,
    /// Completed round counter.
    iteration: usize,
    /// Ceiling on `iteration`; reaching it fails the run.
    max_iterations: usize,
    /// Last error text seen during a round. Informational only.
    last_error: Option<String>,
}

impl RunState {
    /// Initialize state for a new run with a provisional target.
    ///
    /// The provisional target (usually the configured default) holds until
    /// the planner fixes one via [`set_target_count`](Self::set_target_count).
    /// A zero target falls back to [`DEFAULT_TARGET_COUNT`].
    pub fn new(goal: Goal, target_count: usize, max_iterations: usize) -> Self {
        Self {
            id: RunId::new(),
            goal,
            target_count: if target_count == 0 {
                DEFAULT_TARGET_COUNT
            } else {
                target_count
            },
            target_fixed: false,
            results: Vec::new(),
            queries: Vec::new(),
            attempted: HashSet::new(),
            status: GoalStatus::Pending,
            iteration: 0,
            max_iterations,
            last_error: None,
        }
    }

    // -- read access ---------------------------------------------------------

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn results(&self) -> &[Record] {
        &self.results
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn attempted(&self) -> &HashSet<String> {
        &self.attempted
    }

    pub fn status(&self) -> GoalStatus {
        self.status
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Queries proposed but not yet executed, in proposal order.
    pub fn unattempted_queries(&self) -> Vec<String> {
        self.queries
            .iter()
            .filter(|q| !self.attempted.contains(*q))
            .cloned()
            .collect()
    }

    // -- mutation ------------------------------------------------------------

    /// Set the target count. The first call replaces the provisional
    /// default; after that the target never decreases.
    pub fn set_target_count(&mut self, target: usize) {
        if target == 0 {
            return;
        }
        if self.target_fixed {
            self.target_count = self.target_count.max(target);
        } else {
            self.target_count = target;
            self.target_fixed = true;
        }
    }

    pub fn set_status(&mut self, status: GoalStatus) {
        self.status = status;
    }

    /// Record a proposed query. Returns `false` if it was already known.
    pub fn push_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query.is_empty() || self.queries.contains(&query) {
            return false;
        }
        self.queries.push(query);
        true
    }

    /// Merge a batch of proposed queries, preserving first-appearance order.
    /// Returns how many were new.
    pub fn push_queries<I, S>(&mut self, queries: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for query in queries {
            if self.push_query(query) {
                added += 1;
            }
        }
        added
    }

    /// Mark a query as executed. Unknown queries are first added to the
    /// ledger so `attempted ⊆ queries` holds by construction.
    pub fn mark_attempted(&mut self, query: &str) {
        if !self.queries.iter().any(|q| q == query) {
            self.queries.push(query.to_string());
        }
        self.attempted.insert(query.to_string());
    }

    /// Insert a result if it collides with nothing already accepted.
    ///
    /// Collision means: same non-empty `url` as an existing record, or any
    /// shared element between `emails` sets. First-discovered wins; a
    /// colliding record is dropped and `false` returned.
    pub fn insert_record(&mut self, record: Record) -> bool {
        for existing in &self.results {
            if !record.url.is_empty() && record.url == existing.url {
                return false;
            }
            if record
                .emails
                .iter()
                .any(|e| existing.emails.contains(e))
            {
                return false;
            }
        }
        self.results.push(record);
        true
    }

    /// Bump the round counter by exactly one.
    pub fn bump_iteration(&mut self) {
        self.iteration += 1;
    }

    /// Note the most recent error text for the report. Never drives control
    /// flow.
    pub fn note_error(&mut self, error: impl Into<String>) {
        self.last_error = Some(error.into());
    }

    /// Keep only the first `target_count` results (earliest discovered).
    pub fn truncate_results(&mut self) {
        self.results.truncate(self.target_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchHit;

    fn record(url: &str, emails: &[&str]) -> Record {
        let mut r = Record::from_hit(&SearchHit {
            title: "t".into(),
            url: url.into(),
            snippet: "s".into(),
        });
        r.emails = emails.iter().map(|e| e.to_string()).collect();
        r
    }

    fn state() -> RunState {
        RunState::new(Goal::new("find 10 recruiter emails"), DEFAULT_TARGET_COUNT, 5)
    }

    #[test]
    fn query_ledger_deduplicates_preserving_order() {
        let mut st = state();
        assert!(st.push_query("a"));
        assert!(st.push_query("b"));
        assert!(!st.push_query("a"));
        assert_eq!(st.push_queries(["b", "c", "c", "d"]), 2);
        assert_eq!(st.queries(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn attempted_is_subset_of_queries() {
        let mut st = state();
        st.push_query("known");
        st.mark_attempted("known");
        st.mark_attempted("never proposed");

        for q in st.attempted() {
            assert!(st.queries().contains(q));
        }
        assert_eq!(
            st.unattempted_queries(),
            Vec::<String>::new(),
            "everything marked attempted"
        );
    }

    #[test]
    fn unattempted_preserves_proposal_order() {
        let mut st = state();
        st.push_queries(["q1", "q2", "q3"]);
        st.mark_attempted("q2");
        assert_eq!(st.unattempted_queries(), ["q1", "q3"]);
    }

    #[test]
    fn url_collision_keeps_first_record() {
        let mut st = state();
        let mut first = record("https://a.example", &[]);
        first.title = "first".into();
        let mut second = record("https://a.example", &[]);
        second.title = "second".into();

        assert!(st.insert_record(first));
        assert!(!st.insert_record(second));
        assert_eq!(st.results().len(), 1);
        assert_eq!(st.results()[0].title, "first");
    }

    #[test]
    fn email_collision_rejects_on_any_shared_element() {
        let mut st = state();
        assert!(st.insert_record(record("https://a.example", &["x@a.com", "y@a.com"])));
        // Different URL, but one overlapping address.
        assert!(!st.insert_record(record("https://b.example", &["z@b.com", "y@a.com"])));
        assert!(st.insert_record(record("https://c.example", &["z@b.com"])));
        assert_eq!(st.results().len(), 2);
    }

    #[test]
    fn empty_urls_never_collide() {
        let mut st = state();
        assert!(st.insert_record(record("", &["a@a.com"])));
        assert!(st.insert_record(record("", &["b@b.com"])));
        assert_eq!(st.results().len(), 2);
    }

    #[test]
    fn provisional_target_comes_from_caller() {
        let st = RunState::new(Goal::new("find conference talks"), 25, 5);
        assert_eq!(st.target_count(), 25);

        let st = RunState::new(Goal::new("find conference talks"), 0, 5);
        assert_eq!(st.target_count(), DEFAULT_TARGET_COUNT);
    }

    #[test]
    fn first_target_replaces_provisional_default() {
        let mut st = state();
        assert_eq!(st.target_count(), DEFAULT_TARGET_COUNT);
        st.set_target_count(3);
        assert_eq!(st.target_count(), 3);
    }

    #[test]
    fn target_count_never_decreases_once_fixed() {
        let mut st = state();
        st.set_target_count(25);
        assert_eq!(st.target_count(), 25);
        st.set_target_count(3);
        assert_eq!(st.target_count(), 25);
        st.set_target_count(0);
        assert_eq!(st.target_count(), 25);
    }

    #[test]
    fn truncate_keeps_earliest_results() {
        let mut st = state();
        st.set_target_count(2);
        for i in 0..4 {
            st.insert_record(record(&format!("https://r{i}.example"), &[]));
        }
        st.truncate_results();
        assert_eq!(st.results().len(), 2);
        assert_eq!(st.results()[0].url, "https://r0.example");
        assert_eq!(st.results()[1].url, "https://r1.example");
    }

    #[test]
    fn state_serializes_roundtrip() {
        let mut st = state();
        st.push_queries(["q1", "q2"]);
        st.mark_attempted("q1");
        st.insert_record(record("https://a.example", &["a@a.com"]));
        st.note_error("search timed out");

        let json = serde_json::to_string(&st).expect("serialize");
        let parsed: RunState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.queries(), st.queries());
        assert_eq!(parsed.results().len(), 1);
        assert_eq!(parsed.last_error(), Some("search timed out"));
    }
}
