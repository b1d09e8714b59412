//! Goal planning: turning a natural-language goal into a target count and
//! batches of candidate search queries.
//!
//! The [`Planner`] wraps a [`PlanningClient`] (the external LLM service)
//! and never lets it fail the run: every call site has a deterministic
//! fallback, so a planner outage degrades query quality, not liveness.

mod client;
pub mod fallback;

use tracing::{debug, instrument, warn};

use forager_shared::Goal;

pub use client::{OpenRouterClient, PlanningClient};

/// Goal planner with graceful degradation to template queries.
pub struct Planner {
    client: Box<dyn PlanningClient>,
}

impl Planner {
    pub fn new(client: Box<dyn PlanningClient>) -> Self {
        Self { client }
    }

    /// Analyze the goal and extract the desired result quantity.
    ///
    /// Single call, no retry. Any transport or parse failure yields `None`,
    /// leaving the caller's configured default target in place.
    #[instrument(skip_all, fields(goal = %goal.text))]
    pub async fn analyze(&self, goal: &Goal) -> Option<usize> {
        let prompt = format!(
            "Analyze this goal and extract key information:\n\
             Goal: {goal}\n\n\
             Please identify:\n\
             1. What type of content is needed (websites, emails, job links, etc.)\n\
             2. How many items are required\n\
             3. What specific criteria should be met\n\
             4. What search strategies would be most effective\n\n\
             Respond in JSON format with keys: content_type, quantity, criteria, search_strategies",
            goal = goal.text
        );

        match self.client.complete(&prompt).await {
            Ok(text) => match parse_quantity(&text) {
                Some(quantity) => {
                    debug!(quantity, "goal analyzed");
                    Some(quantity)
                }
                None => {
                    warn!("analysis response unparseable, keeping default target");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "goal analysis failed, keeping default target");
                None
            }
        }
    }

    /// Propose a batch of diverse, previously-untried search queries.
    ///
    /// Falls back to category template queries on failure. Callers merge
    /// the returned list into the ledger with duplicate suppression.
    #[instrument(skip_all, fields(goal = %goal.text, current_count, target_count))]
    pub async fn propose_queries(
        &self,
        goal: &Goal,
        current_count: usize,
        target_count: usize,
        previous_queries: &[String],
    ) -> Vec<String> {
        let prompt = format!(
            "Generate 5-10 diverse search queries for this goal: {goal}\n\n\
             Current results count: {current_count}/{target_count}\n\
             Previously tried queries: {previous:?}\n\n\
             Create search queries that:\n\
             1. Are specific and targeted\n\
             2. Use different keywords and approaches\n\
             3. Haven't been tried before\n\
             4. Are likely to yield the required content type\n\n\
             Return as a JSON list of strings.",
            goal = goal.text,
            previous = previous_queries,
        );

        match self.client.complete(&prompt).await {
            Ok(text) => match parse_query_list(&text) {
                Some(queries) if !queries.is_empty() => {
                    debug!(count = queries.len(), "queries proposed");
                    queries
                }
                _ => {
                    warn!("strategy response unparseable, using fallback queries");
                    fallback::proposal_queries(goal)
                }
            },
            Err(e) => {
                warn!(error = %e, "strategy generation failed, using fallback queries");
                fallback::proposal_queries(goal)
            }
        }
    }

    /// Refine the strategy once every proposed query has been attempted.
    ///
    /// Same shape as [`propose_queries`](Self::propose_queries), but
    /// explicitly conditioned on what was already tried. Falls back to
    /// per-goal-term templates.
    #[instrument(skip_all, fields(goal = %goal.text, current_count, target_count))]
    pub async fn refine_queries(
        &self,
        goal: &Goal,
        target_count: usize,
        current_count: usize,
        attempted_queries: &[String],
    ) -> Vec<String> {
        let prompt = format!(
            "Based on the current progress, suggest new search strategies:\n\n\
             Goal: {goal}\n\
             Target: {target_count} items\n\
             Current results: {current_count} items\n\
             Tried queries: {tried:?}\n\n\
             What new approaches, keywords, or sources should we try?\n\
             Return 5 new search queries as a JSON list.",
            goal = goal.text,
            tried = attempted_queries,
        );

        match self.client.complete(&prompt).await {
            Ok(text) => match parse_query_list(&text) {
                Some(queries) if !queries.is_empty() => {
                    debug!(count = queries.len(), "refined queries proposed");
                    queries
                }
                _ => {
                    warn!("refinement response unparseable, using fallback queries");
                    fallback::refinement_queries(goal)
                }
            },
            Err(e) => {
                warn!(error = %e, "refinement failed, using fallback queries");
                fallback::refinement_queries(goal)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient response parsing
// ---------------------------------------------------------------------------

/// Strip Markdown code fences that chat models love to wrap JSON in.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the fence line (possibly "```json") and the closing fence.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or(rest);
    body.trim().trim_end_matches("```").trim()
}

/// Pull a positive quantity out of an analysis response.
///
/// Accepts `{"quantity": 10}` and `{"quantity": "10"}`.
fn parse_quantity(text: &str) -> Option<usize> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fences(text)).ok()?;
    let quantity = value.get("quantity")?;

    let n = match quantity {
        serde_json::Value::Number(n) => n.as_u64()?,
        serde_json::Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    (n > 0).then_some(n as usize)
}

/// Pull a list of non-empty query strings out of a strategy response.
fn parse_query_list(text: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(strip_code_fences(text)).ok()?;
    let items = value.as_array()?;

    let queries: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Some(queries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forager_shared::{ForagerError, Result};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted client: pops one canned response per call, errors when empty.
    struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String>>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
            }
        }

        fn failing() -> Self {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl PlanningClient for ScriptedClient {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.responses
                .lock()
                .expect("lock poisoned")
                .pop_front()
                .unwrap_or_else(|| Err(ForagerError::Planning("no scripted response".into())))
        }
    }

    fn goal() -> Goal {
        Goal::new("Find 10 email addresses of recruiters hiring AI roles")
    }

    #[test]
    fn strips_plain_and_labeled_fences() {
        assert_eq!(strip_code_fences("[1]"), "[1]");
        assert_eq!(strip_code_fences("```\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn parses_quantity_variants() {
        assert_eq!(parse_quantity(r#"{"quantity": 15}"#), Some(15));
        assert_eq!(parse_quantity(r#"{"quantity": "7"}"#), Some(7));
        assert_eq!(parse_quantity(r#"{"quantity": 0}"#), None);
        assert_eq!(parse_quantity(r#"{"count": 15}"#), None);
        assert_eq!(parse_quantity("not json"), None);
    }

    #[test]
    fn parses_query_lists() {
        assert_eq!(
            parse_query_list(r#"["a", "b", ""]"#),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(parse_query_list(r#"{"queries": ["a"]}"#), None);
        assert_eq!(parse_query_list("nonsense"), None);
    }

    #[tokio::test]
    async fn analyze_extracts_quantity() {
        let planner = Planner::new(Box::new(ScriptedClient::new(vec![Ok(
            r#"{"content_type": "emails", "quantity": 12}"#.into(),
        )])));
        assert_eq!(planner.analyze(&goal()).await, Some(12));
    }

    #[tokio::test]
    async fn analyze_returns_none_on_garbage() {
        let planner = Planner::new(Box::new(ScriptedClient::new(vec![Ok(
            "I think you need a lot of emails!".into(),
        )])));
        assert_eq!(planner.analyze(&goal()).await, None);
    }

    #[tokio::test]
    async fn analyze_returns_none_on_transport_error() {
        let planner = Planner::new(Box::new(ScriptedClient::failing()));
        assert_eq!(planner.analyze(&goal()).await, None);
    }

    #[tokio::test]
    async fn propose_parses_fenced_list() {
        let planner = Planner::new(Box::new(ScriptedClient::new(vec![Ok(
            "```json\n[\"ai recruiter emails\", \"ml hiring contacts\"]\n```".into(),
        )])));
        let queries = planner.propose_queries(&goal(), 0, 10, &[]).await;
        assert_eq!(queries, vec!["ai recruiter emails", "ml hiring contacts"]);
    }

    #[tokio::test]
    async fn propose_falls_back_to_templates() {
        let planner = Planner::new(Box::new(ScriptedClient::failing()));
        let queries = planner.propose_queries(&goal(), 0, 10, &[]).await;
        assert_eq!(queries, fallback::proposal_queries(&goal()));
    }

    #[tokio::test]
    async fn empty_list_counts_as_parse_failure() {
        let planner = Planner::new(Box::new(ScriptedClient::new(vec![Ok("[]".into())])));
        let queries = planner.propose_queries(&goal(), 0, 10, &[]).await;
        assert_eq!(queries, fallback::proposal_queries(&goal()));
    }

    #[tokio::test]
    async fn refine_falls_back_to_per_term_templates() {
        let planner = Planner::new(Box::new(ScriptedClient::failing()));
        let queries = planner
            .refine_queries(&goal(), 10, 3, &["tried one".into()])
            .await;
        assert_eq!(queries, fallback::refinement_queries(&goal()));
        assert!(queries.iter().all(|q| q.ends_with("resources 2024")));
    }
}
