//! Web search provider interface and the SearXNG-backed live client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use forager_shared::{ForagerError, Result, SearchHit};

use crate::USER_AGENT;

/// Turns a query string into a ranked list of candidate hits.
///
/// Implementations must tolerate empty result sets (return `Ok(vec![])`)
/// and reserve `Err` for transport/protocol failures — the round executor
/// degrades those to "zero hits for this query".
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

// ---------------------------------------------------------------------------
// SearXNG JSON client
// ---------------------------------------------------------------------------

/// Response shape of a SearXNG `format=json` query.
#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    /// Snippet field; SearXNG calls it `content`.
    #[serde(default)]
    content: String,
}

/// Live search provider backed by a SearXNG-compatible JSON endpoint.
pub struct JsonSearchProvider {
    client: Client,
    endpoint: String,
}

impl JsonSearchProvider {
    /// Build a provider for the given endpoint (e.g. `https://searx.be/search`).
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ForagerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SearchProvider for JsonSearchProvider {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|e| ForagerError::Network(format!("search '{query}': {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForagerError::Network(format!(
                "search '{query}': HTTP {status}"
            )));
        }

        let parsed: SearxResponse = response
            .json()
            .await
            .map_err(|e| ForagerError::Network(format!("search '{query}': bad JSON: {e}")))?;

        let hits: Vec<SearchHit> = parsed
            .results
            .into_iter()
            .filter(|r| !r.url.is_empty())
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title,
                url: r.url,
                snippet: r.content,
            })
            .collect();

        debug!(query, hits = hits.len(), "search complete");
        Ok(hits)
    }
}
