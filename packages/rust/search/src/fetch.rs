//! Page fetching and text extraction.
//!
//! The fetcher turns a URL into Markdown-ish page text. Its contract is
//! deliberately forgiving: unreachable hosts, non-success statuses, and
//! oversized or unconvertible bodies all surface as empty content, never
//! as errors — a fetch failure must not cost the caller the hit.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use tracing::{debug, instrument, warn};
use url::Url;

use forager_shared::{ForagerError, Result};

use crate::USER_AGENT;

/// Maximum redirects to follow when fetching a page.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we will read (5 MB).
const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// Turns a URL into page text (Markdown). Empty string means the page
/// could not be fetched or had no usable content.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Live fetcher: HTTP GET, strip page chrome, convert to Markdown.
pub struct HttpFetcher {
    client: Client,
    /// Allow localhost/private IPs (for integration tests with mock servers).
    allow_localhost: bool,
}

impl HttpFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ForagerError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            allow_localhost: false,
        })
    }

    /// Allow fetching localhost/private IPs (for integration tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(e) => {
                debug!(url, error = %e, "unparseable URL, skipping fetch");
                return Ok(String::new());
            }
        };

        if !self.allow_localhost && is_ssrf_target(&parsed) {
            warn!(url, "SSRF protection: blocked");
            return Ok(String::new());
        }

        let response = match self.client.get(parsed.as_str()).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "fetch failed");
                return Ok(String::new());
            }
        };

        if !response.status().is_success() {
            debug!(url, status = %response.status(), "non-success status");
            return Ok(String::new());
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                debug!(url, len, "response too large, skipping");
                return Ok(String::new());
            }
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => {
                debug!(url, error = %e, "body read failed");
                return Ok(String::new());
            }
        };

        Ok(html_to_text(&body))
    }
}

// ---------------------------------------------------------------------------
// HTML → text
// ---------------------------------------------------------------------------

/// Extract the main content of an HTML page and convert it to Markdown.
///
/// Non-HTML bodies pass through htmd mostly unchanged, which is what we
/// want for plain-text pages.
fn html_to_text(body: &str) -> String {
    let content_html = extract_content_html(body);

    let converter = htmd::HtmlToMarkdown::builder()
        .skip_tags(vec![
            "script", "style", "nav", "header", "footer", "aside", "iframe", "noscript", "svg",
        ])
        .build();

    match converter.convert(&content_html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            debug!(error = %e, "markdown conversion failed");
            String::new()
        }
    }
}

/// Pick the main content container, preferring semantic elements.
fn extract_content_html(html: &str) -> String {
    let doc = Html::parse_document(html);

    let selectors = ["[role=\"main\"]", "article", "main", ".content"];

    for sel_str in &selectors {
        if let Ok(selector) = scraper::Selector::parse(sel_str) {
            if let Some(el) = doc.select(&selector).next() {
                return el.inner_html();
            }
        }
    }

    html.to_string()
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
fn is_ssrf_target(url: &Url) -> bool {
    // Block non-HTTP schemes
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    // Block private/loopback IPs
    if let Some(host) = url.host_str() {
        if let Ok(ip) = host.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        // Block known local hostnames
        if host == "localhost"
            || host == "127.0.0.1"
            || host == "[::1]"
            || host.ends_with(".local")
            || host.ends_with(".internal")
        {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}
