//! External search and fetch collaborators for Forager.
//!
//! Two narrow interfaces the engine consumes:
//! - [`SearchProvider`] — query string → ranked candidate hits
//! - [`PageFetcher`] — URL → Markdown-ish page text (empty on failure)
//!
//! The live implementations ([`JsonSearchProvider`], [`HttpFetcher`]) speak
//! to a SearXNG-compatible endpoint and plain HTTP respectively.

mod fetch;
mod provider;

pub use fetch::{HttpFetcher, PageFetcher};
pub use provider::{JsonSearchProvider, SearchProvider};

/// User-Agent string for outbound requests.
pub(crate) const USER_AGENT: &str = concat!("Forager/", env!("CARGO_PKG_VERSION"));
