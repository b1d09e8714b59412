//! Relevance filtering and content extraction for Forager.
//!
//! Two heuristics keyed on the goal [`Category`](forager_shared::Category):
//! - [`is_relevant`] — the pre-fetch accept/reject gate for raw search hits
//! - [`extract`] — the post-fetch field extractor (emails, job fields,
//!   generic excerpt)

mod extract;
mod filter;

pub use extract::{Extraction, extract};
pub use filter::is_relevant;
