//! Core domain types for Forager goal runs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for goal-run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Goal-derived classification selecting filter and extraction behavior.
///
/// Inferred once from the goal text; every category→behavior table
/// (relevance keywords, search tricks, extraction) dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Email,
    Website,
    Job,
    General,
}

impl Category {
    /// Infer the category from goal text by keyword matching.
    ///
    /// Checked in order: email-ish terms win over job-ish terms, so
    /// "recruiter emails for hiring managers" classifies as Email.
    pub fn infer(goal_text: &str) -> Self {
        let lower = goal_text.to_lowercase();

        if ["email", "contact", "recruiter"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            Self::Email
        } else if lower.contains("website") {
            Self::Website
        } else if ["job", "career", "position", "hiring"]
            .iter()
            .any(|kw| lower.contains(kw))
        {
            Self::Job
        } else {
            Self::General
        }
    }

    /// Stable string form, used in logs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Website => "website",
            Self::Job => "job",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Goal
// ---------------------------------------------------------------------------

/// Immutable user-supplied goal: free text plus its inferred category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// The original natural-language goal description.
    pub text: String,
    /// Category inferred from the text at construction.
    pub category: Category,
}

impl Goal {
    /// Build a goal, inferring its category from the text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let category = Category::infer(&text);
        Self { text, category }
    }
}

// ---------------------------------------------------------------------------
// GoalStatus
// ---------------------------------------------------------------------------

/// Lifecycle status of a goal run.
///
/// Transitions are monotonic: `Pending → InProgress → {Completed, Failed}`.
/// The terminal states freeze the run; no further mutation occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl GoalStatus {
    /// Whether this status ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// SearchHit
// ---------------------------------------------------------------------------

/// One raw candidate returned by the search provider, before filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title as reported by the provider.
    pub title: String,
    /// Candidate URL.
    pub url: String,
    /// Short description/snippet from the result page.
    pub snippet: String,
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One accepted, deduplicated unit of output data.
///
/// The base fields are always present; category-specific fields are filled
/// by the content extractor when a page fetch succeeds, and skipped in
/// serialized output otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    /// Result title.
    pub title: String,
    /// Source URL (dedup key; may be empty for provider-less records).
    pub url: String,
    /// Short description from the search snippet.
    pub description: String,
    /// Where the record came from (currently always "web_search").
    pub source: String,

    /// Email addresses found on the page (dedup key; Email category).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emails: Vec<String>,
    /// Contact info mirror of `emails`, kept for report consumers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_info: Vec<String>,

    /// Extracted job title (Job category).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    /// Extracted company name (Job category).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Extracted location (Job category).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Posting URL, always the fetched page URL (Job category).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,

    /// Leading page content excerpt (General/Website categories).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

impl Record {
    /// Build a base record from a search hit, with no extracted fields yet.
    pub fn from_hit(hit: &SearchHit) -> Self {
        Self {
            title: hit.title.clone(),
            url: hit.url.clone(),
            description: hit.snippet.clone(),
            source: "web_search".into(),
            ..Default::default()
        }
    }
}
