//! The final run report handed to presentation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forager_shared::{Category, GoalStatus, Record, RunId, RunState};

/// Summary of a terminated goal run.
///
/// This is everything a report consumer gets: the core guarantees these
/// fields are present and accurate, presentation is the consumer's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: RunId,
    /// The original goal text.
    pub goal: String,
    /// Category the goal was classified as.
    pub category: Category,
    /// Terminal status: Completed or Failed.
    pub status: GoalStatus,
    /// The target the run was converging toward.
    pub target_count: usize,
    /// Rounds executed.
    pub iterations: usize,
    /// Total queries ever proposed.
    pub queries_proposed: usize,
    /// Queries actually executed.
    pub queries_attempted: usize,
    /// Accepted results in discovery order (truncated to target on success).
    pub results: Vec<Record>,
    /// Last error seen during the run, if any. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Wall-clock duration of the run in milliseconds.
    pub elapsed_ms: u64,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Summarize a terminal run state.
    pub fn from_state(state: &RunState, elapsed: std::time::Duration) -> Self {
        Self {
            run_id: state.id().clone(),
            goal: state.goal().text.clone(),
            category: state.goal().category,
            status: state.status(),
            target_count: state.target_count(),
            iterations: state.iteration(),
            queries_proposed: state.queries().len(),
            queries_attempted: state.attempted().len(),
            results: state.results().to_vec(),
            last_error: state.last_error().map(String::from),
            elapsed_ms: elapsed.as_millis() as u64,
            finished_at: Utc::now(),
        }
    }

    /// Render the report as an ordered text summary.
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Goal:       {}\n", self.goal));
        out.push_str(&format!(
            "Status:     {}\n",
            self.status.to_string().to_uppercase()
        ));
        out.push_str(&format!(
            "Results:    {}/{}\n",
            self.results.len(),
            self.target_count
        ));
        out.push_str(&format!("Iterations: {}\n", self.iterations));
        out.push_str(&format!(
            "Queries:    {} attempted of {} proposed\n",
            self.queries_attempted, self.queries_proposed
        ));
        if let Some(error) = &self.last_error {
            out.push_str(&format!("Last error: {error}\n"));
        }

        if self.results.is_empty() {
            out.push_str("\nNo results found.\n");
            return out;
        }

        out.push_str("\nResults:\n");
        for (i, record) in self.results.iter().enumerate() {
            let n = i + 1;
            if record.url.is_empty() {
                out.push_str(&format!("{n}. {}\n", record.title));
            } else {
                out.push_str(&format!("{n}. {} - {}\n", record.title, record.url));
            }

            if !record.description.is_empty() {
                out.push_str(&format!("   Description: {}\n", record.description));
            }
            if !record.emails.is_empty() {
                out.push_str(&format!("   Emails: {}\n", record.emails.join(", ")));
            }
            if let Some(job_title) = &record.job_title {
                let mut line = format!("   Position: {job_title}");
                if let Some(company) = &record.company {
                    line.push_str(&format!(" at {company}"));
                }
                if let Some(location) = &record.location {
                    line.push_str(&format!(" ({location})"));
                }
                out.push_str(&line);
                out.push('\n');
            }
            if let Some(excerpt) = &record.excerpt {
                out.push_str(&format!("   Excerpt: {}\n", one_line(excerpt, 160)));
            }
        }

        out
    }
}

/// Collapse whitespace runs and cap at `max` characters for one-line display.
fn one_line(text: &str, max: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max {
        return collapsed;
    }
    let mut out: String = collapsed.chars().take(max).collect();
    out.push_str("...");
    out
}
