//! The top-level run loop: plan → search rounds → converge → report.

use std::time::Instant;

use tracing::{info, instrument};

use forager_planner::Planner;
use forager_search::{PageFetcher, SearchProvider};
use forager_shared::{ForagerError, Goal, GoalStatus, Result, RunConfig, RunState};

use crate::controller::{self, Verdict};
use crate::executor;
use crate::report::RunReport;

/// The external capabilities a run consumes, bundled for call sites.
pub struct Collaborators<'a> {
    pub planner: &'a Planner,
    pub search: &'a dyn SearchProvider,
    pub fetcher: &'a dyn PageFetcher,
}

/// Progress callback for reporting run status to a UI.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when a query starts executing within a round.
    fn searching(&self, query: &str, current: usize, total: usize);
    /// Called when a new unique result is accepted.
    fn result_found(&self, count: usize, target: usize);
    /// Called when a round finishes.
    fn round_complete(&self, iteration: usize, count: usize, target: usize);
    /// Called once with the final report.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn searching(&self, _query: &str, _current: usize, _total: usize) {}
    fn result_found(&self, _count: usize, _target: usize) {}
    fn round_complete(&self, _iteration: usize, _count: usize, _target: usize) {}
    fn done(&self, _report: &RunReport) {}
}

/// Run a goal to a terminal status and produce its report.
///
/// The loop performs at most `config.max_iterations` rounds regardless of
/// collaborator behavior; the only outcomes are a Completed or Failed
/// report. `target_override` skips the planner's quantity analysis; when
/// analysis fails, the configured `target_count` stands.
#[instrument(skip_all, fields(goal = %goal_text))]
pub async fn run_goal(
    goal_text: &str,
    target_override: Option<usize>,
    config: &RunConfig,
    deps: &Collaborators<'_>,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    if goal_text.trim().is_empty() {
        return Err(ForagerError::validation("goal text is empty"));
    }

    let start = Instant::now();
    let goal = Goal::new(goal_text.trim());
    let mut state = RunState::new(goal, config.target_count, config.max_iterations);

    info!(
        run_id = %state.id(),
        category = %state.goal().category,
        max_iterations = config.max_iterations,
        "starting goal run"
    );

    // Phase 1: analysis — fix the target, then the run is in progress.
    progress.phase("Analyzing goal");
    let target = match target_override {
        Some(t) => Some(t),
        None => deps.planner.analyze(state.goal()).await,
    };
    if let Some(target) = target {
        state.set_target_count(target);
    }
    state.set_status(GoalStatus::InProgress);

    // Phase 2: initial query proposals.
    progress.phase("Planning search queries");
    let proposed = deps
        .planner
        .propose_queries(state.goal(), 0, state.target_count(), state.queries())
        .await;
    let added = state.push_queries(proposed);
    info!(added, total = state.queries().len(), "initial queries planned");

    // Phase 3: bounded search loop.
    loop {
        let verdict = controller::decide(&state);
        controller::apply(&mut state, verdict);

        match verdict {
            Verdict::Complete | Verdict::Fail => break,
            Verdict::Continue { needs_queries } => {
                if needs_queries {
                    progress.phase("Refining search strategy");
                    let attempted: Vec<String> =
                        state.attempted().iter().cloned().collect();
                    let refined = deps
                        .planner
                        .refine_queries(
                            state.goal(),
                            state.target_count(),
                            state.results().len(),
                            &attempted,
                        )
                        .await;
                    let added = state.push_queries(refined);
                    info!(added, "strategy refined");
                }

                progress.phase("Searching");
                executor::run_round(&mut state, config, deps.search, deps.fetcher, progress)
                    .await;
                progress.round_complete(
                    state.iteration(),
                    state.results().len(),
                    state.target_count(),
                );
            }
        }
    }

    // Phase 4: finalize. Success keeps the earliest target_count results;
    // failure keeps everything accumulated.
    if state.status() == GoalStatus::Completed {
        state.truncate_results();
    }

    let report = RunReport::from_state(&state, start.elapsed());
    progress.done(&report);

    info!(
        run_id = %state.id(),
        status = %report.status,
        results = report.results.len(),
        iterations = report.iterations,
        elapsed_ms = report.elapsed_ms,
        "goal run finished"
    );

    Ok(report)
}
