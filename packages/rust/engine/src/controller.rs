//! Convergence decisions: complete, fail, or keep searching.
//!
//! The decision is a pure function of a `RunState` snapshot. Replaying the
//! same snapshot always yields the same verdict, which keeps the loop
//! testable and leaves the door open for checkpoint/resume.

use forager_shared::{GoalStatus, RunState};

/// Outcome of evaluating a run state after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Target met; the run should finalize successfully.
    Complete,
    /// Iteration budget exhausted before the target was met.
    Fail,
    /// Keep going. `needs_queries` signals that the ledger has no
    /// unattempted queries left and refinement should run first.
    Continue { needs_queries: bool },
}

/// Evaluate the transition rule against a state snapshot.
pub fn decide(state: &RunState) -> Verdict {
    if state.results().len() >= state.target_count() {
        return Verdict::Complete;
    }
    if state.iteration() >= state.max_iterations() {
        return Verdict::Fail;
    }
    Verdict::Continue {
        needs_queries: state.unattempted_queries().is_empty(),
    }
}

/// Apply a verdict to the state's status field.
///
/// `Continue` leaves the status untouched; the terminal verdicts move it
/// to its final value. The driver stops dispatching immediately after, so
/// terminal states are never mutated again.
pub fn apply(state: &mut RunState, verdict: Verdict) {
    match verdict {
        Verdict::Complete => state.set_status(GoalStatus::Completed),
        Verdict::Fail => state.set_status(GoalStatus::Failed),
        Verdict::Continue { .. } => {}
    }
}
