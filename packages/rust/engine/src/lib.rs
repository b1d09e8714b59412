//! The Forager engine: the control loop that turns an open-ended search
//! goal into a bounded, terminating run.
//!
//! - [`driver::run_goal`] — the top-level loop (plan → rounds → report)
//! - [`executor::run_round`] — one batch of queries through the
//!   search/fetch collaborators
//! - [`controller::decide`] — the pure convergence decision
//! - [`report::RunReport`] — the terminal summary handed to consumers

pub mod controller;
pub mod driver;
pub mod executor;
pub mod report;

pub use controller::{Verdict, decide};
pub use driver::{Collaborators, ProgressReporter, SilentProgress, run_goal};
pub use executor::run_round;
pub use report::RunReport;
