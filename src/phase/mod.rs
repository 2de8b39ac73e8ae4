//! Phase execution: one concurrent task per node, then a barrier.
//!
//! [`PhaseRunner::run_phase`] dispatches every node's task before waiting on
//! any of them and returns only when all have finished. Results travel back
//! over a channel to the calling thread, which is the only writer of the
//! aggregated [`PhaseOutcome`].

mod error;
mod outcome;
mod runner;


pub use error::{OpError, PhaseFailure};
pub use outcome::{NodeResult, PhaseOutcome};
pub use runner::PhaseRunner;
