//! Consensus value objects - immutable types for one dispatch cycle.
//!
//! A batch of [`Candidate`]s is produced in parallel, assessed by
//! [`VerificationResult`]s, scored by judge [`Vote`]s, and collapsed into a
//! single [`ConsensusResult`] naming the winner.

mod candidate;
mod result;
mod verification;
mod vote;

pub use candidate::Candidate;
pub use result::{ConsensusResult, select_winner};
pub use verification::VerificationResult;
pub use vote::Vote;
