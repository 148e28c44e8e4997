//! Winner selection and the consensus decision record.

use super::{Candidate, Vote};
use crate::core::DomainError;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Select the winning candidate: highest mean vote score across its votes.
///
/// Ties are broken by first-encountered order in `candidates`, so the
/// selection is a stable, deterministic function of its inputs. Candidates
/// without votes are skipped.
pub fn select_winner<'a>(candidates: &'a [Candidate], votes: &[Vote]) -> Option<&'a Candidate> {
    let mut winner: Option<(&Candidate, f64)> = None;

    for candidate in candidates {
        let scores: Vec<f64> = votes
            .iter()
            .filter(|v| v.candidate_id == candidate.id)
            .map(|v| v.score)
            .collect();

        if scores.is_empty() {
            continue;
        }

        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        match winner {
            // Strictly-greater keeps the earliest candidate on ties
            Some((_, best)) if avg <= best => {}
            _ => winner = Some((candidate, avg)),
        }
    }

    winner.map(|(c, _)| c)
}

/// Final decision of the consensus vote over one candidate batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusResult {
    pub task_id: TaskId,
    pub winner_candidate_id: String,
    /// Size of the original candidate batch
    pub total_candidates: usize,
    pub total_votes: usize,
    /// Highest vote score the winner received
    pub winning_score: f64,
    pub all_votes: Vec<Vote>,
    /// Human-readable decision summary
    pub reasoning: String,
    pub decided_at: DateTime<Utc>,
}

impl ConsensusResult {
    /// Build a decision record, validating the winner against its batch.
    ///
    /// The winner must be a member of `candidates` and must have received
    /// at least one vote.
    pub fn decide(
        task_id: TaskId,
        candidates: &[Candidate],
        winner_id: impl Into<String>,
        votes: Vec<Vote>,
    ) -> Result<Self, DomainError> {
        let winner_id = winner_id.into();

        let winner = candidates
            .iter()
            .find(|c| c.id == winner_id)
            .ok_or_else(|| DomainError::WinnerNotInBatch(winner_id.clone()))?;

        let winner_scores: Vec<f64> = votes
            .iter()
            .filter(|v| v.candidate_id == winner_id)
            .map(|v| v.score)
            .collect();

        if winner_scores.is_empty() {
            return Err(DomainError::WinnerWithoutVotes(winner_id));
        }

        let winning_score = winner_scores.iter().cloned().fold(f64::MIN, f64::max);
        let avg = winner_scores.iter().sum::<f64>() / winner_scores.len() as f64;

        let reasoning = format!(
            "Winner: candidate with {} approach\nAverage score: {:.2}\nVotes considered: {}",
            winner.approach,
            avg,
            votes.len()
        );

        Ok(Self {
            task_id,
            winner_candidate_id: winner_id,
            total_candidates: candidates.len(),
            total_votes: votes.len(),
            winning_score,
            all_votes: votes,
            reasoning,
            decided_at: Utc::now(),
        })
    }
}
