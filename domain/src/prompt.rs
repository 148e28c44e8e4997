//! Prompt templates for each pipeline stage.
//!
//! Templates are static associated functions: pure string builders with no
//! I/O, so every stage's prompt is testable in isolation.

use crate::consensus::{Candidate, VerificationResult};
use crate::task::Task;
use crate::util::truncate_str;

/// Candidate content shown to the judge is truncated to this many bytes
const JUDGE_EXCERPT_BYTES: usize = 500;

/// Prompt builders for generation, verification, judging and mutation.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instruction text for a named generation approach.
    ///
    /// Unknown approaches fall back to the conservative instruction.
    pub fn approach_instruction(approach: &str) -> &'static str {
        match approach {
            "aggressive" => "Prioritize performance and efficiency. Use optimized algorithms.",
            "minimal" => {
                "Prioritize simplicity and readability. Use the most straightforward approach."
            }
            "defensive" => "Prioritize security and input validation. Assume hostile inputs.",
            // "conservative" and anything unrecognized
            _ => "Prioritize safety, error handling, and robustness. Include extensive validation.",
        }
    }

    /// Prompt for generating one candidate with a specific approach
    pub fn generation(task: &Task, approach: &str) -> String {
        let requirements = task
            .requirements()
            .iter()
            .map(|r| format!("- {r}"))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Task: {title}\n\n\
             Description: {description}\n\n\
             Approach: {approach}\n{instruction}\n\n\
             Requirements:\n{requirements}\n\n\
             Generate the implementation following the {approach} approach.\n",
            title = task.title,
            description = task.description,
            approach = approach,
            instruction = Self::approach_instruction(approach),
            requirements = requirements,
        )
    }

    /// Prompt asking a verifier role to assess one candidate
    pub fn verification(task: &Task, candidate: &Candidate) -> String {
        format!(
            "Verify this solution:\n\n\
             Task: {title}\n\
             Description: {description}\n\n\
             Solution:\n```\n{content}\n```\n\n\
             Verify against requirements and provide:\n\
             1. PASS or FAIL\n\
             2. Score (0-1)\n\
             3. Specific feedback\n\
             4. List of errors (if any)\n\
             5. List of warnings (if any)\n",
            title = task.title,
            description = task.description,
            content = candidate.content,
        )
    }

    /// Single judging prompt summarizing all surviving candidates and their
    /// verification outcomes
    pub fn judgment(
        task: &Task,
        candidates: &[Candidate],
        verifications: &[VerificationResult],
    ) -> String {
        let mut prompt = format!(
            "Task: {}\n\nYou must judge {} candidates and select the best one.\n\n",
            task.title,
            candidates.len()
        );

        for (i, candidate) in candidates.iter().enumerate() {
            prompt.push_str(&format!(
                "Candidate {} (Approach: {}):\n```\n{}...\n```\n\nVerifications:\n",
                i + 1,
                candidate.approach,
                truncate_str(&candidate.content, JUDGE_EXCERPT_BYTES),
            ));

            for v in verifications.iter().filter(|v| v.candidate_id == candidate.id) {
                prompt.push_str(&format!(
                    "- {}: {} (Score: {:.2})\n",
                    v.verifier_role,
                    if v.passed { "PASS" } else { "FAIL" },
                    v.score,
                ));
            }
            prompt.push('\n');
        }

        prompt.push_str(
            "Score each candidate on:\n\
             - Correctness (40%)\n\
             - Performance (20%)\n\
             - Readability (20%)\n\
             - Maintainability (20%)\n\n\
             Select the winner and explain your reasoning.\n",
        );
        prompt
    }

    /// Prompt asking a worker role to apply one mutation strategy to the
    /// incumbent solution
    pub fn mutation(task: &Task, incumbent: &Candidate, strategy: &str) -> String {
        format!(
            "Task: {title}\n\n\
             Current solution:\n```\n{content}\n```\n\n\
             {strategy}. Return the full revised solution, nothing else.\n",
            title = task.title,
            content = incumbent.content,
            strategy = strategy,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgentRole;
    use crate::task::TaskId;

    fn task() -> Task {
        Task::new("t1", "Auth", "Implement JWT authentication")
            .with_metadata("requirements", serde_json::json!(["expires in 1h"]))
    }

    #[test]
    fn test_generation_prompt_names_approach() {
        let prompt = PromptTemplate::generation(&task(), "aggressive");
        assert!(prompt.contains("Approach: aggressive"));
        assert!(prompt.contains("optimized algorithms"));
        assert!(prompt.contains("- expires in 1h"));
    }

    #[test]
    fn test_unknown_approach_falls_back_to_conservative() {
        let prompt = PromptTemplate::generation(&task(), "whimsical");
        assert!(prompt.contains("error handling, and robustness"));
    }

    #[test]
    fn test_judgment_prompt_truncates_long_candidates() {
        let long_content = "x".repeat(5_000);
        let candidate = Candidate::new(
            TaskId::from("t1"),
            AgentRole::BackendWorker,
            long_content,
            "conservative",
        );
        let verification =
            VerificationResult::new(&candidate.id, AgentRole::QaSentinel, true, 0.8, "PASS good");

        let prompt = PromptTemplate::judgment(&task(), &[candidate], &[verification]);
        assert!(prompt.len() < 2_000);
        assert!(prompt.contains("qa_sentinel: PASS (Score: 0.80)"));
    }
}
