//! Extraction of pass/fail and scores from free-text review responses.

/// Policy that turns a verifier or judge response into a numeric score and
/// a pass/fail verdict.
pub trait ReviewScorePolicy: Send + Sync {
    /// Score in [0, 1] derived from the response text
    fn score(&self, feedback: &str) -> f64;

    /// Whether the response indicates a passing verdict
    fn passed(&self, feedback: &str) -> bool;
}

/// Keyword-band sentiment heuristic.
///
/// "excellent" -> 0.9, "good" -> 0.75, "acceptable" -> 0.6, "poor" -> 0.3,
/// anything else -> 0.5. A response passes when it contains "PASS"
/// (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct SentimentScore;

impl ReviewScorePolicy for SentimentScore {
    fn score(&self, feedback: &str) -> f64 {
        let feedback = feedback.to_lowercase();
        if feedback.contains("excellent") {
            0.9
        } else if feedback.contains("good") {
            0.75
        } else if feedback.contains("acceptable") {
            0.6
        } else if feedback.contains("poor") {
            0.3
        } else {
            0.5
        }
    }

    fn passed(&self, feedback: &str) -> bool {
        feedback.to_uppercase().contains("PASS")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_bands() {
        let policy = SentimentScore;
        assert_eq!(policy.score("An excellent solution"), 0.9);
        assert_eq!(policy.score("Good overall"), 0.75);
        assert_eq!(policy.score("Acceptable but verbose"), 0.6);
        assert_eq!(policy.score("Poor error handling"), 0.3);
        assert_eq!(policy.score("No opinion"), 0.5);
    }

    #[test]
    fn test_pass_detection_case_insensitive() {
        let policy = SentimentScore;
        assert!(policy.passed("PASS - meets all requirements"));
        assert!(policy.passed("Verdict: pass"));
        assert!(!policy.passed("FAIL - missing validation"));
    }

    #[test]
    fn test_scores_stay_in_unit_interval() {
        let policy = SentimentScore;
        for text in ["excellent", "good", "acceptable", "poor", ""] {
            let s = policy.score(text);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
