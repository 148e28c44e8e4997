//! Static quality heuristics over generated code.

/// Policy scoring readability and maintainability of a piece of code.
///
/// Consumed by the refiner's fitness function. The default is a
/// language-agnostic marker heuristic; a real implementation would delegate
/// to linters through the sandbox.
pub trait CodeQualityPolicy: Send + Sync {
    fn readability(&self, code: &str) -> f64;
    fn maintainability(&self, code: &str) -> f64;
}

/// Line-count bands for readability, marker presence checks for
/// maintainability.
#[derive(Debug, Clone, Default)]
pub struct HeuristicQuality;

impl CodeQualityPolicy for HeuristicQuality {
    /// Banded on line count: under 20 lines is too terse (0.6), 20-49 is
    /// ideal (1.0), 50-99 acceptable (0.8), 100+ too long (0.5).
    fn readability(&self, code: &str) -> f64 {
        let lines = code.lines().count();
        if lines < 20 {
            0.6
        } else if lines < 50 {
            1.0
        } else if lines < 100 {
            0.8
        } else {
            0.5
        }
    }

    /// Additive marker checks, capped at 1.0:
    /// documentation +0.3, type annotations +0.3, error handling +0.2,
    /// more than one function definition +0.2.
    fn maintainability(&self, code: &str) -> f64 {
        let mut score: f64 = 0.0;

        if code.contains("\"\"\"") || code.contains("///") || code.contains("/**") {
            score += 0.3;
        }

        if code.contains("->") || code.contains(": str") || code.contains(": int") {
            score += 0.3;
        }

        if (code.contains("try") && code.contains("except"))
            || code.contains("Result<")
            || code.contains("catch")
        {
            score += 0.2;
        }

        let functions = code.matches("def ").count() + code.matches("fn ").count()
            + code.matches("function ").count();
        if functions > 1 {
            score += 0.2;
        }

        score.min(1.0)
    }
}
