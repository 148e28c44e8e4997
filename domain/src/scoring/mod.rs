//! Pluggable scoring policies.
//!
//! The verification-score extraction and code-quality heuristics are
//! deliberate placeholders behind traits: production scorers (real parsers,
//! static analysis) can replace them without touching the orchestration
//! control flow that consumes them.

mod quality;
mod review;

pub use quality::{CodeQualityPolicy, HeuristicQuality};
pub use review::{ReviewScorePolicy, SentimentScore};
