//! Task routing - maps a task to the responsible agent role.
//!
//! Routing is a pure function of the task's fields: an explicit assignment
//! wins, otherwise a keyword baseline is computed and escalated to the
//! Architect when the complexity score crosses a threshold.

mod complexity;
mod router;

pub use complexity::{ComplexityPolicy, KeywordComplexity};
pub use router::Router;
