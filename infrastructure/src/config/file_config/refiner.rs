//! Refiner configuration from TOML (`[refiner]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [refiner]
//! max_generations = 10
//! population_size = 5
//!
//! [refiner.weights]
//! correctness = 0.4
//! performance = 0.2
//! readability = 0.2
//! maintainability = 0.2
//! ```

use hydra_application::use_cases::refine_candidate::{FitnessWeights, RefinerConfig};
use serde::{Deserialize, Serialize};

/// Evolutionary refiner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRefinerConfig {
    pub max_generations: usize,
    pub population_size: usize,
    /// Language candidates are executed as in the sandbox
    pub language: String,
    pub weights: FileFitnessWeights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFitnessWeights {
    pub correctness: f64,
    pub performance: f64,
    pub readability: f64,
    pub maintainability: f64,
}

impl Default for FileRefinerConfig {
    fn default() -> Self {
        let defaults = RefinerConfig::default();
        Self {
            max_generations: defaults.max_generations,
            population_size: defaults.population_size,
            language: defaults.language,
            weights: FileFitnessWeights::default(),
        }
    }
}

impl Default for FileFitnessWeights {
    fn default() -> Self {
        let defaults = FitnessWeights::default();
        Self {
            correctness: defaults.correctness,
            performance: defaults.performance,
            readability: defaults.readability,
            maintainability: defaults.maintainability,
        }
    }
}

impl FileRefinerConfig {
    pub fn to_refiner_config(&self) -> RefinerConfig {
        RefinerConfig {
            max_generations: self.max_generations,
            population_size: self.population_size,
            language: self.language.clone(),
            ..RefinerConfig::default()
        }
    }

    pub fn to_fitness_weights(&self) -> FitnessWeights {
        FitnessWeights {
            correctness: self.weights.correctness,
            performance: self.weights.performance,
            readability: self.weights.readability,
            maintainability: self.weights.maintainability,
        }
    }

    /// The weighted fitness total only stays in [0, 1] when the weights
    /// sum to 1. Off-sum weights are usable but worth flagging.
    pub fn weights_sum_to_one(&self) -> bool {
        let sum = self.weights.correctness
            + self.weights.performance
            + self.weights.readability
            + self.weights.maintainability;
        (sum - 1.0).abs() < 1e-6
    }
}
