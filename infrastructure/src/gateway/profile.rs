//! Per-role model server profiles.

use hydra_domain::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Connection and sampling profile for one role's model server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Base URL of the llama.cpp server (no trailing path)
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub top_p: f32,
    pub system_prompt: String,
}

impl AgentProfile {
    /// Built-in profile for a role.
    ///
    /// Verification and judging roles run at lower temperature than the
    /// generative roles.
    pub fn default_for(role: AgentRole) -> Self {
        match role {
            AgentRole::Architect => Self {
                url: "http://localhost:8081".to_string(),
                model: "DeepSeek-R1-Distill-Qwen-14B-Q4_K_M.gguf".to_string(),
                temperature: 0.7,
                top_p: 0.9,
                system_prompt: "You are a principal software architect. Analyze requirements, \
                                design system architecture, and produce structured technical \
                                specifications. Never write implementation code."
                    .to_string(),
            },
            AgentRole::BackendWorker => Self {
                url: "http://localhost:8082".to_string(),
                model: "Qwen2.5-Coder-7B-Instruct-Q4_K_M.gguf".to_string(),
                temperature: 0.6,
                top_p: 0.9,
                system_prompt: "You are a senior backend developer. Implement services and \
                                APIs with clean, maintainable code, including error handling \
                                and logging. Follow the given specification exactly."
                    .to_string(),
            },
            AgentRole::FrontendWorker => Self {
                url: "http://localhost:8083".to_string(),
                model: "Qwen2.5-Coder-3B-Instruct-Q4_K_M.gguf".to_string(),
                temperature: 0.6,
                top_p: 0.9,
                system_prompt: "You are a senior frontend developer. Implement user \
                                interfaces and client-side logic with clean, accessible, \
                                well-structured code."
                    .to_string(),
            },
            AgentRole::QaSentinel => Self {
                url: "http://localhost:8084".to_string(),
                model: "DeepSeek-R1-Distill-Qwen-1.5B-Q6_K.gguf".to_string(),
                temperature: 0.3,
                top_p: 0.95,
                system_prompt: "You are a strict QA reviewer. Verify the given solution \
                                against the task requirements. State PASS or FAIL and \
                                justify your verdict."
                    .to_string(),
            },
            AgentRole::ConsensusJudge => Self {
                url: "http://localhost:8085".to_string(),
                model: "Phi-4-Mini-Q4_K_M.gguf".to_string(),
                temperature: 0.4,
                top_p: 0.95,
                system_prompt: "You are an impartial judge comparing candidate solutions. \
                                Weigh correctness, performance, readability, and \
                                maintainability, then select a winner with reasoning."
                    .to_string(),
            },
        }
    }
}

/// Profiles for every role, with built-in defaults for anything unset.
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: HashMap<AgentRole, AgentProfile>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self {
            profiles: AgentRole::all()
                .into_iter()
                .map(|role| (role, AgentProfile::default_for(role)))
                .collect(),
        }
    }
}

impl ProfileRegistry {
    /// Build a registry from configured overrides; unconfigured roles keep
    /// their built-in profile.
    pub fn with_overrides(overrides: HashMap<AgentRole, AgentProfile>) -> Self {
        let mut registry = Self::default();
        registry.profiles.extend(overrides);
        registry
    }

    pub fn get(&self, role: AgentRole) -> &AgentProfile {
        // The map is total over AgentRole by construction
        &self.profiles[&role]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_every_role() {
        let registry = ProfileRegistry::default();
        for role in AgentRole::all() {
            assert!(!registry.get(role).url.is_empty());
        }
    }

    #[test]
    fn test_override_replaces_single_role() {
        let mut overrides = HashMap::new();
        overrides.insert(
            AgentRole::QaSentinel,
            AgentProfile {
                url: "http://gpu-box:9000".to_string(),
                ..AgentProfile::default_for(AgentRole::QaSentinel)
            },
        );
        let registry = ProfileRegistry::with_overrides(overrides);

        assert_eq!(registry.get(AgentRole::QaSentinel).url, "http://gpu-box:9000");
        assert_eq!(
            registry.get(AgentRole::Architect).url,
            "http://localhost:8081"
        );
    }
}
