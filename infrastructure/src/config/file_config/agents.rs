//! Agent profile overrides from TOML (`[agents.<role>]` sections)
//!
//! Example configuration:
//!
//! ```toml
//! [agents.qa_sentinel]
//! url = "http://gpu-box:8084"
//! temperature = 0.2
//!
//! [agents.consensus_judge]
//! model = "Phi-4-Q6_K.gguf"
//! ```
//!
//! Every field is optional; unset fields keep the built-in profile value.

use crate::gateway::{AgentProfile, ProfileRegistry};
use hydra_domain::AgentRole;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Partial per-role profile override
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentProfile {
    pub url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub system_prompt: Option<String>,
}

impl FileAgentProfile {
    fn apply_to(&self, mut profile: AgentProfile) -> AgentProfile {
        if let Some(url) = &self.url {
            profile.url = url.clone();
        }
        if let Some(model) = &self.model {
            profile.model = model.clone();
        }
        if let Some(temperature) = self.temperature {
            profile.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            profile.top_p = top_p;
        }
        if let Some(system_prompt) = &self.system_prompt {
            profile.system_prompt = system_prompt.clone();
        }
        profile
    }
}

/// All `[agents.*]` sections, keyed by wire role name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileAgentsConfig {
    pub profiles: HashMap<String, FileAgentProfile>,
}

impl FileAgentsConfig {
    /// Build the profile registry, merging overrides onto built-ins.
    ///
    /// Keys that do not parse as a role are reported in the second return
    /// value rather than silently dropped.
    pub fn to_profile_registry(&self) -> (ProfileRegistry, Vec<String>) {
        let mut overrides = HashMap::new();
        let mut unknown = Vec::new();

        for (key, partial) in &self.profiles {
            match key.parse::<AgentRole>() {
                Ok(role) => {
                    overrides.insert(role, partial.apply_to(AgentProfile::default_for(role)));
                }
                Err(_) => unknown.push(key.clone()),
            }
        }

        (ProfileRegistry::with_overrides(overrides), unknown)
    }
}
