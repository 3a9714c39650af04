//! This module defines the configuration file and the agent registry built from it.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

/// The image and environment injected for one agent flavour.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AgentConfig {
    pub image: String,
    /// Kept sorted so the generated `env` list is stable across requests.
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub agents: BTreeMap<String, AgentConfig>,
}

impl Config {
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_file(file_path: &Path) -> anyhow::Result<Self> {
        let config_content = fs::read_to_string(file_path)?;
        Self::from_str(&config_content)
    }
}

/// Agent name to agent configuration. Built once at startup and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ConfigTable {
    agents: BTreeMap<String, AgentConfig>,
}

impl ConfigTable {
    pub fn get(&self, agent: &str) -> Option<&AgentConfig> {
        self.agents.get(agent)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }
}

impl From<Config> for ConfigTable {
    fn from(config: Config) -> Self {
        Self {
            agents: config.agents,
        }
    }
}

impl FromIterator<(String, AgentConfig)> for ConfigTable {
    fn from_iter<I: IntoIterator<Item = (String, AgentConfig)>>(iter: I) -> Self {
        Self {
            agents: iter.into_iter().collect(),
        }
    }
}
