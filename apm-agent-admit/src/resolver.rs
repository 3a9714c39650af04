//! Decides which agent, if any, a Pod asked for.

use std::fmt;

use k8s_openapi::api::core::v1::Pod;

use crate::config::{AgentConfig, ConfigTable};

/// The annotation a Pod sets to opt into agent injection. Its value names an agent in the config.
pub const AGENT_ANNOTATION: &str = "elastic-apm-agent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'a> {
    NoAnnotations,
    MissingAgentAnnotation,
    UnknownAgent(String),
    Resolved(&'a AgentConfig),
}

impl<'a> Outcome<'a> {
    /// The agent config to inject, or `None` when the Pod passes through untouched.
    pub fn agent(&self) -> Option<&'a AgentConfig> {
        match self {
            Outcome::Resolved(agent) => Some(*agent),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::NoAnnotations => write!(f, "no annotations present"),
            Outcome::MissingAgentAnnotation => write!(f, "missing annotation `{AGENT_ANNOTATION}`"),
            Outcome::UnknownAgent(agent) => write!(f, "no config for agent `{agent}`"),
            Outcome::Resolved(agent) => write!(f, "inject agent image `{}`", agent.image),
        }
    }
}

// The annotation value is looked up verbatim, a comma separated list is just an unknown agent name.
pub fn resolve<'a>(pod: &Pod, table: &'a ConfigTable) -> Outcome<'a> {
    let Some(annotations) = &pod.metadata.annotations else {
        return Outcome::NoAnnotations;
    };

    let Some(agent) = annotations.get(AGENT_ANNOTATION) else {
        return Outcome::MissingAgentAnnotation;
    };

    match table.get(agent) {
        Some(config) => Outcome::Resolved(config),
        None => Outcome::UnknownAgent(agent.clone()),
    }
}
