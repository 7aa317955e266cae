//! Read-only agent registry
//!
//! The agency resolves agent-scoped requests and builds discovery cards from
//! [`AgentDescriptor`]s supplied through [`AgentRegistry`].

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::protocol::agent::AgentDescriptor;

/// Source of agent descriptors
#[cfg_attr(test, mockall::automock)]
pub trait AgentRegistry: Send + Sync {
    /// Look up one agent
    fn get(&self, agent_id: &str) -> Option<AgentDescriptor>;

    /// All registered agents
    fn list(&self) -> Vec<AgentDescriptor>;
}

/// Errors raised while loading a registry file
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("registry file must contain a JSON object keyed by agent id: {0}")]
    Format(#[source] serde_json::Error),

    #[error("invalid registry entry {id}: {source}")]
    Entry {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Registry kept in memory, ordered by agent id
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    agents: RwLock<BTreeMap<String, AgentDescriptor>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding `agents`
    pub fn with_agents(agents: impl IntoIterator<Item = AgentDescriptor>) -> Self {
        let registry = Self::new();
        for agent in agents {
            registry.insert(agent);
        }
        registry
    }

    /// Load a registry file of the form `{"<id>": {"name": ..., ...}}`
    ///
    /// Entries may omit `id`; the map key is used instead.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_json_str(&raw)?;
        info!(path = %path.display(), agents = registry.len(), "registry loaded");
        Ok(registry)
    }

    /// Parse the registry file format from a string
    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        let entries: Map<String, Value> = serde_json::from_str(raw).map_err(RegistryError::Format)?;

        let registry = Self::new();
        for (id, mut entry) in entries {
            if let Value::Object(fields) = &mut entry {
                fields
                    .entry("id")
                    .or_insert_with(|| Value::String(id.clone()));
            }
            let agent: AgentDescriptor = serde_json::from_value(entry)
                .map_err(|source| RegistryError::Entry { id, source })?;
            registry.insert(agent);
        }
        Ok(registry)
    }

    /// Add or replace an agent
    pub fn insert(&self, agent: AgentDescriptor) {
        self.agents.write().insert(agent.id.clone(), agent);
    }

    /// Number of registered agents
    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    /// Whether no agent is registered
    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }
}

impl AgentRegistry for InMemoryRegistry {
    fn get(&self, agent_id: &str) -> Option<AgentDescriptor> {
        self.agents.read().get(agent_id).cloned()
    }

    fn list(&self) -> Vec<AgentDescriptor> {
        self.agents.read().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_registry_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "weather": {{
                    "name": "Weather Agent",
                    "description": "Reports the weather",
                    "skills": ["forecast", "alerts"],
                    "model": "gpt-4",
                    "created_at": "2024-03-01T10:00:00.000000"
                }},
                "travel": {{"id": "travel", "name": "Travel Agent"}}
            }}"#
        )
        .unwrap();

        let registry = InMemoryRegistry::from_json_file(file.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let weather = registry.get("weather").unwrap();
        assert_eq!(weather.id, "weather");
        assert_eq!(weather.skills, vec!["forecast", "alerts"]);
        assert_eq!(weather.created_at.as_deref(), Some("2024-03-01T10:00:00.000000"));

        let ids: Vec<_> = registry.list().into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["travel", "weather"]);
    }

    #[test]
    fn test_missing_file() {
        let err = InMemoryRegistry::from_json_file("/nonexistent/agents.json").unwrap_err();
        assert!(matches!(err, RegistryError::Io { .. }));
    }

    #[test]
    fn test_bad_entry() {
        let err =
            InMemoryRegistry::from_json_str(r#"{"x": {"description": "no name"}}"#).unwrap_err();
        assert!(matches!(err, RegistryError::Entry { ref id, .. } if id == "x"));

        let err = InMemoryRegistry::from_json_str("[]").unwrap_err();
        assert!(matches!(err, RegistryError::Format(_)));
    }

    #[test]
    fn test_insert_replaces() {
        let registry = InMemoryRegistry::new();
        registry.insert(AgentDescriptor::new("a", "First", ""));
        registry.insert(AgentDescriptor::new("a", "Second", ""));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("a").unwrap().name, "Second");
    }
}
