//! Agent discovery and capability types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-only view of an agent supplied by the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDescriptor {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Skill names, in advertised order
    #[serde(default)]
    pub skills: Vec<String>,

    /// Example prompts, positionally matched to `skills`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Vec<String>>>,

    /// Where the agent is reachable, if the registry recorded it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AgentDescriptor {
    /// Create a descriptor with the required identity fields
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            skills: Vec::new(),
            examples: None,
            endpoint_url: None,
            version: None,
            status: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Set the skill names
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    /// Set per-skill example lists
    pub fn with_examples(mut self, examples: Vec<Vec<String>>) -> Self {
        self.examples = Some(examples);
        self
    }

    /// Set the recorded endpoint URL
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the agent version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Discovery card served at `/.well-known/agent.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentCard {
    /// Card format version
    #[serde(rename = "agentFormat")]
    pub agent_format: String,

    /// Identity block
    pub info: AgentCardInfo,

    /// Endpoints accepting A2A requests; exactly one entry
    pub servers: Vec<ServerEntry>,

    /// Accepted credentials
    pub security: Vec<SecurityScheme>,

    /// Advertised skills
    pub skills: Vec<AgentSkill>,

    /// Input document accepted by the agency endpoint
    #[serde(rename = "inputSchema", skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

/// Identity block of a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentCardInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub contact: Contact,
}

/// Contact entry of a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub url: String,
}

/// Server entry of a card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerEntry {
    pub url: String,
    pub protocol: String,
}

/// Security scheme for authentication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    /// API key carried in a request header
    #[serde(rename = "apiKey")]
    ApiKey {
        name: String,
        #[serde(rename = "in")]
        location: String,
    },
}

impl SecurityScheme {
    /// API key in the named header
    pub fn api_key_header(name: impl Into<String>) -> Self {
        SecurityScheme::ApiKey {
            name: name.into(),
            location: "header".to_string(),
        }
    }
}

/// One advertised skill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSkill {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<String>>,
}

/// Result of `agent/info` for a registered agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub skills: Vec<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&AgentDescriptor> for AgentInfo {
    fn from(agent: &AgentDescriptor) -> Self {
        Self {
            id: agent.id.clone(),
            name: agent.name.clone(),
            description: agent.description.clone(),
            skills: agent.skills.clone(),
            status: agent.status.clone().unwrap_or_else(|| "active".to_string()),
            endpoint_url: agent.endpoint_url.clone(),
            created_at: agent.created_at.clone(),
            updated_at: agent.updated_at.clone(),
        }
    }
}

/// Result of `agent/info` on the agency endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgencyInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub skills: Vec<String>,
    pub agent_count: usize,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_descriptor_from_registry_json() {
        let raw = json!({
            "id": "weather",
            "name": "Weather Agent",
            "skills": ["forecast"],
            "status": "active",
            "model": "ignored-extra-field"
        });
        let agent: AgentDescriptor = serde_json::from_value(raw).unwrap();

        assert_eq!(agent.name, "Weather Agent");
        assert_eq!(agent.description, "");
        assert_eq!(agent.skills, vec!["forecast"]);
        assert!(agent.examples.is_none());
    }

    #[test]
    fn test_security_scheme_wire_shape() {
        let json = serde_json::to_value(SecurityScheme::api_key_header("x-api-key")).unwrap();
        assert_eq!(
            json,
            json!({"type": "apiKey", "name": "x-api-key", "in": "header"})
        );
    }

    #[test]
    fn test_agent_info_defaults_status() {
        let agent = AgentDescriptor::new("a", "A", "desc").with_skills(["x"]);
        let info = AgentInfo::from(&agent);

        assert_eq!(info.status, "active");
        assert_eq!(info.skills, vec!["x"]);
    }
}
