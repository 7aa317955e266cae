//! Discovery card construction
//!
//! Cards advertise identity, the endpoint accepting A2A requests, the expected
//! credential and the skill list. The base URL is resolved per request by the
//! caller, so one builder serves every host name the server is reached under.

use serde_json::{json, Value};

use crate::protocol::agent::{
    AgencyInfo, AgentCard, AgentCardInfo, AgentDescriptor, AgentSkill, Contact, SecurityScheme,
    ServerEntry,
};

/// Card format version
pub const AGENT_FORMAT: &str = "1.0.0";
/// Protocol advertised in server entries
pub const PROTOCOL: &str = "a2a";

pub const AGENCY_ID: &str = "ai-agency";
pub const AGENCY_NAME: &str = "AI Agency";
pub const AGENCY_DESCRIPTION: &str = "Autonomous AI Agency that can create and manage other agents";
pub const AGENCY_VERSION: &str = "1.0.0";

const DEFAULT_AGENT_VERSION: &str = "1.0.0";

/// Fixed skills of the agency endpoint: name, description, examples
const AGENCY_SKILLS: [(&str, &str, [&str; 2]); 3] = [
    (
        "agent_creation",
        "Create new specialized AI agents",
        ["Create a data analysis agent", "Make an agent for customer support"],
    ),
    (
        "agent_management",
        "Manage existing AI agents",
        ["List all agents", "Update the weather agent"],
    ),
    (
        "inter_agent_communication",
        "Facilitate communication between agents",
        [
            "Ask the travel agent to book a flight",
            "Tell the weather agent to check Tokyo",
        ],
    ),
];

/// Builds agency and agent discovery cards
#[derive(Debug, Clone)]
pub struct CardBuilder {
    api_key_header: String,
}

impl CardBuilder {
    /// Create a builder advertising an API key in `api_key_header`
    pub fn new(api_key_header: impl Into<String>) -> Self {
        Self {
            api_key_header: api_key_header.into(),
        }
    }

    /// Card for the agency endpoint at `{base_url}/agency`
    pub fn agency(&self, base_url: &str) -> AgentCard {
        let url = format!("{}/agency", base_url.trim_end_matches('/'));
        let skills = AGENCY_SKILLS
            .iter()
            .map(|(name, description, examples)| AgentSkill {
                name: name.to_string(),
                description: description.to_string(),
                examples: Some(examples.iter().map(|e| e.to_string()).collect()),
            })
            .collect();

        AgentCard {
            agent_format: AGENT_FORMAT.to_string(),
            info: AgentCardInfo {
                id: AGENCY_ID.to_string(),
                name: AGENCY_NAME.to_string(),
                description: AGENCY_DESCRIPTION.to_string(),
                version: AGENCY_VERSION.to_string(),
                contact: Contact {
                    name: AGENCY_NAME.to_string(),
                    url: url.clone(),
                },
            },
            servers: vec![ServerEntry {
                url,
                protocol: PROTOCOL.to_string(),
            }],
            security: vec![SecurityScheme::api_key_header(&self.api_key_header)],
            skills,
            input_schema: Some(agency_input_schema()),
        }
    }

    /// Card for one agent at `{base_url}/agents/{id}`
    ///
    /// Skill `i` carries the `i`-th example list when one exists.
    pub fn agent(&self, agent: &AgentDescriptor, base_url: &str) -> AgentCard {
        let url = format!("{}/agents/{}", base_url.trim_end_matches('/'), agent.id);
        let examples = agent.examples.as_deref().unwrap_or_default();

        let skills = agent
            .skills
            .iter()
            .enumerate()
            .map(|(i, skill)| AgentSkill {
                name: skill.clone(),
                description: format!("Skill in {skill}"),
                examples: examples.get(i).cloned(),
            })
            .collect();

        AgentCard {
            agent_format: AGENT_FORMAT.to_string(),
            info: AgentCardInfo {
                id: agent.id.clone(),
                name: agent.name.clone(),
                description: agent.description.clone(),
                version: agent
                    .version
                    .clone()
                    .unwrap_or_else(|| DEFAULT_AGENT_VERSION.to_string()),
                contact: Contact {
                    name: agent.name.clone(),
                    url: url.clone(),
                },
            },
            servers: vec![ServerEntry {
                url,
                protocol: PROTOCOL.to_string(),
            }],
            security: vec![SecurityScheme::api_key_header(&self.api_key_header)],
            skills,
            input_schema: None,
        }
    }
}

/// `agent/info` result for the agency endpoint
pub fn agency_info(agent_count: usize) -> AgencyInfo {
    AgencyInfo {
        id: AGENCY_ID.to_string(),
        name: AGENCY_NAME.to_string(),
        description: AGENCY_DESCRIPTION.to_string(),
        skills: AGENCY_SKILLS.iter().map(|(name, ..)| name.to_string()).collect(),
        agent_count,
        version: AGENCY_VERSION.to_string(),
    }
}

fn agency_input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "string",
                "enum": ["create_agent", "list_agents", "get_agent", "update_agent", "delete_agent", "communicate"],
                "description": "The action to perform"
            },
            "agent_details": {
                "type": "object",
                "description": "Details for agent creation or updates",
                "properties": {
                    "name": {"type": "string", "description": "Name of the agent"},
                    "description": {"type": "string", "description": "Description of the agent's purpose"},
                    "skills": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Skills the agent should have"
                    },
                    "model": {"type": "string", "description": "LLM model to use for the agent"}
                }
            },
            "agent_id": {"type": "string", "description": "ID of the agent to interact with"},
            "message": {"type": "string", "description": "Message to send to the agent"}
        }
    })
}
