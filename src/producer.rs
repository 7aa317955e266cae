//! Response producers
//!
//! A [`ResponseProducer`] turns an incoming message into the reply text for one
//! task. It is called exactly once per task creation and may take seconds, so it
//! is always awaited and never run while a store lock is held.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    protocol::{
        agent::AgentDescriptor,
        error::A2AError,
        message::{FilePart, Message},
    },
    registry::AgentRegistry,
};

/// Who the reply is generated for
#[derive(Debug, Clone, PartialEq)]
pub enum ProducerTarget {
    /// The agency endpoint itself
    Agency,
    /// A registered agent
    Agent(AgentDescriptor),
}

/// The parts of a message a producer consumes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProducerInput {
    /// Concatenated text parts
    pub text: String,
    pub files: Vec<FilePart>,
    pub data: Vec<Value>,
}

impl From<&Message> for ProducerInput {
    fn from(message: &Message) -> Self {
        Self {
            text: message.text(),
            files: message.files(),
            data: message.data(),
        }
    }
}

/// External reasoning step producing reply text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResponseProducer: Send + Sync {
    /// Generate the complete reply for `input`
    async fn generate(
        &self,
        target: &ProducerTarget,
        input: &ProducerInput,
    ) -> Result<String, A2AError>;
}

/// Run `producer` for one task, bounded by `deadline` when set
///
/// Any failure, including an expired deadline, is reported against `task_id`.
pub async fn produce_reply(
    producer: &dyn ResponseProducer,
    deadline: Option<Duration>,
    task_id: &str,
    target: &ProducerTarget,
    input: &ProducerInput,
) -> Result<String, A2AError> {
    let generation = producer.generate(target, input);
    let outcome = match deadline {
        Some(limit) => tokio::time::timeout(limit, generation)
            .await
            .unwrap_or(Err(A2AError::Timeout)),
        None => generation.await,
    };
    outcome.map_err(|e| A2AError::ProducerFailed {
        task_id: task_id.to_string(),
        message: e.to_string(),
    })
}

/// Deterministic producer built from canned replies
///
/// Picks a reply by intent: creating agents, listing agents, a received file,
/// received structured data, or a self-introduction.
#[derive(Clone)]
pub struct TemplateProducer {
    registry: Arc<dyn AgentRegistry>,
}

impl TemplateProducer {
    /// Create a producer that reports on `registry`
    pub fn new(registry: Arc<dyn AgentRegistry>) -> Self {
        Self { registry }
    }

    fn agent_reply(&self, agent: &AgentDescriptor, input: &ProducerInput) -> String {
        let name = &agent.name;
        let skills = agent.skills.join(", ");

        match Intent::of(input) {
            Intent::CreateAgent => format!(
                "I'm {name}. I'd be happy to help with creating a new agent. Please provide \
                 details like the name, description, and skills for the new agent."
            ),
            Intent::ListAgents => format!(
                "I'm {name}. I can list all available agents. Currently, there are {} agents \
                 registered in the system.",
                self.registry.list().len()
            ),
            Intent::File(file_name) => format!(
                "I'm {name}. I received your file{}. I'll process it according to my \
                 capabilities: {skills}.",
                file_suffix(file_name)
            ),
            Intent::Data => format!(
                "I'm {name}. I received your structured data. I'll analyze it based on my \
                 expertise in: {skills}."
            ),
            Intent::Other => format!(
                "I'm {name}, specialized in {skills}. {} How can I assist you today?",
                agent.description
            ),
        }
    }

    fn agency_reply(&self, input: &ProducerInput) -> String {
        match Intent::of(input) {
            Intent::CreateAgent => "I am the AI Agency. I can help you create a new agent. \
                 To create an agent, I need the following information:\n\
                 - Name for the agent\n\
                 - Description of its purpose\n\
                 - List of skills it should have\n\
                 - (Optional) Specific model to use"
                .to_string(),
            Intent::ListAgents => {
                let agents = self.registry.list();
                if agents.is_empty() {
                    return "There are no agents currently registered in the system.".to_string();
                }
                let listing = agents
                    .iter()
                    .take(5)
                    .map(|agent| format!("- {}: {}", agent.name, agent.description))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "Here are the available agents:\n{listing}\n\nThere are {} agents in total.",
                    agents.len()
                )
            }
            Intent::File(file_name) => format!(
                "I received your file{}. How would you like me to process it? I can create \
                 specialized agents for handling this type of data.",
                file_suffix(file_name)
            ),
            Intent::Data => "I received your structured data. I can create specialized agents \
                 for analyzing this kind of information or forward it to an existing agent. \
                 What would you like to do?"
                .to_string(),
            Intent::Other => "I am the AI Agency. I can help you create and manage AI agents. \
                 My capabilities include:\n\
                 - Creating specialized agents for specific tasks\n\
                 - Managing existing agents (listing, updating, deleting)\n\
                 - Facilitating communication between agents\n\n\
                 How can I assist you today?"
                .to_string(),
        }
    }
}

#[async_trait]
impl ResponseProducer for TemplateProducer {
    async fn generate(
        &self,
        target: &ProducerTarget,
        input: &ProducerInput,
    ) -> Result<String, A2AError> {
        Ok(match target {
            ProducerTarget::Agency => self.agency_reply(input),
            ProducerTarget::Agent(agent) => self.agent_reply(agent, input),
        })
    }
}

enum Intent<'a> {
    CreateAgent,
    ListAgents,
    File(&'a str),
    Data,
    Other,
}

impl<'a> Intent<'a> {
    fn of(input: &'a ProducerInput) -> Self {
        let text = input.text.to_lowercase();
        let mentions = |word: &str| text.contains(word);

        if mentions("create") && mentions("agent") {
            Intent::CreateAgent
        } else if mentions("list") && mentions("agent") {
            Intent::ListAgents
        } else if let (true, Some(file)) = (mentions("file"), input.files.first()) {
            Intent::File(&file.file_name)
        } else if mentions("data") && !input.data.is_empty() {
            Intent::Data
        } else {
            Intent::Other
        }
    }
}

fn file_suffix(file_name: &str) -> String {
    if file_name.is_empty() {
        String::new()
    } else {
        format!(" {file_name}")
    }
}
