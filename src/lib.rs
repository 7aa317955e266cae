//! # A2A Agency
//!
//! An Agent2Agent (A2A) server hosting an agency of registered agents.
//!
//! Requests arrive as JSON-RPC 2.0 envelopes over HTTP, either on the agency
//! endpoint or on a single agent's endpoint. They flow through Tower layers
//! (authentication, validation) into a dispatcher that drives tasks in a
//! shared [`store::TaskStore`]. Replies come from a pluggable
//! [`producer::ResponseProducer`] and can be streamed back chunk by chunk as
//! Server-Sent Events.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use a2a_agency::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry: Arc<dyn AgentRegistry> = Arc::new(InMemoryRegistry::with_agents([
//!         AgentDescriptor::new("abc", "Research Bot", "Finds things").with_skills(["search"]),
//!     ]));
//!     let producer = Arc::new(TemplateProducer::new(registry.clone()));
//!
//!     let server = AgencyServer::new(AgencyConfig::default(), registry, producer);
//!     let listener = server.bind().await?;
//!     server
//!         .serve_with_shutdown(listener, async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod card;
pub mod client;
pub mod codec;
pub mod config;
pub mod layer;
pub mod producer;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod service;
pub mod store;
pub mod streaming;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        card::CardBuilder,
        client::{A2AClient, ClientConfig},
        config::{AgencyConfig, StreamingConfig},
        layer::AuthCredentials,
        producer::{ProducerInput, ProducerTarget, ResponseProducer, TemplateProducer},
        protocol::{
            A2AError, A2AOperation, AgencyInfo, AgentCard, AgentDescriptor, AgentInfo, Message,
            Part, Role, Task, TaskListResponse, TaskState,
        },
        registry::{AgentRegistry, InMemoryRegistry},
        server::AgencyServer,
        store::TaskStore,
    };
}
