//! Core A2A protocol types and definitions

pub mod agent;
pub mod error;
pub mod message;
pub mod operation;
pub mod task;

pub use agent::{AgencyInfo, AgentCard, AgentDescriptor, AgentInfo, AgentSkill};
pub use error::A2AError;
pub use message::{FilePart, Message, Part, Role};
pub use operation::A2AOperation;
pub use task::{Task, TaskListResponse, TaskState, TaskSummary};
