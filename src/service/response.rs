//! A2A service response types

use std::fmt;

use futures::stream::BoxStream;
use serde_json::Value;

use crate::{
    protocol::{
        agent::{AgencyInfo, AgentInfo},
        error::A2AError,
        task::{Task, TaskListResponse},
    },
    streaming::StreamEvent,
};

/// Response from an A2A service operation
pub enum A2AResponse {
    /// Task response (from send, get, cancel)
    Task(Box<Task>),

    /// Task summaries (from list)
    TaskList(TaskListResponse),

    /// Agent description (from info on an agent endpoint)
    AgentInfo(Box<AgentInfo>),

    /// Agency description (from info on the agency endpoint)
    AgencyInfo(Box<AgencyInfo>),

    /// Snapshot stream (from sendSubscribe)
    Stream(BoxStream<'static, StreamEvent>),
}

impl A2AResponse {
    /// Extract a task from the response, if present
    pub fn into_task(self) -> Option<Task> {
        match self {
            A2AResponse::Task(task) => Some(*task),
            _ => None,
        }
    }

    /// Extract a task list from the response, if present
    pub fn into_task_list(self) -> Option<TaskListResponse> {
        match self {
            A2AResponse::TaskList(list) => Some(list),
            _ => None,
        }
    }

    /// Extract the snapshot stream, if present
    pub fn into_stream(self) -> Option<BoxStream<'static, StreamEvent>> {
        match self {
            A2AResponse::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// Check if the response is a stream
    pub fn is_stream(&self) -> bool {
        matches!(self, A2AResponse::Stream(_))
    }

    /// JSON-RPC `result` value for a non-streaming response
    pub fn to_result(&self) -> Result<Value, A2AError> {
        let value = match self {
            A2AResponse::Task(task) => serde_json::to_value(task)?,
            A2AResponse::TaskList(list) => serde_json::to_value(list)?,
            A2AResponse::AgentInfo(info) => serde_json::to_value(info)?,
            A2AResponse::AgencyInfo(info) => serde_json::to_value(info)?,
            A2AResponse::Stream(_) => {
                return Err(A2AError::Internal(
                    "stream responses have no single result".to_string(),
                ))
            }
        };
        Ok(value)
    }
}

impl fmt::Debug for A2AResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            A2AResponse::Task(task) => f.debug_tuple("Task").field(task).finish(),
            A2AResponse::TaskList(list) => f.debug_tuple("TaskList").field(list).finish(),
            A2AResponse::AgentInfo(info) => f.debug_tuple("AgentInfo").field(info).finish(),
            A2AResponse::AgencyInfo(info) => f.debug_tuple("AgencyInfo").field(info).finish(),
            A2AResponse::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::{message::Message, task::TaskState};

    use super::*;

    #[test]
    fn test_response_task() {
        let task = Task::new("task-123", Message::user("Test"), TaskState::Working);
        let response = A2AResponse::Task(Box::new(task));

        assert!(!response.is_stream());
        assert_eq!(response.to_result().unwrap()["id"], "task-123");

        let extracted = response.into_task();
        assert_eq!(extracted.unwrap().id, "task-123");
    }

    #[test]
    fn test_stream_has_no_result() {
        let response = A2AResponse::Stream(Box::pin(futures::stream::empty()));

        assert!(response.is_stream());
        assert!(response.to_result().is_err());
        assert_eq!(format!("{response:?}"), "Stream(..)");
    }
}
