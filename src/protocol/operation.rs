//! A2A protocol operations

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::{
    error::A2AError,
    task::{ListTasksParams, SendTaskParams, TaskIdParams},
};

pub const TASKS_SEND: &str = "tasks/send";
pub const TASKS_SEND_SUBSCRIBE: &str = "tasks/sendSubscribe";
pub const TASKS_GET: &str = "tasks/get";
pub const TASKS_CANCEL: &str = "tasks/cancel";
pub const TASKS_LIST: &str = "tasks/list";
pub const AGENT_INFO: &str = "agent/info";

/// A2A protocol operations
///
/// One variant per JSON-RPC method accepted by the agent and agency endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum A2AOperation {
    /// Create a task and wait for the full reply (`tasks/send`)
    Send(SendTaskParams),

    /// Create a task and stream snapshots (`tasks/sendSubscribe`)
    SendSubscribe(SendTaskParams),

    /// Get a task by ID
    GetTask(TaskIdParams),

    /// Cancel a task
    CancelTask(TaskIdParams),

    /// List task summaries
    ListTasks(ListTasksParams),

    /// Describe the target agent or the agency
    Info,
}

impl A2AOperation {
    /// Decode an operation from a method name and its params
    ///
    /// Unknown methods fail with `MethodNotFound` before params are inspected.
    pub fn from_method(method: &str, params: Value) -> Result<Self, A2AError> {
        match method {
            TASKS_SEND => Ok(Self::Send(decode_params(params)?)),
            TASKS_SEND_SUBSCRIBE => Ok(Self::SendSubscribe(decode_params(params)?)),
            TASKS_GET => Ok(Self::GetTask(decode_params(params)?)),
            TASKS_CANCEL => Ok(Self::CancelTask(decode_params(params)?)),
            TASKS_LIST => Ok(Self::ListTasks(decode_params(params)?)),
            AGENT_INFO => Ok(Self::Info),
            other => Err(A2AError::MethodNotFound(other.to_string())),
        }
    }

    /// JSON-RPC method name for this operation
    pub fn method(&self) -> &'static str {
        match self {
            A2AOperation::Send(_) => TASKS_SEND,
            A2AOperation::SendSubscribe(_) => TASKS_SEND_SUBSCRIBE,
            A2AOperation::GetTask(_) => TASKS_GET,
            A2AOperation::CancelTask(_) => TASKS_CANCEL,
            A2AOperation::ListTasks(_) => TASKS_LIST,
            A2AOperation::Info => AGENT_INFO,
        }
    }

    /// JSON-RPC params for this operation
    pub fn params(&self) -> Result<Value, A2AError> {
        let params = match self {
            A2AOperation::Send(p) | A2AOperation::SendSubscribe(p) => serde_json::to_value(p)?,
            A2AOperation::GetTask(p) | A2AOperation::CancelTask(p) => serde_json::to_value(p)?,
            A2AOperation::ListTasks(p) => serde_json::to_value(p)?,
            A2AOperation::Info => json!({}),
        };
        Ok(params)
    }

    /// Check if this operation expects a streaming response
    pub fn is_streaming(&self) -> bool {
        matches!(self, A2AOperation::SendSubscribe(_))
    }
}

fn decode_params<T: DeserializeOwned>(params: Value) -> Result<T, A2AError> {
    serde_json::from_value(params).map_err(|e| A2AError::InvalidParams(e.to_string()))
}
