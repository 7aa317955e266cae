//! Error types for A2A protocol operations

use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::codec::jsonrpc::JsonRpcError;

/// Malformed envelope (bad JSON, missing `method` or `id`)
pub const INVALID_REQUEST: i64 = -32600;
/// Unrecognized method name
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Params that fail to decode or validate
pub const INVALID_PARAMS: i64 = -32602;
/// Internal failure, including a failed response producer
pub const INTERNAL_ERROR: i64 = -32603;
/// Unknown task or agent id
pub const NOT_FOUND: i64 = -32001;
/// Credentials rejected upstream of dispatch
pub const UNAUTHORIZED: i64 = -32010;

/// Main error type for A2A protocol operations
#[derive(Debug, Error)]
pub enum A2AError {
    /// Malformed JSON-RPC envelope
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    /// Method name not recognized
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Params failed to decode or validate
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Task not found
    #[error("Task with ID {task_id} not found")]
    TaskNotFound { task_id: String },

    /// Agent not found in the registry
    #[error("Agent with ID {agent_id} not found")]
    AgentNotFound { agent_id: String },

    /// Authentication rejected
    #[error("Invalid or missing API key")]
    Unauthorized,

    /// The response producer failed or exceeded its deadline
    #[error("Task {task_id} failed: {message}")]
    ProducerFailed { task_id: String, message: String },

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Transport-level error (network, connection, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error envelope returned by a remote agent
    #[error("JSON-RPC error {code}: {message}")]
    Remote { code: i64, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl A2AError {
    /// Stable JSON-RPC error code
    pub fn code(&self) -> i64 {
        match self {
            A2AError::InvalidRequest(_) => INVALID_REQUEST,
            A2AError::MethodNotFound(_) => METHOD_NOT_FOUND,
            A2AError::InvalidParams(_) | A2AError::Serialization(_) => INVALID_PARAMS,
            A2AError::TaskNotFound { .. } | A2AError::AgentNotFound { .. } => NOT_FOUND,
            A2AError::Unauthorized => UNAUTHORIZED,
            A2AError::Remote { code, .. } => *code,
            A2AError::ProducerFailed { .. }
            | A2AError::Timeout
            | A2AError::Internal(_)
            | A2AError::Transport(_) => INTERNAL_ERROR,
        }
    }

    /// HTTP status mirroring the error class
    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            INVALID_REQUEST | INVALID_PARAMS => StatusCode::BAD_REQUEST,
            METHOD_NOT_FOUND | NOT_FOUND => StatusCode::NOT_FOUND,
            UNAUTHORIZED => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON-RPC error object for this error
    pub fn to_rpc_error(&self) -> JsonRpcError {
        let data = match self {
            A2AError::ProducerFailed { task_id, .. } | A2AError::TaskNotFound { task_id } => {
                Some(json!({ "task_id": task_id }))
            }
            A2AError::AgentNotFound { agent_id } => Some(json!({ "agent_id": agent_id })),
            _ => None,
        };
        JsonRpcError {
            code: self.code(),
            message: self.to_string(),
            data,
        }
    }

    /// Rebuild an error from a JSON-RPC error object received over the wire
    pub fn from_rpc_error(error: JsonRpcError) -> Self {
        let data_field = |key: &str| {
            error
                .data
                .as_ref()
                .and_then(|d| d.get(key))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        match error.code {
            NOT_FOUND => {
                if let Some(task_id) = data_field("task_id") {
                    A2AError::TaskNotFound { task_id }
                } else if let Some(agent_id) = data_field("agent_id") {
                    A2AError::AgentNotFound { agent_id }
                } else {
                    A2AError::Remote {
                        code: error.code,
                        message: error.message,
                    }
                }
            }
            UNAUTHORIZED => A2AError::Unauthorized,
            METHOD_NOT_FOUND => A2AError::MethodNotFound(error.message),
            _ => A2AError::Remote {
                code: error.code,
                message: error.message,
            },
        }
    }
}

impl From<reqwest::Error> for A2AError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            A2AError::Timeout
        } else if err.is_connect() {
            A2AError::Transport(format!("Connection error: {}", err))
        } else {
            A2AError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_status() {
        let err = A2AError::InvalidRequest("missing method".into());
        assert_eq!(err.code(), -32600);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err = A2AError::MethodNotFound("tasks/frobnicate".into());
        assert_eq!(err.code(), -32601);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = A2AError::TaskNotFound {
            task_id: "t-1".into(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        assert_eq!(
            A2AError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_producer_failure_references_task() {
        let err = A2AError::ProducerFailed {
            task_id: "t-9".into(),
            message: "model offline".into(),
        };
        let rpc = err.to_rpc_error();

        assert_eq!(rpc.code, INTERNAL_ERROR);
        assert!(rpc.message.contains("t-9"));
        assert_eq!(rpc.data.unwrap()["task_id"], "t-9");
    }

    #[test]
    fn test_rpc_error_round_trip() {
        let original = A2AError::TaskNotFound {
            task_id: "abc".into(),
        };
        match A2AError::from_rpc_error(original.to_rpc_error()) {
            A2AError::TaskNotFound { task_id } => assert_eq!(task_id, "abc"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
