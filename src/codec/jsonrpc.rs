//! JSON-RPC 2.0 codec for the A2A protocol
//!
//! Decodes incoming request envelopes into [`A2AOperation`]s and builds the
//! success and error envelopes sent back, on both the server and client side.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use uuid::Uuid;

use crate::protocol::{error::A2AError, operation::A2AOperation};

/// The JSON-RPC protocol version.
pub const JSONRPC_VERSION: &str = "2.0";

/// Correlation id of a JSON-RPC request; any JSON scalar except `null`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(Number),
    Bool(bool),
}

impl RequestId {
    /// A fresh time-ordered id for outbound requests
    pub fn generate() -> Self {
        RequestId::String(Uuid::now_v7().to_string())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => Some(RequestId::Number(n.clone())),
            Value::Bool(b) => Some(RequestId::Bool(*b)),
            _ => None,
        }
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: RequestId,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<RequestId>,
}

impl JsonRpcResponse {
    /// Success envelope around `result`
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Error envelope for `error`
    pub fn error(id: Option<RequestId>, error: &A2AError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error.to_rpc_error()),
            id,
        }
    }

    /// Unwrap the result, turning an error envelope into an [`A2AError`]
    pub fn into_result(self) -> Result<Value, A2AError> {
        if let Some(error) = self.error {
            return Err(A2AError::from_rpc_error(error));
        }
        self.result.ok_or_else(|| {
            A2AError::Transport("JSON-RPC response missing 'result' field".to_string())
        })
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// A request that could not be turned into an operation
///
/// Carries whatever id could be recovered so the error envelope still correlates.
#[derive(Debug)]
pub struct RejectedRequest {
    pub id: Option<RequestId>,
    pub error: A2AError,
}

impl RejectedRequest {
    fn new(id: Option<RequestId>, error: A2AError) -> Self {
        Self { id, error }
    }
}

/// JSON-RPC 2.0 codec for A2A operations
#[derive(Debug, Clone, Default)]
pub struct JsonRpcCodec;

impl JsonRpcCodec {
    /// Create a new JSON-RPC codec
    pub fn new() -> Self {
        Self
    }

    /// Decode a raw request body
    ///
    /// `method` and `id` are required; `params` defaults to an empty object.
    pub fn decode_request(
        &self,
        body: &[u8],
    ) -> Result<(RequestId, A2AOperation), RejectedRequest> {
        let envelope: Value = serde_json::from_slice(body).map_err(|e| {
            RejectedRequest::new(
                None,
                A2AError::InvalidRequest(format!("Invalid JSON: {}", e)),
            )
        })?;

        let Value::Object(mut envelope) = envelope else {
            return Err(RejectedRequest::new(
                None,
                A2AError::InvalidRequest("Request must be a JSON object".to_string()),
            ));
        };

        let id = envelope.get("id").and_then(RequestId::from_value);

        if let Some(version) = envelope.get("jsonrpc") {
            if version.as_str() != Some(JSONRPC_VERSION) {
                return Err(RejectedRequest::new(
                    id,
                    A2AError::InvalidRequest("Unsupported JSON-RPC version".to_string()),
                ));
            }
        }

        let method = envelope
            .get("method")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);

        let (id, method) = match (id, method) {
            (Some(id), Some(method)) => (id, method),
            (id, None) => {
                return Err(RejectedRequest::new(
                    id,
                    A2AError::InvalidRequest("Missing method".to_string()),
                ))
            }
            (None, Some(_)) => {
                return Err(RejectedRequest::new(
                    None,
                    A2AError::InvalidRequest("Missing id".to_string()),
                ))
            }
        };

        let params = match envelope.remove("params") {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(params @ Value::Object(_)) => params,
            Some(_) => {
                return Err(RejectedRequest::new(
                    Some(id),
                    A2AError::InvalidParams("params must be an object".to_string()),
                ))
            }
        };

        match A2AOperation::from_method(&method, params) {
            Ok(operation) => Ok((id, operation)),
            Err(error) => Err(RejectedRequest::new(Some(id), error)),
        }
    }

    /// Encode an operation as a request envelope
    pub fn encode_request(
        &self,
        id: RequestId,
        operation: &A2AOperation,
    ) -> Result<Bytes, A2AError> {
        let request = JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: operation.method().to_string(),
            params: operation.params()?,
            id,
        };
        Ok(Bytes::from(serde_json::to_vec(&request)?))
    }

    /// Decode a response envelope into its result value
    pub fn decode_response(&self, body: &[u8]) -> Result<Value, A2AError> {
        let response: JsonRpcResponse = serde_json::from_slice(body).map_err(|e| {
            A2AError::Transport(format!("Failed to parse JSON-RPC response: {}", e))
        })?;
        response.into_result()
    }

    /// Get the content type for this codec
    pub fn content_type(&self) -> &str {
        "application/json"
    }
}
