//! A2A service request types

use crate::{codec::jsonrpc::RequestId, protocol::operation::A2AOperation};

/// Which endpoint a request was addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// `POST /agency`
    Agency,

    /// `POST /agents/{agent_id}`
    Agent(String),
}

impl Scope {
    /// The addressed agent id, if any
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Scope::Agency => None,
            Scope::Agent(id) => Some(id),
        }
    }
}

/// A decoded request to the A2A service
#[derive(Debug, Clone)]
pub struct A2ARequest {
    /// The operation to execute
    pub operation: A2AOperation,

    /// Correlation id and target endpoint
    pub context: RequestContext,
}

impl A2ARequest {
    /// Create a new A2A request
    pub fn new(operation: A2AOperation, context: RequestContext) -> Self {
        Self { operation, context }
    }
}

/// Request context carried alongside the operation
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// JSON-RPC id echoed back in the response
    pub id: RequestId,

    /// Endpoint the request arrived on
    pub scope: Scope,
}

impl RequestContext {
    /// Context for a request to the agency endpoint
    pub fn agency(id: RequestId) -> Self {
        Self {
            id,
            scope: Scope::Agency,
        }
    }

    /// Context for a request to an agent endpoint
    pub fn agent(id: RequestId, agent_id: impl Into<String>) -> Self {
        Self {
            id,
            scope: Scope::Agent(agent_id.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_creation() {
        let context = RequestContext::agent(RequestId::from("1"), "weather");
        let request = A2ARequest::new(A2AOperation::Info, context);

        assert_eq!(request.context.scope.agent_id(), Some("weather"));
        assert_eq!(request.context.id, RequestId::from("1"));
        assert_eq!(RequestContext::agency(RequestId::from(2)).scope, Scope::Agency);
    }
}
