//! Wire codecs for the JSON-RPC and SSE bindings

pub mod jsonrpc;
pub mod sse;

pub use jsonrpc::{JsonRpcCodec, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use sse::SseCodec;
