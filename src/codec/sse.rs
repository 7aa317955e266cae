//! Server-Sent Events (SSE) codec for streaming A2A responses
//!
//! Each event's `data` field holds one JSON-RPC envelope: either a success
//! envelope whose `result` is a full task snapshot, or an error envelope.

use axum::response::sse::Event;
use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};

use super::jsonrpc::{JsonRpcResponse, RequestId};
use crate::protocol::{error::A2AError, task::Task};

/// SSE codec for task snapshot streams
#[derive(Debug, Clone, Default)]
pub struct SseCodec;

impl SseCodec {
    /// Create a new SSE codec
    pub fn new() -> Self {
        Self
    }

    /// Encode a task snapshot as an SSE event
    pub fn encode_snapshot(&self, id: &RequestId, task: &Task) -> Result<Event, A2AError> {
        let envelope = JsonRpcResponse::success(Some(id.clone()), serde_json::to_value(task)?);
        Ok(Event::default().data(serde_json::to_string(&envelope)?))
    }

    /// Encode an error as an SSE event
    pub fn encode_error(&self, id: &RequestId, error: &A2AError) -> Result<Event, A2AError> {
        let envelope = JsonRpcResponse::error(Some(id.clone()), error);
        Ok(Event::default().data(serde_json::to_string(&envelope)?))
    }

    /// Parse an SSE byte stream into task snapshots
    ///
    /// Takes a byte stream (typically from reqwest). Error envelopes surface as
    /// `Err` items; the caller decides whether to keep reading.
    pub fn parse_stream<S, E>(&self, byte_stream: S) -> impl Stream<Item = Result<Task, A2AError>>
    where
        S: Stream<Item = Result<bytes::Bytes, E>> + Send + 'static,
        E: std::fmt::Display,
    {
        byte_stream.eventsource().map(|result| match result {
            Ok(event) => {
                let envelope: JsonRpcResponse = serde_json::from_str(&event.data).map_err(|e| {
                    A2AError::Transport(format!("Failed to parse SSE event data: {}", e))
                })?;
                let snapshot = envelope.into_result()?;
                Ok(serde_json::from_value(snapshot)?)
            }
            Err(e) => Err(A2AError::Transport(format!("SSE stream error: {}", e))),
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::pin_mut;

    use super::*;
    use crate::protocol::{message::Message, task::TaskState};

    fn sse_bytes(
        frames: Vec<String>,
    ) -> impl Stream<Item = Result<bytes::Bytes, std::io::Error>> + Send + 'static {
        futures::stream::iter(frames.into_iter().map(|f| Ok(bytes::Bytes::from(f))))
    }

    fn frame(envelope: &JsonRpcResponse) -> String {
        format!("data: {}\n\n", serde_json::to_string(envelope).unwrap())
    }

    #[tokio::test]
    async fn test_parse_snapshots() {
        let id = RequestId::from("1");
        let mut task = Task::new("t-1", Message::user("hi"), TaskState::Working);
        let first = frame(&JsonRpcResponse::success(
            Some(id.clone()),
            serde_json::to_value(&task).unwrap(),
        ));
        task.push_agent_message("hello");
        task.transition(TaskState::Completed);
        let second = frame(&JsonRpcResponse::success(
            Some(id),
            serde_json::to_value(&task).unwrap(),
        ));

        let stream = SseCodec::new().parse_stream(sse_bytes(vec![first, second]));
        pin_mut!(stream);

        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.state, TaskState::Working);
        assert!(!snapshot.is_terminal());

        let snapshot = stream.next().await.unwrap().unwrap();
        assert_eq!(snapshot.state, TaskState::Completed);
        assert_eq!(snapshot.last_agent_text().as_deref(), Some("hello"));

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_parse_error_event() {
        let err = A2AError::ProducerFailed {
            task_id: "t-1".into(),
            message: "boom".into(),
        };
        let data = frame(&JsonRpcResponse::error(Some(RequestId::from("1")), &err));

        let stream = SseCodec::new().parse_stream(sse_bytes(vec![data]));
        pin_mut!(stream);

        match stream.next().await.unwrap() {
            Err(A2AError::Remote { code, message }) => {
                assert_eq!(code, -32603);
                assert!(message.contains("boom"));
            }
            other => panic!("unexpected item: {other:?}"),
        }
    }
}
