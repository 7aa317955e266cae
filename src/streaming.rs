//! Chunked streaming of task replies
//!
//! A reply is split into word-aligned chunks and delivered as a lazy sequence of
//! full task snapshots: the freshly created task first, then one snapshot per
//! chunk. The snapshot carrying the final chunk is already `completed`.

use std::{sync::Arc, time::Duration};

use async_stream::stream;
use futures::stream::BoxStream;
use tracing::{debug, info, warn};

use crate::{
    config::StreamingConfig,
    producer::{produce_reply, ProducerInput, ProducerTarget, ResponseProducer},
    protocol::{
        error::A2AError,
        task::{Task, TaskState},
    },
    store::TaskStore,
};

/// One item of a task stream
#[derive(Debug)]
pub enum StreamEvent {
    /// Authoritative current state of the task
    Snapshot(Task),

    /// The stream ended with an error
    Failed { task_id: String, error: A2AError },
}

impl StreamEvent {
    /// The snapshot carried by this event, if any
    pub fn snapshot(&self) -> Option<&Task> {
        match self {
            StreamEvent::Snapshot(task) => Some(task),
            StreamEvent::Failed { .. } => None,
        }
    }
}

/// Split `text` into chunks that never break a word
///
/// Words are packed greedily; a chunk closes once its words, joined by single
/// spaces, reach `chunk_size` characters. Whitespace is kept verbatim at the
/// front of the chunk that follows it, so concatenating the chunks yields `text`.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut joined_len = 0;
    let mut words = 0;
    let mut rest = text;

    loop {
        let trimmed = rest.trim_start();
        if trimmed.is_empty() {
            break;
        }
        let word_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
        let word = &trimmed[..word_end];

        current.push_str(&rest[..rest.len() - trimmed.len()]);
        current.push_str(word);
        joined_len += word.chars().count() + usize::from(words > 0);
        words += 1;
        rest = &trimmed[word_end..];

        if joined_len >= chunk_size {
            chunks.push(std::mem::take(&mut current));
            joined_len = 0;
            words = 0;
        }
    }

    current.push_str(rest);
    match chunks.last_mut() {
        Some(last) if words == 0 => last.push_str(&current),
        _ => chunks.push(current),
    }
    chunks
}

/// Drives a task from its first snapshot to a terminal state
#[derive(Clone)]
pub struct TaskStreamer {
    store: Arc<TaskStore>,
    producer: Arc<dyn ResponseProducer>,
    config: StreamingConfig,
    producer_timeout: Option<Duration>,
}

impl TaskStreamer {
    /// Create a streamer writing to `store`
    pub fn new(
        store: Arc<TaskStore>,
        producer: Arc<dyn ResponseProducer>,
        config: StreamingConfig,
        producer_timeout: Option<Duration>,
    ) -> Self {
        Self {
            store,
            producer,
            config,
            producer_timeout,
        }
    }

    /// Stream snapshots of `task` while its reply is generated and delivered
    ///
    /// Nothing runs until the stream is polled. Cancellation is observed between
    /// chunks: a canceled task yields one last snapshot and the stream ends.
    /// Dropping the stream before the task finishes marks it failed.
    pub fn stream(
        &self,
        task: Task,
        target: ProducerTarget,
        input: ProducerInput,
    ) -> BoxStream<'static, StreamEvent> {
        let store = self.store.clone();
        let producer = self.producer.clone();
        let config = self.config.clone();
        let deadline = self.producer_timeout;
        let mut guard = AbandonGuard::new(store.clone(), task.id.clone());

        Box::pin(stream! {
            let task_id = task.id.clone();
            info!(task_id = %task_id, "stream opened");
            yield StreamEvent::Snapshot(task);

            pace(config.settle_delay).await;
            if let Some(last) = stopped(&store, &task_id) {
                guard.disarm();
                yield last;
                return;
            }

            let outcome =
                produce_reply(producer.as_ref(), deadline, &task_id, &target, &input).await;
            let reply = match outcome {
                Ok(reply) => reply,
                Err(error) => {
                    warn!(task_id = %task_id, error = %error, "response producer failed");
                    store.fail(&task_id);
                    guard.disarm();
                    yield StreamEvent::Failed { task_id, error };
                    return;
                }
            };

            let chunks = chunk_text(&reply, config.chunk_size);
            let count = chunks.len();
            debug!(task_id = %task_id, chunks = count, "streaming reply");

            for (index, chunk) in chunks.iter().enumerate() {
                if index > 0 {
                    pace(config.chunk_delay).await;
                }
                if let Some(last) = stopped(&store, &task_id) {
                    guard.disarm();
                    yield last;
                    return;
                }

                let is_first = index == 0;
                let appended = store.append_or_extend_agent_message(&task_id, chunk, is_first);
                let snapshot = match appended {
                    Some(_) if index + 1 == count => store.mark_complete(&task_id),
                    other => other,
                };
                let snapshot = match snapshot {
                    Some(snapshot) => snapshot,
                    None => {
                        guard.disarm();
                        yield StreamEvent::Failed {
                            error: A2AError::TaskNotFound { task_id: task_id.clone() },
                            task_id,
                        };
                        return;
                    }
                };

                // a cancel may land between the check above and the append
                let finished = snapshot.is_terminal();
                if finished {
                    guard.disarm();
                }
                yield StreamEvent::Snapshot(snapshot);
                if finished {
                    break;
                }
            }

            info!(task_id = %task_id, "stream closed");
        })
    }
}

/// Final snapshot if the task was finished by someone else
fn stopped(store: &TaskStore, task_id: &str) -> Option<StreamEvent> {
    match store.get(task_id) {
        Some(task) if task.is_terminal() => {
            info!(task_id = %task_id, state = ?task.state, "stream stopped early");
            Some(StreamEvent::Snapshot(task))
        }
        Some(_) => None,
        None => Some(StreamEvent::Failed {
            task_id: task_id.to_string(),
            error: A2AError::TaskNotFound {
                task_id: task_id.to_string(),
            },
        }),
    }
}

async fn pace(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

/// Fails the task if dropped while still armed
///
/// Held across the awaits of a request so a disconnected caller never leaves
/// its task `working`.
pub(crate) struct AbandonGuard {
    store: Arc<TaskStore>,
    task_id: String,
    armed: bool,
}

impl AbandonGuard {
    pub(crate) fn new(store: Arc<TaskStore>, task_id: String) -> Self {
        Self {
            store,
            task_id,
            armed: true,
        }
    }

    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Some(task) = self.store.fail(&self.task_id) {
            if task.state == TaskState::Failed {
                warn!(task_id = %self.task_id, "task abandoned before completion");
            }
        }
    }
}
