//! Concurrent task storage
//!
//! The store owns every lifecycle mutation of a [`Task`]. Each task sits behind
//! its own mutex, so mutations to one task id are serialized while different
//! tasks progress in parallel. No lock is ever held across an `.await`.

mod retention;

use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub use retention::spawn_retention_sweeper;

use crate::protocol::{
    error::A2AError,
    message::Message,
    task::{ListTasksParams, Task, TaskListResponse, TaskState},
};

/// In-memory task store shared by every handler
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: RwLock<HashMap<String, Arc<Mutex<Task>>>>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a task from its initiating message
    ///
    /// Generates a time-ordered id when `task_id` is `None`. A client-supplied id
    /// that already exists is rejected and the existing task is left untouched.
    pub fn create(
        &self,
        task_id: Option<String>,
        message: Message,
        state: TaskState,
    ) -> Result<Task, A2AError> {
        let id = task_id.unwrap_or_else(|| Uuid::now_v7().to_string());
        let task = Task::new(id.clone(), message, state);

        let mut tasks = self.tasks.write();
        if tasks.contains_key(&id) {
            return Err(A2AError::InvalidParams(format!(
                "Task with ID {} already exists",
                id
            )));
        }
        tasks.insert(id.clone(), Arc::new(Mutex::new(task.clone())));
        drop(tasks);

        debug!(task_id = %id, state = ?state, "task created");
        Ok(task)
    }

    /// Snapshot of a task
    pub fn get(&self, id: &str) -> Option<Task> {
        self.with_task(id, |task| task.clone())
    }

    /// Cancel a task
    ///
    /// A task already in a terminal state is returned unchanged.
    pub fn cancel(&self, id: &str) -> Option<Task> {
        self.with_task(id, |task| {
            if task.transition(TaskState::Canceled) {
                info!(task_id = %id, "task canceled");
            }
            task.clone()
        })
    }

    /// Mark a task failed unless it already finished
    pub fn fail(&self, id: &str) -> Option<Task> {
        self.with_task(id, |task| {
            if task.transition(TaskState::Failed) {
                info!(task_id = %id, "task failed");
            }
            task.clone()
        })
    }

    /// Transition a non-terminal task to `completed`; idempotent
    pub fn mark_complete(&self, id: &str) -> Option<Task> {
        self.with_task(id, |task| {
            if task.transition(TaskState::Completed) {
                debug!(task_id = %id, "task completed");
            }
            task.clone()
        })
    }

    /// Append a new agent message (`is_first`) or extend the last one by `chunk`
    ///
    /// Terminal tasks are never mutated; the current snapshot is returned instead.
    pub fn append_or_extend_agent_message(
        &self,
        id: &str,
        chunk: &str,
        is_first: bool,
    ) -> Option<Task> {
        self.with_task(id, |task| {
            if !task.is_terminal() {
                if is_first {
                    task.push_agent_message(chunk);
                } else {
                    task.extend_agent_message(chunk);
                }
            }
            task.clone()
        })
    }

    /// Append the full reply and complete the task in one step
    ///
    /// A task canceled while its reply was being produced stays canceled.
    pub fn complete_with_response(&self, id: &str, text: &str) -> Option<Task> {
        self.with_task(id, |task| {
            if !task.is_terminal() {
                task.push_agent_message(text);
                task.transition(TaskState::Completed);
                debug!(task_id = %id, "task completed");
            }
            task.clone()
        })
    }

    /// Summaries of stored tasks, oldest first
    pub fn list_summaries(&self, params: &ListTasksParams) -> TaskListResponse {
        let handles: Vec<Arc<Mutex<Task>>> = self.tasks.read().values().cloned().collect();

        let mut summaries: Vec<_> = handles
            .iter()
            .map(|handle| handle.lock().summary())
            .filter(|summary| params.state.map_or(true, |state| summary.state == state))
            .collect();
        summaries.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        let total = summaries.len();
        if let Some(limit) = params.limit {
            summaries.truncate(limit);
        }

        TaskListResponse {
            tasks: summaries,
            total,
        }
    }

    /// Drop terminal tasks whose last update is older than `ttl`
    ///
    /// Returns the number of tasks removed.
    pub fn purge_terminal_older_than(&self, ttl: Duration) -> usize {
        let Ok(ttl) = chrono::Duration::from_std(ttl) else {
            return 0;
        };
        let Some(cutoff) = Utc::now().checked_sub_signed(ttl) else {
            return 0;
        };

        let mut tasks = self.tasks.write();
        let before = tasks.len();
        tasks.retain(|_, handle| {
            let task = handle.lock();
            !(task.is_terminal() && task.updated_at < cutoff)
        });
        before - tasks.len()
    }

    /// Number of stored tasks
    pub fn len(&self) -> usize {
        self.tasks.read().len()
    }

    /// Whether the store holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.read().is_empty()
    }

    fn with_task<R>(&self, id: &str, f: impl FnOnce(&mut Task) -> R) -> Option<R> {
        let handle = self.tasks.read().get(id).cloned()?;
        let mut task = handle.lock();
        Some(f(&mut task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::Role;

    fn store_with_task(id: &str) -> TaskStore {
        let store = TaskStore::new();
        store
            .create(Some(id.into()), Message::user("hello"), TaskState::Working)
            .unwrap();
        store
    }

    #[test]
    fn test_create_generates_id() {
        let store = TaskStore::new();
        let a = store
            .create(None, Message::user("a"), TaskState::Submitted)
            .unwrap();
        let b = store
            .create(None, Message::user("b"), TaskState::Submitted)
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(a.state, TaskState::Submitted);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = store_with_task("t-1");
        store.mark_complete("t-1");

        let err = store
            .create(Some("t-1".into()), Message::user("again"), TaskState::Working)
            .unwrap_err();
        assert!(matches!(err, A2AError::InvalidParams(_)));

        let task = store.get("t-1").unwrap();
        assert_eq!(task.state, TaskState::Completed);
        assert_eq!(task.messages[0].text(), "hello");
    }

    #[test]
    fn test_unknown_id_is_absent() {
        let store = TaskStore::new();
        assert!(store.get("missing").is_none());
        assert!(store.cancel("missing").is_none());
        assert!(store.mark_complete("missing").is_none());
        assert!(store
            .append_or_extend_agent_message("missing", "x", true)
            .is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_then_extend() {
        let store = store_with_task("t");

        store.append_or_extend_agent_message("t", "Hello", true);
        let task = store
            .append_or_extend_agent_message("t", " world", false)
            .unwrap();

        assert_eq!(task.messages.len(), 2);
        assert_eq!(task.messages[1].role, Role::Agent);
        assert_eq!(task.messages[1].parts.len(), 1);
        assert_eq!(task.messages[1].text(), "Hello world");
    }

    #[test]
    fn test_cancel_completed_is_noop() {
        let store = store_with_task("t");
        store.complete_with_response("t", "done");

        let task = store.cancel("t").unwrap();
        assert_eq!(task.state, TaskState::Completed);
    }

    #[test]
    fn test_cancel_submitted() {
        let store = TaskStore::new();
        store
            .create(Some("t".into()), Message::user("x"), TaskState::Submitted)
            .unwrap();

        assert_eq!(store.cancel("t").unwrap().state, TaskState::Canceled);
    }

    #[test]
    fn test_canceled_task_not_extended() {
        let store = store_with_task("t");
        store.append_or_extend_agent_message("t", "partial", true);
        store.cancel("t");

        let task = store
            .append_or_extend_agent_message("t", " more", false)
            .unwrap();
        assert_eq!(task.messages[1].text(), "partial");

        let task = store.complete_with_response("t", "late").unwrap();
        assert_eq!(task.state, TaskState::Canceled);
        assert_eq!(task.messages.len(), 2);
    }

    #[test]
    fn test_mark_complete_idempotent() {
        let store = store_with_task("t");
        let first = store.mark_complete("t").unwrap();
        let second = store.mark_complete("t").unwrap();

        assert_eq!(first.state, TaskState::Completed);
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[test]
    fn test_list_summaries() {
        let store = TaskStore::new();
        for i in 0..3 {
            store
                .create(Some(format!("t-{i}")), Message::user("x"), TaskState::Working)
                .unwrap();
        }
        store.cancel("t-1");

        let all = store.list_summaries(&ListTasksParams::default());
        assert_eq!(all.total, 3);
        assert_eq!(all.tasks.len(), 3);

        let canceled = store.list_summaries(&ListTasksParams {
            state: Some(TaskState::Canceled),
            limit: None,
        });
        assert_eq!(canceled.total, 1);
        assert_eq!(canceled.tasks[0].id, "t-1");

        let limited = store.list_summaries(&ListTasksParams {
            state: None,
            limit: Some(2),
        });
        assert_eq!(limited.total, 3);
        assert_eq!(limited.tasks.len(), 2);
    }

    #[test]
    fn test_purge_terminal_only() {
        let store = store_with_task("open");
        store
            .create(Some("done".into()), Message::user("x"), TaskState::Working)
            .unwrap();
        store.mark_complete("done");

        assert_eq!(store.purge_terminal_older_than(Duration::from_secs(3600)), 0);
        assert_eq!(store.purge_terminal_older_than(Duration::ZERO), 1);
        assert!(store.get("done").is_none());
        assert!(store.get("open").is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_extends_serialize() {
        let store = Arc::new(store_with_task("t"));
        store.append_or_extend_agent_message("t", "", true);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..50 {
                        store.append_or_extend_agent_message("t", "a", false);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        let task = store.get("t").unwrap();
        assert_eq!(task.messages.len(), 2);
        assert_eq!(task.messages[1].text().len(), 16 * 50);
    }
}
