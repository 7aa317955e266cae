//! A2A task types and lifecycle management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::{Message, Part, Role};

/// A task in the A2A protocol
///
/// Tasks are one unit of conversational exchange with an agent. The first message
/// is always the one that created the task; once completed, the last message
/// is the agent's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,

    /// Current lifecycle state
    pub state: TaskState,

    /// Conversation so far, oldest first
    pub messages: Vec<Message>,

    /// Non-text outputs; empty in the base protocol
    #[serde(default)]
    pub artifacts: Vec<Value>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task state or messages last changed
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task in the given state from its initiating message
    pub fn new(id: impl Into<String>, input: Message, state: TaskState) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            state,
            messages: vec![input],
            artifacts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Move to `next` if the lifecycle allows it
    ///
    /// Returns `false` and leaves the task untouched otherwise.
    pub fn transition(&mut self, next: TaskState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        self.touch();
        true
    }

    /// Append a complete agent reply
    pub fn push_agent_message(&mut self, text: impl Into<String>) {
        self.messages.push(Message::agent(text));
        self.touch();
    }

    /// Extend the last text part of the last message
    ///
    /// Falls back to appending a fresh agent message when the last message is not
    /// an agent reply ending in a text part.
    pub fn extend_agent_message(&mut self, chunk: &str) {
        let extended = match self.messages.last_mut() {
            Some(last) if last.role == Role::Agent => match last.parts.last_mut() {
                Some(Part::Text { text }) => {
                    text.push_str(chunk);
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if !extended {
            self.messages.push(Message::agent(chunk));
        }
        self.touch();
    }

    /// The most recent agent text, if any
    pub fn last_agent_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Agent)
            .map(Message::text)
    }

    /// Summary without message bodies
    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id.clone(),
            state: self.state,
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Task state in the A2A protocol lifecycle
///
/// Lifecycle: submitted → working → completed/failed/canceled.
/// A task may be canceled or failed from any non-terminal state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task has been received but work has not started
    Submitted,

    /// Task is currently being processed
    Working,

    /// Task completed successfully
    Completed,

    /// Task was canceled by the client
    Canceled,

    /// Task failed with an error
    Failed,
}

impl TaskState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Completed | TaskState::Canceled | TaskState::Failed
        )
    }

    /// Whether the lifecycle permits moving from `self` to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        match (self, next) {
            (TaskState::Submitted, TaskState::Working) => true,
            (TaskState::Submitted | TaskState::Working, TaskState::Completed) => true,
            (TaskState::Submitted | TaskState::Working, TaskState::Canceled) => true,
            (TaskState::Submitted | TaskState::Working, TaskState::Failed) => true,
            _ => false,
        }
    }
}

/// Task listing entry; never carries message bodies
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSummary {
    pub id: String,
    pub state: TaskState,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Params of `tasks/send` and `tasks/sendSubscribe`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendTaskParams {
    /// Client-supplied task id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    /// The initiating message
    pub message: Message,
}

/// Params of `tasks/get` and `tasks/cancel`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskIdParams {
    pub task_id: String,
}

/// Params of `tasks/list`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListTasksParams {
    /// Only return tasks in this state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,

    /// Maximum number of summaries to return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Result of `tasks/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskListResponse {
    /// Summaries, oldest task first
    pub tasks: Vec<TaskSummary>,

    /// Number of tasks matching the filter before `limit` was applied
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let task = Task::new("task-123", Message::user("Test"), TaskState::Working);

        assert_eq!(task.id, "task-123");
        assert_eq!(task.state, TaskState::Working);
        assert_eq!(task.messages.len(), 1);
        assert!(task.artifacts.is_empty());
        assert!(!task.is_terminal());
    }

    #[test]
    fn test_task_lifecycle() {
        let mut task = Task::new("task-123", Message::user("Test"), TaskState::Submitted);

        assert!(task.transition(TaskState::Working));
        assert!(task.transition(TaskState::Completed));
        assert!(task.is_terminal());

        assert!(!task.transition(TaskState::Canceled));
        assert!(!task.transition(TaskState::Working));
        assert_eq!(task.state, TaskState::Completed);
    }

    #[test]
    fn test_task_state_transitions() {
        assert!(TaskState::Submitted.can_transition_to(TaskState::Canceled));
        assert!(TaskState::Working.can_transition_to(TaskState::Canceled));
        assert!(!TaskState::Canceled.can_transition_to(TaskState::Completed));
        assert!(!TaskState::Failed.can_transition_to(TaskState::Working));
        assert!(!TaskState::Working.can_transition_to(TaskState::Submitted));
    }

    #[test]
    fn test_extend_agent_message() {
        let mut task = Task::new("t", Message::user("hi"), TaskState::Working);

        task.extend_agent_message("Hello");
        assert_eq!(task.messages.len(), 2);

        task.extend_agent_message(" there");
        assert_eq!(task.messages.len(), 2);
        assert_eq!(task.last_agent_text().as_deref(), Some("Hello there"));
    }

    #[test]
    fn test_summary_omits_messages() {
        let task = Task::new("t", Message::user("secret"), TaskState::Working);
        let json = serde_json::to_value(task.summary()).unwrap();

        assert_eq!(json["message_count"], 1);
        assert!(json.get("messages").is_none());
    }

    #[test]
    fn test_task_serialization() {
        let task = Task::new("task-123", Message::user("Test"), TaskState::Working);

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"id\":\"task-123\""));
        assert!(json.contains("\"state\":\"working\""));

        let deserialized: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(task, deserialized);
    }
}
