//! Validation layer for A2A protocol requests and responses

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    protocol::{
        error::A2AError,
        message::{Part, Role},
        operation::A2AOperation,
        task::{SendTaskParams, TaskState},
    },
    service::{A2ARequest, A2AResponse},
};

/// Upper bound accepted for `tasks/list` limits
pub const MAX_LIST_LIMIT: usize = 1000;

/// Layer that validates A2A protocol requests and responses
#[derive(Clone, Debug, Default)]
pub struct A2AValidationLayer;

impl A2AValidationLayer {
    /// Create a new validation layer
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for A2AValidationLayer {
    type Service = A2AValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        A2AValidationService { inner }
    }
}

/// Validation service that wraps an inner service
#[derive(Clone)]
pub struct A2AValidationService<S> {
    inner: S,
}

impl<S> A2AValidationService<S> {
    /// Validate an A2A request
    fn validate_request(req: &A2ARequest) -> Result<(), A2AError> {
        match &req.operation {
            A2AOperation::Send(params) | A2AOperation::SendSubscribe(params) => {
                Self::validate_send(params)
            }
            A2AOperation::GetTask(params) | A2AOperation::CancelTask(params) => {
                if params.task_id.is_empty() {
                    return Err(invalid("Task ID cannot be empty"));
                }
                Ok(())
            }
            A2AOperation::ListTasks(params) => match params.limit {
                Some(0) => Err(invalid("Limit must be greater than 0")),
                Some(limit) if limit > MAX_LIST_LIMIT => Err(invalid("Limit cannot exceed 1000")),
                _ => Ok(()),
            },
            A2AOperation::Info => Ok(()),
        }
    }

    fn validate_send(params: &SendTaskParams) -> Result<(), A2AError> {
        if params.task_id.as_deref() == Some("") {
            return Err(invalid("Task ID cannot be empty"));
        }

        let message = &params.message;
        if message.role != Role::User {
            return Err(invalid("Message role must be 'user'"));
        }
        if message.parts.is_empty() {
            return Err(invalid("Message must have at least one part"));
        }

        for part in &message.parts {
            match part {
                Part::Text { text } if text.is_empty() => {
                    return Err(invalid("Text part cannot be empty"));
                }
                Part::File { file } if file.file_name.is_empty() => {
                    return Err(invalid("File name cannot be empty"));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate an A2A response
    fn validate_response(resp: &A2AResponse) -> Result<(), A2AError> {
        if let A2AResponse::Task(task) = resp {
            if task.messages.is_empty() {
                return Err(A2AError::Internal(format!(
                    "Task {} has no messages",
                    task.id
                )));
            }

            let ends_with_agent = task
                .messages
                .last()
                .is_some_and(|message| message.role == Role::Agent);
            if task.state == TaskState::Completed && !ends_with_agent {
                return Err(A2AError::Internal(format!(
                    "Completed task {} has no agent reply",
                    task.id
                )));
            }
        }

        Ok(())
    }
}

fn invalid(message: &str) -> A2AError {
    A2AError::InvalidParams(message.to_string())
}

impl<S> Service<A2ARequest> for A2AValidationService<S>
where
    S: Service<A2ARequest, Response = A2AResponse, Error = A2AError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        // Validate request before passing to inner service
        if let Err(e) = Self::validate_request(&req) {
            return Box::pin(async move { Err(e) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let response = inner.call(req).await?;
            Self::validate_response(&response)?;
            Ok(response)
        })
    }
}
