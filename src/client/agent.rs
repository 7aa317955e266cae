//! HTTP client for agency servers

use futures::stream::{BoxStream, StreamExt};
use reqwest::{header, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::{
    client::config::ClientConfig,
    codec::{JsonRpcCodec, RequestId, SseCodec},
    protocol::{
        agent::{AgencyInfo, AgentCard, AgentInfo},
        error::A2AError,
        message::Message,
        operation::A2AOperation,
        task::{ListTasksParams, SendTaskParams, Task, TaskIdParams, TaskListResponse},
    },
    service::Scope,
};

/// Client for the JSON-RPC and discovery endpoints of an agency server
///
/// A client talks to one endpoint: the agency itself, or a single agent
/// (see [`A2AClient::for_agent`]).
///
/// # Example
///
/// ```rust,no_run
/// use a2a_agency::prelude::*;
///
/// # async fn example() -> Result<(), A2AError> {
/// let config = ClientConfig::new("http://localhost:8000".parse().unwrap());
/// let client = A2AClient::new(config)?.for_agent("research-bot");
///
/// let task = client.send_message(Message::user("Hello, agent!"), None).await?;
/// println!("Task {} is {:?}", task.id, task.state);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct A2AClient {
    http: reqwest::Client,
    config: ClientConfig,
    scope: Scope,
    codec: JsonRpcCodec,
}

impl A2AClient {
    /// Create a client targeting the agency endpoint
    pub fn new(config: ClientConfig) -> Result<Self, A2AError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(config, http))
    }

    /// Create a client over an existing reqwest client
    pub fn with_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config,
            scope: Scope::Agency,
            codec: JsonRpcCodec::new(),
        }
    }

    /// The same client, targeting one registered agent
    pub fn for_agent(&self, agent_id: impl Into<String>) -> Self {
        Self {
            scope: Scope::Agent(agent_id.into()),
            ..self.clone()
        }
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch the discovery card of the targeted endpoint
    pub async fn get_agent_card(&self) -> Result<AgentCard, A2AError> {
        let path = match &self.scope {
            Scope::Agency => "/.well-known/agent.json".to_string(),
            Scope::Agent(id) => format!("/agents/{}/.well-known/agent.json", id),
        };
        let response = self
            .authorize(self.http.get(self.config.url(&path)))
            .timeout(self.config.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => match &self.scope {
                Scope::Agent(id) => Err(A2AError::AgentNotFound {
                    agent_id: id.clone(),
                }),
                Scope::Agency => Err(A2AError::Transport("Agency card not found".into())),
            },
            status if !status.is_success() => Err(A2AError::Transport(format!(
                "Card request failed with status {}",
                status
            ))),
            _ => Ok(response.json().await?),
        }
    }

    /// Send a message and wait for the completed task
    pub async fn send_message(
        &self,
        message: Message,
        task_id: Option<String>,
    ) -> Result<Task, A2AError> {
        self.call(A2AOperation::Send(SendTaskParams { task_id, message }))
            .await
    }

    /// Send a message and follow the task as it is produced
    ///
    /// Yields every snapshot the server emits, ending with a terminal one.
    pub async fn send_message_streaming(
        &self,
        message: Message,
        task_id: Option<String>,
    ) -> Result<BoxStream<'static, Result<Task, A2AError>>, A2AError> {
        let operation = A2AOperation::SendSubscribe(SendTaskParams { task_id, message });
        let body = self.codec.encode_request(RequestId::generate(), &operation)?;

        let response = self
            .authorize(self.http.post(self.config.url(&self.rpc_path())))
            .header(header::CONTENT_TYPE, self.codec.content_type())
            .header(header::ACCEPT, "text/event-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(self.rejection(status, &body));
        }

        Ok(SseCodec::new()
            .parse_stream(response.bytes_stream())
            .boxed())
    }

    /// Fetch a task with its full history
    pub async fn get_task(&self, task_id: impl Into<String>) -> Result<Task, A2AError> {
        self.call(A2AOperation::GetTask(TaskIdParams {
            task_id: task_id.into(),
        }))
        .await
    }

    /// Cancel a task
    pub async fn cancel_task(&self, task_id: impl Into<String>) -> Result<Task, A2AError> {
        self.call(A2AOperation::CancelTask(TaskIdParams {
            task_id: task_id.into(),
        }))
        .await
    }

    /// List task summaries
    pub async fn list_tasks(&self, params: ListTasksParams) -> Result<TaskListResponse, A2AError> {
        self.call(A2AOperation::ListTasks(params)).await
    }

    /// `agent/info` on an agent endpoint
    pub async fn agent_info(&self) -> Result<AgentInfo, A2AError> {
        self.call(A2AOperation::Info).await
    }

    /// `agent/info` on the agency endpoint
    pub async fn agency_info(&self) -> Result<AgencyInfo, A2AError> {
        self.call(A2AOperation::Info).await
    }

    async fn call<T: DeserializeOwned>(&self, operation: A2AOperation) -> Result<T, A2AError> {
        let id = RequestId::generate();
        debug!(method = operation.method(), "sending request");
        let body = self.codec.encode_request(id, &operation)?;

        let response = self
            .authorize(self.http.post(self.config.url(&self.rpc_path())))
            .header(header::CONTENT_TYPE, self.codec.content_type())
            .timeout(self.config.timeout)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(self.rejection(status, &body));
        }

        let result: Value = self.codec.decode_response(&body)?;
        Ok(serde_json::from_value(result)?)
    }

    /// Error carried by a non-2xx response
    fn rejection(&self, status: StatusCode, body: &[u8]) -> A2AError {
        match self.codec.decode_response(body) {
            Err(A2AError::Transport(_)) | Ok(_) => A2AError::Transport(format!(
                "HTTP request failed with status {}",
                status
            )),
            Err(err) => err,
        }
    }

    fn rpc_path(&self) -> String {
        match &self.scope {
            Scope::Agency => "/agency".to_string(),
            Scope::Agent(id) => format!("/agents/{}", id),
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Some(auth) => {
                let (name, value) = auth.to_header();
                builder.header(name, value)
            }
            None => builder,
        }
    }
}
