//! JSON-RPC method dispatch
//!
//! [`A2AService`] is the Tower service behind both task endpoints. It resolves
//! the addressed agent, then runs the operation against the task store, the
//! response producer and the streaming transport.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
    time::Duration,
};

use tower_service::Service;
use tracing::{debug, info, warn};

use crate::{
    card,
    config::StreamingConfig,
    producer::{produce_reply, ProducerInput, ProducerTarget, ResponseProducer},
    protocol::{
        agent::AgentInfo,
        error::A2AError,
        operation::A2AOperation,
        task::{SendTaskParams, TaskState},
    },
    registry::AgentRegistry,
    service::{
        request::{A2ARequest, Scope},
        response::A2AResponse,
    },
    store::TaskStore,
    streaming::{AbandonGuard, TaskStreamer},
};

struct Inner {
    store: Arc<TaskStore>,
    registry: Arc<dyn AgentRegistry>,
    producer: Arc<dyn ResponseProducer>,
    streamer: TaskStreamer,
    producer_timeout: Option<Duration>,
}

/// Dispatches decoded A2A requests
///
/// Cheap to clone; clones share the same store and collaborators.
#[derive(Clone)]
pub struct A2AService {
    inner: Arc<Inner>,
}

impl A2AService {
    /// Create a dispatcher over `store`
    pub fn new(
        store: Arc<TaskStore>,
        registry: Arc<dyn AgentRegistry>,
        producer: Arc<dyn ResponseProducer>,
        streaming: StreamingConfig,
        producer_timeout: Option<Duration>,
    ) -> Self {
        let streamer = TaskStreamer::new(
            store.clone(),
            producer.clone(),
            streaming,
            producer_timeout,
        );
        Self {
            inner: Arc::new(Inner {
                store,
                registry,
                producer,
                streamer,
                producer_timeout,
            }),
        }
    }

    /// The task store this service writes to
    pub fn store(&self) -> &Arc<TaskStore> {
        &self.inner.store
    }

    /// Execute one request
    pub async fn handle(&self, request: A2ARequest) -> Result<A2AResponse, A2AError> {
        let target = self.resolve(&request.context.scope)?;
        debug!(
            method = request.operation.method(),
            agent_id = request.context.scope.agent_id(),
            "dispatching request"
        );

        match request.operation {
            A2AOperation::Send(params) => self.send(target, params).await,
            A2AOperation::SendSubscribe(params) => self.send_subscribe(target, params),
            A2AOperation::GetTask(params) => self
                .inner
                .store
                .get(&params.task_id)
                .map(|task| A2AResponse::Task(Box::new(task)))
                .ok_or(A2AError::TaskNotFound {
                    task_id: params.task_id,
                }),
            A2AOperation::CancelTask(params) => self
                .inner
                .store
                .cancel(&params.task_id)
                .map(|task| A2AResponse::Task(Box::new(task)))
                .ok_or(A2AError::TaskNotFound {
                    task_id: params.task_id,
                }),
            A2AOperation::ListTasks(params) => Ok(A2AResponse::TaskList(
                self.inner.store.list_summaries(&params),
            )),
            A2AOperation::Info => Ok(match target {
                ProducerTarget::Agent(agent) => {
                    A2AResponse::AgentInfo(Box::new(AgentInfo::from(&agent)))
                }
                ProducerTarget::Agency => A2AResponse::AgencyInfo(Box::new(card::agency_info(
                    self.inner.registry.list().len(),
                ))),
            }),
        }
    }

    fn resolve(&self, scope: &Scope) -> Result<ProducerTarget, A2AError> {
        match scope {
            Scope::Agency => Ok(ProducerTarget::Agency),
            Scope::Agent(agent_id) => self
                .inner
                .registry
                .get(agent_id)
                .map(ProducerTarget::Agent)
                .ok_or_else(|| A2AError::AgentNotFound {
                    agent_id: agent_id.clone(),
                }),
        }
    }

    async fn send(
        &self,
        target: ProducerTarget,
        params: SendTaskParams,
    ) -> Result<A2AResponse, A2AError> {
        let input = ProducerInput::from(&params.message);
        let task = self
            .inner
            .store
            .create(params.task_id, params.message, TaskState::Working)?;
        info!(task_id = %task.id, "task created");
        let mut guard = AbandonGuard::new(self.inner.store.clone(), task.id.clone());

        let reply = produce_reply(
            self.inner.producer.as_ref(),
            self.inner.producer_timeout,
            &task.id,
            &target,
            &input,
        )
        .await;
        guard.disarm();

        match reply {
            Ok(reply) => {
                let task = self
                    .inner
                    .store
                    .complete_with_response(&task.id, &reply)
                    .ok_or(A2AError::TaskNotFound { task_id: task.id })?;
                info!(task_id = %task.id, state = ?task.state, "task finished");
                Ok(A2AResponse::Task(Box::new(task)))
            }
            Err(error) => {
                warn!(task_id = %task.id, error = %error, "response producer failed");
                self.inner.store.fail(&task.id);
                Err(error)
            }
        }
    }

    fn send_subscribe(
        &self,
        target: ProducerTarget,
        params: SendTaskParams,
    ) -> Result<A2AResponse, A2AError> {
        let input = ProducerInput::from(&params.message);
        let task = self
            .inner
            .store
            .create(params.task_id, params.message, TaskState::Working)?;
        info!(task_id = %task.id, "task created for streaming");

        Ok(A2AResponse::Stream(
            self.inner.streamer.stream(task, target, input),
        ))
    }
}

impl Service<A2ARequest> for A2AService {
    type Response = A2AResponse;
    type Error = A2AError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: A2ARequest) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { service.handle(req).await })
    }
}
