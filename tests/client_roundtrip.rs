//! Client/server round trips over a loopback listener

use std::{net::SocketAddr, sync::Arc};

use a2a_agency::{
    client::{A2AClient, ClientConfig},
    config::{AgencyConfig, StreamingConfig},
    layer::AuthCredentials,
    producer::TemplateProducer,
    protocol::{
        agent::AgentDescriptor,
        error::A2AError,
        message::Message,
        task::{ListTasksParams, TaskState},
    },
    registry::{AgentRegistry, InMemoryRegistry},
    server::AgencyServer,
};
use futures::StreamExt;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tokio_test::{assert_err, assert_ok};

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    async fn start(api_key: Option<&str>) -> Self {
        let registry: Arc<dyn AgentRegistry> = Arc::new(InMemoryRegistry::with_agents([
            AgentDescriptor::new("abc", "Research Bot", "Finds papers").with_skills(["search"]),
        ]));
        let producer = Arc::new(TemplateProducer::new(registry.clone()));

        let mut config =
            AgencyConfig::default().with_streaming(StreamingConfig::immediate().with_chunk_size(8));
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }

        let server = AgencyServer::new(config, registry, producer);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(server.serve_with_shutdown(listener, async {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            handle,
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.addr).parse().unwrap())
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        assert_ok!(self.handle.await.unwrap());
    }
}

#[tokio::test]
async fn test_send_get_list_cancel() {
    let server = TestServer::start(None).await;
    let client = A2AClient::new(server.config()).unwrap().for_agent("abc");

    let task = assert_ok!(client.send_message(Message::user("hello"), None).await);
    assert_eq!(task.state, TaskState::Completed);
    assert_eq!(task.messages.len(), 2);
    assert!(task.last_agent_text().unwrap().starts_with("I'm Research Bot"));

    let fetched = assert_ok!(client.get_task(task.id.clone()).await);
    assert_eq!(fetched, task);

    let canceled = assert_ok!(client.cancel_task(task.id.clone()).await);
    assert_eq!(canceled.state, TaskState::Completed);

    let listing = assert_ok!(client.list_tasks(ListTasksParams::default()).await);
    assert_eq!(listing.total, 1);
    assert_eq!(listing.tasks[0].id, task.id);

    server.stop().await;
}

#[tokio::test]
async fn test_errors_map_back() {
    let server = TestServer::start(None).await;
    let client = A2AClient::new(server.config()).unwrap();

    let err = assert_err!(client.get_task("missing").await);
    assert!(matches!(err, A2AError::TaskNotFound { task_id } if task_id == "missing"));

    let err = assert_err!(client.for_agent("nope").agent_info().await);
    assert!(matches!(err, A2AError::AgentNotFound { agent_id } if agent_id == "nope"));

    let err = assert_err!(client.for_agent("nope").get_agent_card().await);
    assert!(matches!(err, A2AError::AgentNotFound { .. }));

    server.stop().await;
}

#[tokio::test]
async fn test_cards_and_info() {
    let server = TestServer::start(None).await;
    let client = A2AClient::new(server.config()).unwrap();

    let card = assert_ok!(client.get_agent_card().await);
    assert_eq!(card.info.id, "ai-agency");
    assert_eq!(card.servers[0].url, format!("http://{}/agency", server.addr));

    let card = assert_ok!(client.for_agent("abc").get_agent_card().await);
    assert_eq!(card.skills[0].name, "search");

    let info = assert_ok!(client.agency_info().await);
    assert_eq!(info.agent_count, 1);

    let info = assert_ok!(client.for_agent("abc").agent_info().await);
    assert_eq!(info.name, "Research Bot");

    server.stop().await;
}

#[tokio::test]
async fn test_streaming_matches_send() {
    let server = TestServer::start(None).await;
    let client = A2AClient::new(server.config()).unwrap().for_agent("abc");

    let stream = assert_ok!(
        client
            .send_message_streaming(Message::user("what can you do"), None)
            .await
    );
    let snapshots: Vec<_> = stream.collect().await;
    assert!(snapshots.len() > 2);

    let first = snapshots.first().unwrap().as_ref().unwrap();
    assert_eq!(first.state, TaskState::Working);

    let last = snapshots.last().unwrap().as_ref().unwrap();
    assert_eq!(last.state, TaskState::Completed);

    let sent = assert_ok!(client.send_message(Message::user("what can you do"), None).await);
    assert_eq!(last.last_agent_text(), sent.last_agent_text());

    server.stop().await;
}

#[tokio::test]
async fn test_api_key_round_trip() {
    let server = TestServer::start(Some("secret")).await;

    let anonymous = A2AClient::new(server.config()).unwrap();
    let err = assert_err!(anonymous.agency_info().await);
    assert!(matches!(err, A2AError::Unauthorized));

    let config = server
        .config()
        .with_auth(AuthCredentials::api_key("secret", "x-api-key"));
    let client = A2AClient::new(config).unwrap();
    assert_ok!(client.agency_info().await);

    server.stop().await;
}
