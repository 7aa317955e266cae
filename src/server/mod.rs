//! HTTP server exposing the agency and its agents
//!
//! Routes:
//! - `GET  /.well-known/agent.json` agency discovery card
//! - `GET  /agents/{agent_id}/.well-known/agent.json` agent discovery card
//! - `POST /agency` JSON-RPC on the agency
//! - `POST /agents/{agent_id}` JSON-RPC on one agent
//! - `GET  /health`
//!
//! Only the JSON-RPC routes sit behind [`AuthLayer`].

mod routes;

use std::{future::Future, sync::Arc};

use axum::{
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tower_layer::Layer;
use tracing::{error, info, warn};

use crate::{
    card::CardBuilder,
    codec::jsonrpc::{JsonRpcResponse, RequestId},
    config::AgencyConfig,
    layer::{A2AValidationLayer, A2AValidationService, AuthLayer},
    producer::ResponseProducer,
    protocol::error::A2AError,
    registry::AgentRegistry,
    service::A2AService,
    store::{spawn_retention_sweeper, TaskStore},
};

/// Shared state of every handler
#[derive(Clone)]
pub(crate) struct AppState {
    service: A2AValidationService<A2AService>,
    registry: Arc<dyn AgentRegistry>,
    cards: CardBuilder,
    public_url: Option<String>,
    fallback_base_url: String,
}

/// The agency HTTP server
pub struct AgencyServer {
    config: AgencyConfig,
    store: Arc<TaskStore>,
    router: Router,
}

impl AgencyServer {
    /// Wire a server from its collaborators
    pub fn new(
        config: AgencyConfig,
        registry: Arc<dyn AgentRegistry>,
        producer: Arc<dyn ResponseProducer>,
    ) -> Self {
        let store = Arc::new(TaskStore::new());
        let service = A2AService::new(
            store.clone(),
            registry.clone(),
            producer,
            config.streaming.clone(),
            config.producer_timeout,
        );
        let router = build_router(service, registry, &config);

        Self {
            config,
            store,
            router,
        }
    }

    /// The axum router, for serving or for driving in tests
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The task store behind this server
    pub fn store(&self) -> &Arc<TaskStore> {
        &self.store
    }

    /// Server configuration
    pub fn config(&self) -> &AgencyConfig {
        &self.config
    }

    /// Bind the configured address
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config.bind_address()).await
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.config.api_key.is_none() {
            warn!("no API key configured, authentication is disabled");
        }

        let sweeper = self.config.task_ttl.map(|ttl| {
            info!(ttl_secs = ttl.as_secs(), "task retention enabled");
            spawn_retention_sweeper(self.store.clone(), ttl, self.config.sweep_interval)
        });

        info!(address = %listener.local_addr()?, "A2A server listening");
        let result = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        info!("A2A server stopped");
        result
    }
}

fn build_router(
    service: A2AService,
    registry: Arc<dyn AgentRegistry>,
    config: &AgencyConfig,
) -> Router {
    let state = AppState {
        service: A2AValidationLayer::new().layer(service),
        registry,
        cards: CardBuilder::new(&config.api_key_header),
        public_url: config
            .public_url
            .as_ref()
            .map(|url| url.as_str().trim_end_matches('/').to_string()),
        fallback_base_url: config.fallback_base_url(),
    };

    let rpc = Router::new()
        .route("/agency", post(routes::agency_rpc))
        .route("/agents/{agent_id}", post(routes::agent_rpc))
        .route_layer(AuthLayer::api_key(
            config.api_key.clone(),
            config.api_key_header.clone(),
        ));

    Router::new()
        .route("/.well-known/agent.json", get(routes::agency_card))
        .route(
            "/agents/{agent_id}/.well-known/agent.json",
            get(routes::agent_card),
        )
        .route("/health", get(routes::health))
        .merge(rpc)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// JSON-RPC error envelope with the matching HTTP status
pub(crate) fn rpc_error(id: Option<RequestId>, error: &A2AError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        error!(code = error.code(), error = %error, "request failed");
    } else {
        info!(code = error.code(), error = %error, "request rejected");
    }
    (status, Json(JsonRpcResponse::error(id, error))).into_response()
}
