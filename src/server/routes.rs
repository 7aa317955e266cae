use std::convert::Infallible;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{BoxStream, StreamExt};
use serde_json::json;
use tower::ServiceExt;
use tracing::{debug, error};

use super::{rpc_error, AppState};
use crate::{
    codec::{
        jsonrpc::{JsonRpcCodec, JsonRpcResponse, RequestId},
        sse::SseCodec,
    },
    service::{A2ARequest, A2AResponse, RequestContext, Scope},
    streaming::StreamEvent,
};

pub(super) async fn agency_card(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let base_url = base_url(&state, &headers);
    Json(state.cards.agency(&base_url)).into_response()
}

pub(super) async fn agent_card(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(agent) = state.registry.get(&agent_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Agent with ID {} not found", agent_id) })),
        )
            .into_response();
    };
    let base_url = base_url(&state, &headers);
    Json(state.cards.agent(&agent, &base_url)).into_response()
}

pub(super) async fn agency_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    dispatch(state, Scope::Agency, body).await
}

pub(super) async fn agent_rpc(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    body: Bytes,
) -> Response {
    dispatch(state, Scope::Agent(agent_id), body).await
}

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn dispatch(state: AppState, scope: Scope, body: Bytes) -> Response {
    let (id, operation) = match JsonRpcCodec::new().decode_request(&body) {
        Ok(decoded) => decoded,
        Err(rejected) => return rpc_error(rejected.id, &rejected.error),
    };
    debug!(method = operation.method(), agent_id = scope.agent_id(), "received request");

    let context = RequestContext {
        id: id.clone(),
        scope,
    };
    let response = match state.service.oneshot(A2ARequest::new(operation, context)).await {
        Ok(response) => response,
        Err(err) => return rpc_error(Some(id), &err),
    };

    match response {
        A2AResponse::Stream(stream) => sse_response(id, stream),
        response => match response.to_result() {
            Ok(result) => Json(JsonRpcResponse::success(Some(id), result)).into_response(),
            Err(err) => rpc_error(Some(id), &err),
        },
    }
}

fn sse_response(id: RequestId, stream: BoxStream<'static, StreamEvent>) -> Response {
    let codec = SseCodec::new();
    let events = stream.map(move |event| {
        let encoded = match &event {
            StreamEvent::Snapshot(task) => codec.encode_snapshot(&id, task),
            StreamEvent::Failed { error, .. } => codec.encode_error(&id, error),
        };
        Ok::<_, Infallible>(encoded.unwrap_or_else(|err| {
            error!(error = %err, "failed to encode stream event");
            Event::default().comment("encoding failed")
        }))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(url) = &state.public_url {
        return url.clone();
    }
    headers
        .get(header::HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{host}"))
        .unwrap_or_else(|| state.fallback_base_url.clone())
}
