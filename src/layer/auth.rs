//! Authentication for A2A endpoints
//!
//! [`AuthLayer`] guards the task endpoints of the server: requests whose headers
//! fail the configured [`Authenticator`] are answered with a 401 JSON-RPC error
//! and never reach dispatch. [`AuthCredentials`] is the outbound side used by
//! the client.

use std::{
    convert::Infallible,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::{HeaderMap, Request},
    response::Response,
};
use base64::{engine::general_purpose, Engine as _};
use tower_layer::Layer;
use tower_service::Service;
use tracing::warn;

use crate::{config::DEFAULT_API_KEY_HEADER, protocol::error::A2AError, server::rpc_error};

/// Authentication credentials
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// Bearer token authentication
    Bearer(String),

    /// API key authentication
    ApiKey { key: String, header: String },

    /// Basic HTTP authentication
    Basic { username: String, password: String },
}

impl AuthCredentials {
    /// Create bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Create API key credentials
    pub fn api_key(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Create basic auth credentials
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Get the header name and value for this credential
    pub fn to_header(&self) -> (String, String) {
        match self {
            AuthCredentials::Bearer(token) => {
                ("Authorization".to_string(), format!("Bearer {}", token))
            }
            AuthCredentials::ApiKey { key, header } => (header.clone(), key.clone()),
            AuthCredentials::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password);
                let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
                ("Authorization".to_string(), format!("Basic {}", encoded))
            }
        }
    }
}

/// Decides whether a request may reach dispatch
pub trait Authenticator: Send + Sync {
    /// Check the request headers
    fn authenticate(&self, headers: &HeaderMap) -> Result<(), A2AError>;
}

/// Compares a header against a configured API key
///
/// Without a configured key every request is allowed.
#[derive(Debug, Clone)]
pub struct ApiKeyAuthenticator {
    key: Option<String>,
    header: String,
}

impl ApiKeyAuthenticator {
    /// Require `key` in `header`
    pub fn new(key: Option<String>, header: impl Into<String>) -> Self {
        Self {
            key,
            header: header.into(),
        }
    }

    /// Allow every request
    pub fn disabled() -> Self {
        Self::new(None, DEFAULT_API_KEY_HEADER)
    }
}

impl Authenticator for ApiKeyAuthenticator {
    fn authenticate(&self, headers: &HeaderMap) -> Result<(), A2AError> {
        let Some(expected) = &self.key else {
            return Ok(());
        };
        let presented = headers
            .get(self.header.as_str())
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(key) if key == expected => Ok(()),
            _ => Err(A2AError::Unauthorized),
        }
    }
}

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    authenticator: Arc<dyn Authenticator>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Create an API key authentication layer
    pub fn api_key(key: Option<String>, header: impl Into<String>) -> Self {
        Self::new(Arc::new(ApiKeyAuthenticator::new(key, header)))
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authenticator: self.authenticator.clone(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    authenticator: Arc<dyn Authenticator>,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if let Err(err) = self.authenticator.authenticate(req.headers()) {
            warn!(path = %req.uri().path(), "rejected unauthenticated request");
            return Box::pin(async move { Ok(rpc_error(None, &err)) });
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use tower::{service_fn, ServiceExt};

    use super::*;

    #[test]
    fn test_bearer_credentials() {
        let creds = AuthCredentials::bearer("test-token");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer test-token");
    }

    #[test]
    fn test_api_key_credentials() {
        let creds = AuthCredentials::api_key("secret-key", "X-API-Key");
        let (header, value) = creds.to_header();

        assert_eq!(header, "X-API-Key");
        assert_eq!(value, "secret-key");
    }

    #[test]
    fn test_basic_credentials() {
        let creds = AuthCredentials::basic("user", "pass");
        let (header, value) = creds.to_header();

        assert_eq!(header, "Authorization");
        assert_eq!(value, "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_api_key_authenticator() {
        let auth = ApiKeyAuthenticator::new(Some("secret".into()), "x-api-key");
        let mut headers = HeaderMap::new();
        assert!(matches!(
            auth.authenticate(&headers),
            Err(A2AError::Unauthorized)
        ));

        headers.insert("x-api-key", "wrong".parse().unwrap());
        assert!(auth.authenticate(&headers).is_err());

        headers.insert("x-api-key", "secret".parse().unwrap());
        assert!(auth.authenticate(&headers).is_ok());

        assert!(ApiKeyAuthenticator::disabled()
            .authenticate(&HeaderMap::new())
            .is_ok());
    }

    async fn call(key: Option<&str>, request: Request<Body>) -> Response {
        let inner = service_fn(|_req: Request<Body>| async {
            Ok::<_, Infallible>(Response::new(Body::empty()))
        });
        AuthLayer::api_key(key.map(str::to_string), "x-api-key")
            .layer(inner)
            .oneshot(request)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_layer_rejects_missing_key() {
        let response = call(Some("secret"), Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], -32010);
        assert!(json["id"].is_null());
    }

    #[tokio::test]
    async fn test_layer_passes_valid_key() {
        let request = Request::builder()
            .header("x-api-key", "secret")
            .body(Body::empty())
            .unwrap();
        let response = call(Some("secret"), request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = call(None, Request::new(Body::empty())).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
