//! Client configuration

use std::time::Duration;

use url::Url;

use crate::layer::AuthCredentials;

/// Configuration for an A2A client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the agency server
    pub base_url: Url,

    /// Timeout applied to non-streaming requests
    pub timeout: Duration,

    /// Credentials attached to every request
    pub auth: Option<AuthCredentials>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            auth: None,
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach credentials
    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Absolute URL of `path` on the server
    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
