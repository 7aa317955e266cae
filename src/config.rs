//! Server configuration

use std::{net::SocketAddr, path::PathBuf, time::Duration};

use url::Url;

/// Default header carrying the API key
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Configuration for the agency server
#[derive(Debug, Clone)]
pub struct AgencyConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Expected API key; authentication is disabled when `None`
    pub api_key: Option<String>,

    /// Header the API key is read from
    pub api_key_header: String,

    /// Externally visible base URL advertised in discovery cards
    pub public_url: Option<Url>,

    /// Registry file to load agents from
    pub registry_path: Option<PathBuf>,

    /// Allowed CORS origins; any origin when empty
    pub cors_origins: Vec<String>,

    /// Deadline for one response producer call
    pub producer_timeout: Option<Duration>,

    /// How long finished tasks are retained; forever when `None`
    pub task_ttl: Option<Duration>,

    /// How often the retention sweeper runs
    pub sweep_interval: Duration,

    /// SSE pacing
    pub streaming: StreamingConfig,
}

impl AgencyConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            api_key: None,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            public_url: None,
            registry_path: None,
            cors_origins: Vec::new(),
            producer_timeout: None,
            task_ttl: None,
            sweep_interval: Duration::from_secs(60),
            streaming: StreamingConfig::default(),
        }
    }

    /// Set the bind address
    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Require this API key on task endpoints
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Read the API key from a different header
    pub fn with_api_key_header(mut self, header: impl Into<String>) -> Self {
        self.api_key_header = header.into();
        self
    }

    /// Advertise this base URL in discovery cards
    pub fn with_public_url(mut self, url: Url) -> Self {
        self.public_url = Some(url);
        self
    }

    /// Load agents from this registry file
    pub fn with_registry_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Restrict CORS to these origins
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    /// Fail tasks whose reply takes longer than `timeout`
    pub fn with_producer_timeout(mut self, timeout: Duration) -> Self {
        self.producer_timeout = Some(timeout);
        self
    }

    /// Purge finished tasks after `ttl`
    pub fn with_task_ttl(mut self, ttl: Duration) -> Self {
        self.task_ttl = Some(ttl);
        self
    }

    /// Set the retention sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the streaming configuration
    pub fn with_streaming(mut self, streaming: StreamingConfig) -> Self {
        self.streaming = streaming;
        self
    }

    /// Address to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL used in cards when the request carries no `Host` header
    pub fn fallback_base_url(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) if ip.is_unspecified() => format!("http://localhost:{}", self.port),
            Ok(ip) => format!("http://{}", SocketAddr::new(ip, self.port)),
            Err(_) => format!("http://{}:{}", self.host, self.port),
        }
    }
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Pacing of chunked SSE delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamingConfig {
    /// Minimum chunk length before a chunk is closed
    pub chunk_size: usize,

    /// Pause between the initial snapshot and the first chunk
    pub settle_delay: Duration,

    /// Pause between chunk events
    pub chunk_delay: Duration,
}

impl StreamingConfig {
    /// No pacing at all; chunks are emitted back to back
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            chunk_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Set the minimum chunk length
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the settle delay
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the delay between chunks
    pub fn with_chunk_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            settle_delay: Duration::from_millis(500),
            chunk_delay: Duration::from_millis(200),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgencyConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.api_key_header, "x-api-key");
        assert!(config.api_key.is_none());
        assert!(config.task_ttl.is_none());
        assert_eq!(config.streaming.chunk_size, 50);
        assert_eq!(config.streaming.chunk_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_fallback_base_url() {
        assert_eq!(
            AgencyConfig::new().fallback_base_url(),
            "http://localhost:8000"
        );
        assert_eq!(
            AgencyConfig::new().with_bind("127.0.0.1", 9000).fallback_base_url(),
            "http://127.0.0.1:9000"
        );
        assert_eq!(
            AgencyConfig::new().with_bind("agency.local", 80).fallback_base_url(),
            "http://agency.local:80"
        );
    }

    #[test]
    fn test_immediate_streaming() {
        let streaming = StreamingConfig::immediate().with_chunk_size(10);
        assert_eq!(streaming.settle_delay, Duration::ZERO);
        assert_eq!(streaming.chunk_delay, Duration::ZERO);
        assert_eq!(streaming.chunk_size, 10);
    }
}
