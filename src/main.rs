use std::{path::PathBuf, sync::Arc, time::Duration};

use a2a_agency::{
    config::{AgencyConfig, StreamingConfig, DEFAULT_API_KEY_HEADER},
    producer::TemplateProducer,
    registry::{AgentRegistry, InMemoryRegistry},
    server::AgencyServer,
};
use anyhow::Context;
use clap::Parser;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

/// A2A agency server
#[derive(Debug, Parser)]
#[command(name = "a2a-agency", version, about)]
struct Cli {
    /// Interface to bind
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(long, env = "SERVER_PORT", default_value_t = 8000)]
    port: u16,

    /// API key required on JSON-RPC endpoints
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Header carrying the API key
    #[arg(long, env = "API_KEY_HEADER", default_value = DEFAULT_API_KEY_HEADER)]
    api_key_header: String,

    /// JSON file of registered agents
    #[arg(long, env = "REGISTRY_PATH")]
    registry_path: Option<PathBuf>,

    /// Base URL advertised in discovery cards
    #[arg(long, env = "PUBLIC_URL")]
    public_url: Option<Url>,

    /// Allowed CORS origins
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Vec<String>,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Deadline for one reply, in seconds
    #[arg(long, env = "PRODUCER_TIMEOUT_SECS")]
    producer_timeout_secs: Option<u64>,

    /// Retention of finished tasks, in seconds
    #[arg(long, env = "TASK_TTL_SECS")]
    task_ttl_secs: Option<u64>,

    /// How often expired tasks are purged, in seconds
    #[arg(long, env = "SWEEP_INTERVAL_SECS", default_value_t = 60)]
    sweep_interval_secs: u64,

    /// Minimum length of a streamed chunk
    #[arg(long, env = "CHUNK_SIZE", default_value_t = 50)]
    chunk_size: usize,

    /// Pause between streamed chunks, in milliseconds
    #[arg(long, env = "CHUNK_DELAY_MS", default_value_t = 200)]
    chunk_delay_ms: u64,

    /// Pause before the first streamed chunk, in milliseconds
    #[arg(long, env = "SETTLE_DELAY_MS", default_value_t = 500)]
    settle_delay_ms: u64,
}

impl Cli {
    fn config(&self) -> AgencyConfig {
        let streaming = StreamingConfig::default()
            .with_chunk_size(self.chunk_size.max(1))
            .with_chunk_delay(Duration::from_millis(self.chunk_delay_ms))
            .with_settle_delay(Duration::from_millis(self.settle_delay_ms));

        let mut config = AgencyConfig::new()
            .with_bind(self.host.clone(), self.port)
            .with_api_key_header(self.api_key_header.clone())
            .with_cors_origins(self.cors_origins.clone())
            .with_sweep_interval(Duration::from_secs(self.sweep_interval_secs.max(1)))
            .with_streaming(streaming);

        if let Some(key) = self.api_key.as_ref().filter(|key| !key.is_empty()) {
            config = config.with_api_key(key.clone());
        }
        if let Some(url) = &self.public_url {
            config = config.with_public_url(url.clone());
        }
        if let Some(path) = &self.registry_path {
            config = config.with_registry_path(path.clone());
        }
        if let Some(secs) = self.producer_timeout_secs {
            config = config.with_producer_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.task_ttl_secs {
            config = config.with_task_ttl(Duration::from_secs(secs));
        }
        config
    }
}

fn init_tracing(level: LevelFilter) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_registry(config: &AgencyConfig) -> anyhow::Result<InMemoryRegistry> {
    let Some(path) = &config.registry_path else {
        warn!("no registry file configured, starting with no agents");
        return Ok(InMemoryRegistry::new());
    };

    InMemoryRegistry::from_json_file(path)
        .with_context(|| format!("failed to load agent registry from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let config = cli.config();
    let registry: Arc<dyn AgentRegistry> = Arc::new(load_registry(&config)?);
    let producer = Arc::new(TemplateProducer::new(registry.clone()));

    let server = AgencyServer::new(config, registry, producer);
    let listener = server
        .bind()
        .await
        .with_context(|| format!("failed to bind {}", server.config().bind_address()))?;

    server
        .serve_with_shutdown(listener, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    Ok(())
}
