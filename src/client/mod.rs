//! HTTP client for agency servers

pub mod agent;
pub mod config;

pub use agent::A2AClient;
pub use config::ClientConfig;
