//! Tower Layer implementations for A2A protocol

pub mod auth;
pub mod validation;

pub use auth::{ApiKeyAuthenticator, AuthCredentials, AuthLayer, AuthService, Authenticator};
pub use validation::{A2AValidationLayer, A2AValidationService};
