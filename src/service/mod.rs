//! Tower Service implementations

pub mod dispatcher;
pub mod request;
pub mod response;

pub use dispatcher::A2AService;
pub use request::{A2ARequest, RequestContext, Scope};
pub use response::A2AResponse;
