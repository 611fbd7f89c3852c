//! API module
//!
//! HTTP endpoints, caller-context extraction, and request logging.

pub mod middleware;
pub mod routes;

pub use routes::create_router;
