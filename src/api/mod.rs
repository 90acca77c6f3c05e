//! HTTP API exposing the verification engine

pub mod handlers;
pub mod routes;

pub use handlers::{ApiError, VerifyState};
pub use routes::build_router;
