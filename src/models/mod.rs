//! Request and response bodies for the HTTP API.

mod api;

pub use api::{HealthResponse, LoginRequest, RewriteRequest, RewriteResponse, SuccessResponse};
