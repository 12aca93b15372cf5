//! HTTP management API for Toolbelt
//!
//! - **server**: axum router, response envelope, auth/rate-limit gate
//! - **rate_limit**: fixed-window per-client request limiter

mod rate_limit;
mod server;

pub use rate_limit::RateLimiter;
pub use server::{create_router, serve, ApiState};
