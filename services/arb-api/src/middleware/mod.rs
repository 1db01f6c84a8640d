//! Request middleware: wallet sessions, internal key, rate limiting

pub mod auth;
pub mod rate_limit;

pub use auth::{auth_middleware, internal_key_middleware};
pub use rate_limit::{rate_limit_middleware, RateLimiter};
