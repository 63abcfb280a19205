//! Authentication module
//!
//! Resolves the calling user from the identity header set upstream.

mod middleware;

pub use middleware::AuthUser;
