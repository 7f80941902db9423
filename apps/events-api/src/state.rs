//! Application state management.
//!
//! The state is built once in `main` and handed to the route builders, which
//! take what they need and apply their own state.

use axum_helpers::JwtAuth;

/// Shared application state.
///
/// Cloning is cheap: the connection pool and the JWT keys are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: database::postgres::DatabaseConnection,
    /// Bearer token verification shared by every role policy
    pub jwt_auth: JwtAuth,
}
