//! Authentication and authorization.
//!
//! - [`JwtAuth`]: stateless HS256 token issuing and verification
//! - [`RolePolicy`] + [`require_roles`]: route-level role enforcement
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, middleware, routing::{get, post}};
//! use axum_helpers::auth::{JwtAuth, JwtConfig, RolePolicy, require_roles};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let writers = RolePolicy::any_of(auth, &["admin", "organizer"]);
//!
//! let routes = Router::new().route(
//!     "/events",
//!     get(list).merge(
//!         post(create).route_layer(middleware::from_fn_with_state(writers, require_roles)),
//!     ),
//! );
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use jwt::{JwtAuth, JwtClaims};
pub use middleware::{RolePolicy, extract_token, require_roles};
