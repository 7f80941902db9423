//! Custom extractors for Axum handlers.
//!
//! Both render their rejections through the shared error body so clients see
//! the same shape for every 400.

pub mod id_path;
pub mod required_json;

pub use id_path::IdPath;
pub use required_json::RequiredJson;
