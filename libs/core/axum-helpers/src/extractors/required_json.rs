//! JSON body extractor that rejects missing bodies.

use crate::errors::AppError;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

/// Message used when the body is empty or the literal `null`
pub const BODY_REQUIRED: &str = "Request body is required";

/// JSON body extractor.
///
/// Unlike `axum::Json` it does not insist on a `Content-Type` header, and it
/// treats an empty body or a bare `null` as a missing body
/// ([`AppError::BadRequest`]). A body that does not deserialize into `T` is an
/// [`AppError::InvalidJson`].
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::RequiredJson;
///
/// async fn create(RequiredJson(payload): RequiredJson<EventPayload>) -> impl IntoResponse {
///     // payload is guaranteed present
/// }
/// ```
pub struct RequiredJson<T>(pub T);

impl<T, S> FromRequest<S> for RequiredJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(AppError::BadRequest(BODY_REQUIRED.to_string()));
        }

        match serde_json::from_slice::<Option<T>>(&bytes) {
            Ok(Some(value)) => Ok(RequiredJson(value)),
            Ok(None) => Err(AppError::BadRequest(BODY_REQUIRED.to_string())),
            Err(e) => Err(AppError::from(e)),
        }
    }
}
