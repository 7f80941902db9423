use super::jwt::{JwtAuth, JwtClaims};
use crate::audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract a JWT from the `Authorization: Bearer` header, falling back to the
/// `access_token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .or_else(|| {
            headers
                .get(header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        match cookie.trim().split_once('=') {
                            Some(("access_token", value)) if !value.is_empty() => {
                                Some(value.to_string())
                            }
                            _ => None,
                        }
                    })
                })
        })
}

/// Which roles may pass through [`require_roles`].
///
/// Built once per route group and handed to the middleware as state.
#[derive(Clone)]
pub struct RolePolicy {
    auth: JwtAuth,
    allowed: Arc<[String]>,
}

impl RolePolicy {
    /// Admit principals holding at least one of `roles`
    pub fn any_of(auth: JwtAuth, roles: &[&str]) -> Self {
        Self {
            auth,
            allowed: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn allowed_roles(&self) -> &[String] {
        &self.allowed
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<JwtClaims, Denial> {
        let token = extract_token(headers).ok_or_else(|| {
            tracing::debug!("No JWT found in Authorization header or cookie");
            Denial::Unauthenticated("Authentication required")
        })?;

        let claims = self.auth.verify_token(&token).map_err(|e| {
            tracing::debug!("JWT verification failed: {}", e);
            Denial::Unauthenticated("Invalid or expired token")
        })?;

        if !claims.has_any_role(&self.allowed[..]) {
            return Err(Denial::MissingRole(claims));
        }

        Ok(claims)
    }
}

enum Denial {
    Unauthenticated(&'static str),
    MissingRole(JwtClaims),
}

/// Role enforcement middleware.
///
/// - missing, invalid or expired token: `401`
/// - valid token without an allowed role: `403`, audited as denied
/// - otherwise the [`JwtClaims`] are inserted into request extensions
///
/// Apply with `route_layer` on the method routes that need it so the check
/// runs before body extraction and before any lookup.
pub async fn require_roles(
    State(policy): State<RolePolicy>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match policy.authorize(request.headers()) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            Ok(next.run(request).await)
        }
        Err(Denial::Unauthenticated(msg)) => Err(AppError::Unauthorized(msg.to_string())),
        Err(Denial::MissingRole(claims)) => {
            AuditEvent::new(
                Some(claims.sub),
                "access.denied",
                Some(format!("{} {}", request.method(), request.uri().path())),
                AuditOutcome::Denied,
            )
            .with_ip(extract_ip_from_headers(request.headers()))
            .with_user_agent(extract_user_agent(request.headers()))
            .with_details(serde_json::json!({
                "roles": claims.roles,
                "required_roles": policy.allowed_roles(),
            }))
            .log();

            Err(AppError::Forbidden(format!(
                "Requires one of the roles: {}",
                policy.allowed_roles().join(", ")
            )))
        }
    }
}
