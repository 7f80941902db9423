use axum::{
    Extension, Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, JwtAuth, JwtClaims, RequiredJson, RolePolicy,
    errors::responses::{
        BadRequestIdResponse, BadRequestResponse, ForbiddenResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    extract_ip_from_headers, extract_user_agent, require_roles,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventPartner, EventPayload, EventPartnerPayload, EventQuery, PageResult};
use crate::repository::EventRepository;
use crate::service::EventService;

/// OpenAPI tag for every events endpoint
pub const TAG: &str = "Events";

/// Roles allowed to create and update events
pub const WRITE_ROLES: &[&str] = &["admin", "organizer"];

/// Roles allowed to delete events
pub const DELETE_ROLES: &[&str] = &["admin"];

/// OpenAPI documentation for Events API
#[derive(OpenApi)]
#[openapi(
    paths(list_events, create_event, get_event, update_event, delete_event),
    components(
        schemas(Event, EventPartner, EventPayload, EventPartnerPayload, PageResult<Event>),
        responses(
            BadRequestResponse,
            BadRequestIdResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Event scheduling endpoints")
    )
)]
pub struct ApiDoc;

/// Create the events router.
///
/// Reads are public. `POST` and `PUT` need one of [`WRITE_ROLES`], `DELETE`
/// needs one of [`DELETE_ROLES`]. Role checks run as route layers, so they
/// answer before the path or body is looked at.
pub fn router<R: EventRepository + 'static>(service: EventService<R>, auth: JwtAuth) -> Router {
    let writers = RolePolicy::any_of(auth.clone(), WRITE_ROLES);
    let admins = RolePolicy::any_of(auth, DELETE_ROLES);

    Router::new()
        .route(
            "/",
            get(list_events::<R>).merge(
                post(create_event::<R>)
                    .route_layer(middleware::from_fn_with_state(writers.clone(), require_roles)),
            ),
        )
        .route(
            "/{id}",
            get(get_event::<R>)
                .merge(
                    put(update_event::<R>)
                        .route_layer(middleware::from_fn_with_state(writers, require_roles)),
                )
                .merge(
                    delete(delete_event::<R>)
                        .route_layer(middleware::from_fn_with_state(admins, require_roles)),
                ),
        )
        .with_state(Arc::new(service))
}

/// List events, newest first, one page at a time
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(EventQuery),
    responses(
        (status = 200, description = "Page of events", body = PageResult<Event>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> EventResult<Json<PageResult<Event>>> {
    let Query(query) = query.map_err(|e| EventError::Validation(e.body_text()))?;
    let page = service.list_events(query).await?;
    Ok(Json(page))
}

/// Create an event together with its partner links
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = EventPayload,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Event created", body = Event),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    headers: HeaderMap,
    RequiredJson(payload): RequiredJson<EventPayload>,
) -> EventResult<Json<Event>> {
    let event = service.create_event(payload).await?;

    AuditEvent::new(
        Some(claims.sub),
        "event.create",
        Some(format!("event:{}", event.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({
        "name": event.name,
        "partners": event.event_partners.len(),
    }))
    .log();

    Ok(Json(event))
}

/// Get a single event
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    IdPath(id): IdPath,
) -> EventResult<Json<Event>> {
    let event = service.get_event(id).await?;
    Ok(Json(event))
}

/// Replace name, dates and description of an event
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Event ID")
    ),
    request_body = EventPayload,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    headers: HeaderMap,
    IdPath(id): IdPath,
    RequiredJson(payload): RequiredJson<EventPayload>,
) -> EventResult<Json<Event>> {
    let event = service.update_event(id, payload).await?;

    AuditEvent::new(
        Some(claims.sub),
        "event.update",
        Some(format!("event:{}", event.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(Json(event))
}

/// Delete an event and its partner links
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i32, Path, description = "Event ID")
    ),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Event deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_event<R: EventRepository>(
    State(service): State<Arc<EventService<R>>>,
    Extension(claims): Extension<JwtClaims>,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> EventResult<impl IntoResponse> {
    service.delete_event(id).await?;

    AuditEvent::new(
        Some(claims.sub),
        "event.delete",
        Some(format!("event:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::OK)
}
