use axum::Router;
use domain_events::{EventService, PgEventRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgEventRepository::new(state.db.clone());
    let service = EventService::new(repository);
    handlers::router(service, state.jwt_auth.clone())
}
