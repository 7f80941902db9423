use std::sync::Arc;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventPayload, EventQuery, PageResult};
use crate::repository::EventRepository;

/// Service layer for Event business logic
#[derive(Clone)]
pub struct EventService<R: EventRepository> {
    repository: Arc<R>,
}

impl<R: EventRepository> EventService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Page through events, newest `BeginDate` first.
    ///
    /// `TotalCount` is the size of the filtered set, not of the page.
    pub async fn list_events(&self, query: EventQuery) -> EventResult<PageResult<Event>> {
        let filter = query.filter();
        let frame = query.frame();

        tracing::debug!(?filter, ?frame, "Listing events");

        if filter.is_empty_range() {
            return Ok(PageResult::empty());
        }

        let (data, total_count) = tokio::try_join!(
            self.repository.list(filter, frame),
            self.repository.count(filter),
        )?;

        Ok(PageResult { data, total_count })
    }

    pub async fn get_event(&self, id: i32) -> EventResult<Event> {
        tracing::debug!(event_id = id, "Fetching event");
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// Store a new event; any client-supplied `Id` is discarded
    pub async fn create_event(&self, payload: EventPayload) -> EventResult<Event> {
        self.repository.create(payload.into_new_event()).await
    }

    /// Replace name, dates and description of an existing event
    pub async fn update_event(&self, id: i32, payload: EventPayload) -> EventResult<Event> {
        self.repository.update(id, payload.into_changes()).await
    }

    pub async fn delete_event(&self, id: i32) -> EventResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(EventError::NotFound(id));
        }

        Ok(())
    }
}
