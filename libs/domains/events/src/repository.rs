use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{EventError, EventResult};
use crate::models::{Event, EventChanges, EventFilter, EventPartner, NewEvent, PageFrame};

/// Repository trait for Event persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// One page of events matching `filter`, newest `BeginDate` first
    async fn list(&self, filter: EventFilter, frame: PageFrame) -> EventResult<Vec<Event>>;

    /// Number of events matching `filter`, ignoring paging
    async fn count(&self, filter: EventFilter) -> EventResult<u64>;

    async fn get_by_id(&self, id: i32) -> EventResult<Option<Event>>;

    /// Insert the event and its partner links, returning the stored event
    async fn create(&self, input: NewEvent) -> EventResult<Event>;

    /// Overwrite the mutable columns; partner links stay as they are
    async fn update(&self, id: i32, changes: EventChanges) -> EventResult<Event>;

    /// Delete the event and its partner links; `false` when nothing matched
    async fn delete(&self, id: i32) -> EventResult<bool>;
}

#[derive(Debug)]
struct Store {
    events: BTreeMap<i32, Event>,
    next_event_id: i32,
    next_partner_id: i32,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            events: BTreeMap::new(),
            next_event_id: 1,
            next_partner_id: 1,
        }
    }
}

impl Store {
    fn matching(&self, filter: &EventFilter) -> Vec<&Event> {
        let mut events: Vec<&Event> = self
            .events
            .values()
            .filter(|e| filter.matches(e.begin_date))
            .collect();

        events.sort_by(|a, b| b.begin_date.cmp(&a.begin_date).then(b.id.cmp(&a.id)));
        events
    }
}

/// In-memory implementation of EventRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn list(&self, filter: EventFilter, frame: PageFrame) -> EventResult<Vec<Event>> {
        let store = self.store.read().await;
        let offset = usize::try_from(frame.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(frame.limit()).unwrap_or(usize::MAX);

        Ok(store
            .matching(&filter)
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: EventFilter) -> EventResult<u64> {
        let store = self.store.read().await;
        Ok(store.matching(&filter).len() as u64)
    }

    async fn get_by_id(&self, id: i32) -> EventResult<Option<Event>> {
        let store = self.store.read().await;
        Ok(store.events.get(&id).cloned())
    }

    async fn create(&self, input: NewEvent) -> EventResult<Event> {
        let mut store = self.store.write().await;

        let id = store.next_event_id;
        store.next_event_id += 1;

        let mut event_partners = Vec::with_capacity(input.partner_ids.len());
        for partner_id in input.partner_ids {
            event_partners.push(EventPartner {
                id: store.next_partner_id,
                event_id: id,
                partner_id,
            });
            store.next_partner_id += 1;
        }

        let event = Event {
            id,
            name: input.name,
            begin_date: input.begin_date,
            end_date: input.end_date,
            description: input.description,
            event_partners,
        };
        store.events.insert(id, event.clone());

        tracing::info!(event_id = id, "Created event");
        Ok(event)
    }

    async fn update(&self, id: i32, changes: EventChanges) -> EventResult<Event> {
        let mut store = self.store.write().await;
        let event = store.events.get_mut(&id).ok_or(EventError::NotFound(id))?;

        event.name = changes.name;
        event.begin_date = changes.begin_date;
        event.end_date = changes.end_date;
        event.description = changes.description;

        Ok(event.clone())
    }

    async fn delete(&self, id: i32) -> EventResult<bool> {
        let mut store = self.store.write().await;
        Ok(store.events.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn new_event(name: &str, begin: u32, partners: Vec<i32>) -> NewEvent {
        NewEvent {
            name: name.to_string(),
            begin_date: day(begin),
            end_date: day(begin + 1),
            description: String::new(),
            partner_ids: partners,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_and_links() {
        let repo = InMemoryEventRepository::new();

        let first = repo.create(new_event("a", 1, vec![10, 11])).await.unwrap();
        let second = repo.create(new_event("b", 2, vec![12])).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(
            first.event_partners.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert_eq!(second.event_partners[0].id, 3);
        assert!(first.event_partners.iter().all(|p| p.event_id == 1));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_and_pages() {
        let repo = InMemoryEventRepository::new();
        for d in [3, 1, 5, 2, 4] {
            repo.create(new_event(&format!("e{}", d), d, vec![])).await.unwrap();
        }

        let page = repo
            .list(EventFilter::default(), PageFrame::new(1, 2))
            .await
            .unwrap();
        let names: Vec<_> = page.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["e3", "e2"]);

        assert_eq!(repo.count(EventFilter::default()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_equal_begin_dates_break_ties_by_id() {
        let repo = InMemoryEventRepository::new();
        let a = repo.create(new_event("a", 1, vec![])).await.unwrap();
        let b = repo.create(new_event("b", 1, vec![])).await.unwrap();

        let all = repo
            .list(EventFilter::default(), PageFrame::default())
            .await
            .unwrap();
        assert_eq!(all[0].id, b.id);
        assert_eq!(all[1].id, a.id);
    }

    #[tokio::test]
    async fn test_filter_applies_to_list_and_count() {
        let repo = InMemoryEventRepository::new();
        for d in 1..=6 {
            repo.create(new_event("e", d, vec![])).await.unwrap();
        }

        let filter = EventFilter {
            begin_date: Some(day(2)),
            end_date: Some(day(4)),
        };
        let events = repo.list(filter, PageFrame::default()).await.unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(repo.count(filter).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_keeps_partners() {
        let repo = InMemoryEventRepository::new();
        let created = repo.create(new_event("old", 1, vec![7])).await.unwrap();

        let updated = repo
            .update(
                created.id,
                EventChanges {
                    name: "new".into(),
                    begin_date: day(9),
                    end_date: day(10),
                    description: "changed".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "new");
        assert_eq!(updated.begin_date, day(9));
        assert_eq!(updated.event_partners, created.event_partners);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryEventRepository::new();
        let result = repo
            .update(
                42,
                EventChanges {
                    name: String::new(),
                    begin_date: day(1),
                    end_date: day(1),
                    description: String::new(),
                },
            )
            .await;
        assert!(matches!(result, Err(EventError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_reports_whether_removed() {
        let repo = InMemoryEventRepository::new();
        let created = repo.create(new_event("x", 1, vec![])).await.unwrap();

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }
}
