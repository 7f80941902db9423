use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use std::collections::HashMap;

use crate::entity::{EventEntity, EventPartnerEntity, event, event_partner};
use crate::error::{EventError, EventResult};
use crate::models::{Event, EventChanges, EventFilter, NewEvent, PageFrame};
use crate::repository::EventRepository;

/// PostgreSQL implementation of EventRepository
#[derive(Clone)]
pub struct PgEventRepository {
    db: DatabaseConnection,
}

impl PgEventRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn filtered(filter: &EventFilter) -> Select<EventEntity> {
    let mut query = EventEntity::find();

    if let Some(from) = filter.begin_date {
        query = query.filter(event::Column::BeginDate.gte(from));
    }

    if let Some(to) = filter.end_date {
        query = query.filter(event::Column::BeginDate.lte(to));
    }

    query
}

async fn partners_of<C: ConnectionTrait>(
    conn: &C,
    model: &event::Model,
) -> EventResult<Vec<event_partner::Model>> {
    Ok(model
        .find_related(EventPartnerEntity)
        .order_by_asc(event_partner::Column::Id)
        .all(conn)
        .await?)
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list(&self, filter: EventFilter, frame: PageFrame) -> EventResult<Vec<Event>> {
        let events = filtered(&filter)
            .order_by_desc(event::Column::BeginDate)
            .order_by_desc(event::Column::Id)
            .offset(frame.offset())
            .limit(frame.limit())
            .all(&self.db)
            .await?;

        if events.is_empty() {
            return Ok(Vec::new());
        }

        // One round trip for all partner links on the page
        let ids: Vec<i32> = events.iter().map(|e| e.id).collect();
        let mut by_event: HashMap<i32, Vec<event_partner::Model>> = HashMap::new();
        for link in EventPartnerEntity::find()
            .filter(event_partner::Column::EventId.is_in(ids))
            .order_by_asc(event_partner::Column::Id)
            .all(&self.db)
            .await?
        {
            by_event.entry(link.event_id).or_default().push(link);
        }

        Ok(events
            .into_iter()
            .map(|model| {
                let partners = by_event.remove(&model.id).unwrap_or_default();
                model.into_domain(partners)
            })
            .collect())
    }

    async fn count(&self, filter: EventFilter) -> EventResult<u64> {
        Ok(filtered(&filter).count(&self.db).await?)
    }

    async fn get_by_id(&self, id: i32) -> EventResult<Option<Event>> {
        let Some(model) = EventEntity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let partners = partners_of(&self.db, &model).await?;
        Ok(Some(model.into_domain(partners)))
    }

    async fn create(&self, input: NewEvent) -> EventResult<Event> {
        let txn = self.db.begin().await?;

        let model = event::ActiveModel::from(&input).insert(&txn).await?;

        let mut partners = Vec::with_capacity(input.partner_ids.len());
        for partner_id in &input.partner_ids {
            partners.push(
                event_partner::link(model.id, *partner_id)
                    .insert(&txn)
                    .await?,
            );
        }

        txn.commit().await?;

        tracing::info!(event_id = model.id, partners = partners.len(), "Created event");
        Ok(model.into_domain(partners))
    }

    async fn update(&self, id: i32, changes: EventChanges) -> EventResult<Event> {
        let txn = self.db.begin().await?;

        let existing = EventEntity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(EventError::NotFound(id))?;

        let mut model: event::ActiveModel = existing.into();
        model.name = Set(changes.name);
        model.begin_date = Set(changes.begin_date);
        model.end_date = Set(changes.end_date);
        model.description = Set(changes.description);

        let updated = model.update(&txn).await?;
        let partners = partners_of(&txn, &updated).await?;

        txn.commit().await?;

        tracing::info!(event_id = id, "Updated event");
        Ok(updated.into_domain(partners))
    }

    async fn delete(&self, id: i32) -> EventResult<bool> {
        // event_partners rows go with it through ON DELETE CASCADE
        let result = EventEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            tracing::info!(event_id = id, "Deleted event");
        }
        Ok(result.rows_affected > 0)
    }
}
