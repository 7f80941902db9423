use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::entity::prelude::*;

// ===== Events =====

pub mod event {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "events")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        #[sea_orm(column_type = "Text")]
        pub name: String,
        pub begin_date: DateTime,
        pub end_date: DateTime,
        #[sea_orm(column_type = "Text")]
        pub description: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::event_partner::Entity")]
        EventPartners,
    }

    impl Related<super::event_partner::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::EventPartners.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        /// Attach already loaded partner links
        pub fn into_domain(
            self,
            partners: Vec<super::event_partner::Model>,
        ) -> crate::models::Event {
            crate::models::Event {
                id: self.id,
                name: self.name,
                begin_date: self.begin_date,
                end_date: self.end_date,
                description: self.description,
                event_partners: partners.into_iter().map(Into::into).collect(),
            }
        }
    }

    impl From<&crate::models::NewEvent> for ActiveModel {
        fn from(input: &crate::models::NewEvent) -> Self {
            ActiveModel {
                id: NotSet,
                name: Set(input.name.clone()),
                begin_date: Set(input.begin_date),
                end_date: Set(input.end_date),
                description: Set(input.description.clone()),
            }
        }
    }
}

// ===== Event Partners =====

pub mod event_partner {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "event_partners")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub event_id: i32,
        pub partner_id: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::event::Entity",
            from = "Column::EventId",
            to = "super::event::Column::Id",
            on_delete = "Cascade"
        )]
        Event,
    }

    impl Related<super::event::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Event.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl From<Model> for crate::models::EventPartner {
        fn from(model: Model) -> Self {
            Self {
                id: model.id,
                event_id: model.event_id,
                partner_id: model.partner_id,
            }
        }
    }

    /// Unsaved link row for `event_id`
    pub fn link(event_id: i32, partner_id: i32) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            event_id: Set(event_id),
            partner_id: Set(partner_id),
        }
    }
}

pub use event::Entity as EventEntity;
pub use event_partner::Entity as EventPartnerEntity;
