use crate::models::{Event, EventGuest, EventStatus};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 嘉宾条目列表（JSONB），与活动文档一起读写
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct GuestEntries(pub Vec<EventGuest>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
    #[sea_orm(column_type = "JsonBinary")]
    pub guests: GuestEntries,
    pub raffle_id: Option<Uuid>,
    /// 乐观锁版本号
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Event {
    fn from(m: Model) -> Self {
        Event {
            id: m.id,
            name: m.name,
            description: m.description,
            date: m.date,
            location: m.location,
            status: m.status,
            guests: m.guests.0,
            raffle_id: m.raffle_id,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Event> for ActiveModel {
    fn from(e: &Event) -> Self {
        ActiveModel {
            id: Set(e.id),
            name: Set(e.name.clone()),
            description: Set(e.description.clone()),
            date: Set(e.date),
            location: Set(e.location.clone()),
            status: Set(e.status),
            guests: Set(GuestEntries(e.guests.clone())),
            raffle_id: Set(e.raffle_id),
            version: Set(e.version),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
        }
    }
}
