use crate::models::{Participant, Prize, Raffle, RaffleStatus};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PrizeList(pub Vec<Prize>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct ParticipantList(pub Vec<Participant>);

/// 抽奖实体
/// 概念说明:
/// - prizes / participants: 嵌入文档 (JSONB)，与抽奖一起整体保存
/// - current_winner: 待确认领奖的中奖员工 (NULL 表示没有)
/// - claim_deadline: 服务端记录的领奖截止时间
/// - version: 每次保存 +1，保存时校验
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "raffles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub event_id: Option<Uuid>,
    pub status: RaffleStatus,
    #[sea_orm(column_type = "JsonBinary")]
    pub prizes: PrizeList,
    #[sea_orm(column_type = "JsonBinary")]
    pub participants: ParticipantList,
    pub current_winner: Option<Uuid>,
    pub claim_deadline: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Raffle {
    fn from(m: Model) -> Self {
        Raffle {
            id: m.id,
            name: m.name,
            description: m.description,
            event_id: m.event_id,
            status: m.status,
            prizes: m.prizes.0,
            participants: m.participants.0,
            current_winner: m.current_winner,
            claim_deadline: m.claim_deadline,
            version: m.version,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Raffle> for ActiveModel {
    fn from(r: &Raffle) -> Self {
        ActiveModel {
            id: Set(r.id),
            name: Set(r.name.clone()),
            description: Set(r.description.clone()),
            event_id: Set(r.event_id),
            status: Set(r.status),
            prizes: Set(PrizeList(r.prizes.clone())),
            participants: Set(ParticipantList(r.participants.clone())),
            current_winner: Set(r.current_winner),
            claim_deadline: Set(r.claim_deadline),
            version: Set(r.version),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        }
    }
}
