use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Guest, GuestType};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    #[default]
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl EventStatus {
    /// 根据活动日期与当前时间推导状态:
    /// - 活动时间晚于当前时间 -> upcoming
    /// - 同一天（UTC）-> active
    /// - 其它 -> completed
    pub fn derive(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if date > now {
            EventStatus::Upcoming
        } else if date.date_naive() == now.date_naive() {
            EventStatus::Active
        } else {
            EventStatus::Completed
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

/// 活动嘉宾条目（内嵌在活动文档中）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct EventGuest {
    pub guest_id: Uuid,
    #[serde(default)]
    pub status: InvitationStatus,
    #[serde(default)]
    pub checked_in: bool,
    pub check_in_time: Option<DateTime<Utc>>,
}

impl EventGuest {
    pub fn invited(guest_id: Uuid) -> Self {
        Self {
            guest_id,
            status: InvitationStatus::Pending,
            checked_in: false,
            check_in_time: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    /// 派生字段，每次保存时重新计算
    pub status: EventStatus,
    pub guests: Vec<EventGuest>,
    pub raffle_id: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: String, description: String, date: DateTime<Utc>, location: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            date,
            location,
            status: EventStatus::derive(date, now),
            guests: Vec::new(),
            raffle_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 保存前调用：刷新派生状态与更新时间
    pub fn prepare_for_save(&mut self, now: DateTime<Utc>) {
        self.status = EventStatus::derive(self.date, now);
        self.updated_at = now;
    }

    pub fn guest_entry(&self, guest_id: Uuid) -> Option<&EventGuest> {
        self.guests.iter().find(|g| g.guest_id == guest_id)
    }

    pub fn checked_in_count(&self) -> usize {
        self.guests.iter().filter(|g| g.checked_in).count()
    }
}

// -----------------------------
// 请求 / 响应
// -----------------------------

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Annual gala")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: DateTime<Utc>,
    #[schema(example = "Main hall")]
    pub location: String,
}

/// 部分更新；date 变化后状态在保存时重新推导
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRsvpRequest {
    pub status: InvitationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddGuestRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub guest_type: GuestType,
    pub employee_id: Option<Uuid>,
}

/// 单人签到请求：guest_id 与 employee_id 二选一
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckInRequest {
    pub guest_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScanCheckInRequest {
    /// 扫码得到的原始文本（JSON）
    pub payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkCheckInRequest {
    pub employee_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckInResponse {
    pub guest_id: Uuid,
    /// 本次请求是否将该嘉宾从未签到变为已签到
    pub newly_checked_in: bool,
    /// 是否同步更新了关联抽奖的参与者出席状态
    pub raffle_attendance_updated: bool,
    pub event: Event,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkCheckInResponse {
    pub count: usize,
}

/// 嘉宾条目与嘉宾资料合并后的视图
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventGuestView {
    #[serde(flatten)]
    pub entry: EventGuest,
    pub guest: Option<Guest>,
}
