use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum GuestType {
    #[sea_orm(string_value = "employee")]
    Employee,
    #[sea_orm(string_value = "external")]
    External,
}

/// 活动嘉宾；type = employee 时 employee_id 指向员工档案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Guest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub guest_type: GuestType,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guest {
    /// 可与抽奖参与者关联的员工 ID；外部嘉宾永远返回 None
    pub fn linked_employee(&self) -> Option<Uuid> {
        match self.guest_type {
            GuestType::Employee => self.employee_id,
            GuestType::External => None,
        }
    }
}
