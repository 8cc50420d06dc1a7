use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

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
pub enum EmployeeStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmployeeStatus::Active => write!(f, "active"),
            EmployeeStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// 员工档案（抽奖场景下只做软排除，不物理删除）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    /// 业务工号（唯一）
    pub employee_code: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub join_date: NaiveDate,
    pub status: EmployeeStatus,
    pub raffle_eligible: bool,
    pub raffle_exclusion_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    /// 不能加入抽奖的原因；None 表示可以加入
    pub fn raffle_ineligibility(&self) -> Option<String> {
        if self.status == EmployeeStatus::Inactive {
            return Some("Employee is inactive".to_string());
        }
        if !self.raffle_eligible {
            return Some(
                self.raffle_exclusion_reason
                    .clone()
                    .unwrap_or_else(|| "Employee is excluded from raffles".to_string()),
            );
        }
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    #[schema(example = "E-1024")]
    pub employee_code: String,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    pub department: String,
    pub position: String,
    #[schema(example = "2021-04-01")]
    pub join_date: NaiveDate,
    pub status: Option<EmployeeStatus>,
    pub raffle_eligible: Option<bool>,
    pub raffle_exclusion_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub status: Option<EmployeeStatus>,
    pub raffle_eligible: Option<bool>,
    pub raffle_exclusion_reason: Option<String>,
}

/// 员工列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct EmployeeQuery {
    /// 页码 (默认 1)
    pub page: Option<u32>,
    /// 每页数量 (默认 20)
    pub per_page: Option<u32>,
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HistoryKind {
    Event,
    Raffle,
}

/// 员工参与记录（活动签到 / 抽奖）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: HistoryKind,
    pub title: String,
    pub date: DateTime<Utc>,
    #[schema(example = "Won Bike")]
    pub description: String,
}
