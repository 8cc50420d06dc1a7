//! Document persistence.
//!
//! Each collection has its own async trait. Raffles and events are saved as
//! whole documents guarded by a `version` counter; the pending winner of a raffle
//! is written through a dedicated conditional update so two concurrent draws can
//! never both succeed.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Employee, EmployeeStatus, Event, Guest, ModuleConfig, PaginationParams, Raffle,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// 员工列表过滤条件
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
}

impl EmployeeFilter {
    pub fn matches(&self, employee: &Employee) -> bool {
        self.status.is_none_or(|s| employee.status == s)
            && self
                .department
                .as_deref()
                .is_none_or(|d| employee.department == d)
    }
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// 工号或邮箱重复时返回 StateConflict
    async fn insert_employee(&self, employee: &Employee) -> AppResult<()>;
    async fn update_employee(&self, employee: &Employee) -> AppResult<()>;
    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>>;
    async fn find_employees(&self, ids: &[Uuid]) -> AppResult<Vec<Employee>>;
    /// 返回 (当前页, 总数)
    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Employee>, i64)>;
}

#[async_trait]
pub trait GuestStore: Send + Sync {
    async fn find_guest(&self, id: Uuid) -> AppResult<Option<Guest>>;
    async fn find_guests(&self, ids: &[Uuid]) -> AppResult<Vec<Guest>>;
    /// 关联到该员工的嘉宾资料
    async fn find_guests_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<Guest>>;
    /// 按邮箱写入：已存在时更新资料并保留原 id，返回最终保存的嘉宾
    async fn upsert_guest(&self, guest: &Guest) -> AppResult<Guest>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, event: &mut Event) -> AppResult<()>;
    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>>;
    /// 按活动日期倒序
    async fn list_events(&self) -> AppResult<Vec<Event>>;
    /// 条件保存（version 必须与读取时一致），成功后 version + 1 并刷新派生状态
    async fn save_event(&self, event: &mut Event) -> AppResult<()>;
}

#[async_trait]
pub trait RaffleStore: Send + Sync {
    async fn insert_raffle(&self, raffle: &Raffle) -> AppResult<()>;
    async fn find_raffle(&self, id: Uuid) -> AppResult<Option<Raffle>>;
    async fn list_raffles(&self) -> AppResult<Vec<Raffle>>;
    /// 条件保存（version 必须与读取时一致），成功后 version + 1
    async fn save_raffle(&self, raffle: &mut Raffle) -> AppResult<()>;
    /// 仅当 current_winner 为空且 version 未变化时写入待确认中奖者；返回是否写入成功
    /// 抽奖不存在时返回 NotFound
    async fn assign_pending_winner(
        &self,
        raffle_id: Uuid,
        expected_version: i64,
        winner: Uuid,
        deadline: DateTime<Utc>,
    ) -> AppResult<bool>;
    /// 领奖窗口已过期但仍有待确认中奖者的抽奖
    async fn raffles_with_expired_claims(&self, now: DateTime<Utc>) -> AppResult<Vec<Raffle>>;
}

#[async_trait]
pub trait ModuleConfigStore: Send + Sync {
    async fn find_module_config(&self, module_id: Uuid) -> AppResult<Option<ModuleConfig>>;
    async fn save_module_config(&self, config: &ModuleConfig) -> AppResult<()>;
}

pub trait Store: EmployeeStore + GuestStore + EventStore + RaffleStore + ModuleConfigStore {}

impl<T> Store for T where T: EmployeeStore + GuestStore + EventStore + RaffleStore + ModuleConfigStore
{}

pub type SharedStore = Arc<dyn Store>;
