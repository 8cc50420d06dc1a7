use chrono::Utc;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateEmployeeRequest, Employee, EmployeeQuery, EmployeeStatus, Event, HistoryEntry,
    HistoryKind, PaginatedResponse, PaginationParams, Raffle, UpdateEmployeeRequest,
};
use crate::store::{EmployeeFilter, EmployeeStore, EventStore, GuestStore, RaffleStore, SharedStore};
use crate::utils::{normalize_email, require_text, validate_email};

/// 每类历史记录最多返回的条数
const HISTORY_LIMIT: usize = 10;

#[derive(Clone)]
pub struct EmployeeService {
    store: SharedStore,
}

impl EmployeeService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// 新建员工档案；工号或邮箱重复返回 StateConflict
    pub async fn create_employee(&self, req: CreateEmployeeRequest) -> AppResult<Employee> {
        let email = normalize_email(&req.email);
        validate_email(&email)?;

        let raffle_eligible = req.raffle_eligible.unwrap_or(true);
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            employee_code: require_text("employee_code", &req.employee_code)?,
            name: require_text("name", &req.name)?,
            email,
            department: require_text("department", &req.department)?,
            position: require_text("position", &req.position)?,
            join_date: req.join_date,
            status: req.status.unwrap_or(EmployeeStatus::Active),
            raffle_eligible,
            raffle_exclusion_reason: if raffle_eligible {
                None
            } else {
                req.raffle_exclusion_reason
            },
            created_at: now,
            updated_at: now,
        };

        self.store.insert_employee(&employee).await?;
        log::info!("Employee {} ({}) created", employee.id, employee.employee_code);
        Ok(employee)
    }

    pub async fn get_employee(&self, id: Uuid) -> AppResult<Employee> {
        self.store
            .find_employee(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
    }

    pub async fn list_employees(&self, query: EmployeeQuery) -> AppResult<PaginatedResponse<Employee>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let filter = EmployeeFilter {
            status: query.status,
            department: query
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        };
        let (data, total) = self.store.list_employees(&filter, &params).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    /// 部分更新；重新开启 raffle_eligible 时清空排除原因
    pub async fn update_employee(
        &self,
        id: Uuid,
        req: UpdateEmployeeRequest,
    ) -> AppResult<Employee> {
        let mut employee = self.get_employee(id).await?;

        if let Some(name) = &req.name {
            employee.name = require_text("name", name)?;
        }
        if let Some(email) = &req.email {
            let email = normalize_email(email);
            validate_email(&email)?;
            employee.email = email;
        }
        if let Some(department) = &req.department {
            employee.department = require_text("department", department)?;
        }
        if let Some(position) = &req.position {
            employee.position = require_text("position", position)?;
        }
        if let Some(status) = req.status {
            employee.status = status;
        }
        if let Some(reason) = req.raffle_exclusion_reason {
            employee.raffle_exclusion_reason = Some(reason);
        }
        if let Some(eligible) = req.raffle_eligible {
            employee.raffle_eligible = eligible;
            if eligible {
                employee.raffle_exclusion_reason = None;
            }
        }
        employee.updated_at = Utc::now();

        self.store.update_employee(&employee).await?;
        Ok(employee)
    }

    /// 参与记录:
    /// - 已签到的活动（按活动日期）
    /// - 出席或中奖的抽奖（按创建时间），中奖时描述奖品
    ///
    /// 两类各取最近 10 条，合并后按日期倒序。
    pub async fn history(&self, id: Uuid) -> AppResult<Vec<HistoryEntry>> {
        self.get_employee(id).await?;

        let guest_ids: HashSet<Uuid> = self
            .store
            .find_guests_by_employee(id)
            .await?
            .into_iter()
            .filter_map(|g| g.linked_employee().map(|_| g.id))
            .collect();
        let events = self.store.list_events().await?;
        let raffles = self.store.list_raffles().await?;

        Ok(build_history(id, &guest_ids, &events, &raffles))
    }
}

fn build_history(
    employee_id: Uuid,
    guest_ids: &HashSet<Uuid>,
    events: &[Event],
    raffles: &[Raffle],
) -> Vec<HistoryEntry> {
    let mut attended: Vec<&Event> = events
        .iter()
        .filter(|e| {
            e.guests
                .iter()
                .any(|g| g.checked_in && guest_ids.contains(&g.guest_id))
        })
        .collect();
    attended.sort_by(|a, b| b.date.cmp(&a.date));

    let mut joined: Vec<&Raffle> = raffles
        .iter()
        .filter(|r| {
            r.participant(employee_id)
                .is_some_and(|p| p.attended || p.won_prize)
        })
        .collect();
    joined.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut history: Vec<HistoryEntry> = attended
        .into_iter()
        .take(HISTORY_LIMIT)
        .map(|e| HistoryEntry {
            kind: HistoryKind::Event,
            title: e.name.clone(),
            date: e.date,
            description: "Attended the event".to_string(),
        })
        .chain(joined.into_iter().take(HISTORY_LIMIT).map(|r| {
            let won = r
                .prizes
                .iter()
                .find(|p| p.claimed && p.winner == Some(employee_id));
            HistoryEntry {
                kind: HistoryKind::Raffle,
                title: r.name.clone(),
                date: r.created_at,
                description: match won {
                    Some(prize) => format!("Won {}", prize.name),
                    None => "Participated in the raffle".to_string(),
                },
            }
        }))
        .collect();
    history.sort_by(|a, b| b.date.cmp(&a.date));
    history
}
