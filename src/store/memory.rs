use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EmployeeFilter, EmployeeStore, EventStore, GuestStore, ModuleConfigStore, RaffleStore};
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Event, Guest, ModuleConfig, PaginationParams, Raffle};

/// 进程内文档存储（database.url = "memory://"）
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<HashMap<Uuid, Employee>>,
    guests: RwLock<HashMap<Uuid, Guest>>,
    events: RwLock<HashMap<Uuid, Event>>,
    raffles: RwLock<HashMap<Uuid, Raffle>>,
    module_configs: RwLock<HashMap<Uuid, ModuleConfig>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_employee_unique(map: &HashMap<Uuid, Employee>, employee: &Employee) -> AppResult<()> {
    let clash = map.values().find(|e| {
        e.id != employee.id
            && (e.employee_code == employee.employee_code || e.email == employee.email)
    });
    match clash {
        Some(existing) if existing.employee_code == employee.employee_code => Err(
            AppError::StateConflict(format!("Duplicate record: employee_code {}", employee.employee_code)),
        ),
        Some(_) => Err(AppError::StateConflict(format!(
            "Duplicate record: email {}",
            employee.email
        ))),
        None => Ok(()),
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert_employee(&self, employee: &Employee) -> AppResult<()> {
        let mut map = self.employees.write().await;
        check_employee_unique(&map, employee)?;
        map.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> AppResult<()> {
        let mut map = self.employees.write().await;
        if !map.contains_key(&employee.id) {
            return Err(AppError::NotFound(format!("Employee {} not found", employee.id)));
        }
        check_employee_unique(&map, employee)?;
        map.insert(employee.id, employee.clone());
        Ok(())
    }

    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>> {
        Ok(self.employees.read().await.get(&id).cloned())
    }

    async fn find_employees(&self, ids: &[Uuid]) -> AppResult<Vec<Employee>> {
        let map = self.employees.read().await;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Employee>, i64)> {
        let map = self.employees.read().await;
        let mut matched: Vec<&Employee> = map.values().filter(|e| filter.matches(e)).collect();
        matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(params.get_offset() as usize)
            .take(params.get_limit() as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    async fn find_guest(&self, id: Uuid) -> AppResult<Option<Guest>> {
        Ok(self.guests.read().await.get(&id).cloned())
    }

    async fn find_guests(&self, ids: &[Uuid]) -> AppResult<Vec<Guest>> {
        let map = self.guests.read().await;
        Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
    }

    async fn find_guests_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<Guest>> {
        Ok(self
            .guests
            .read()
            .await
            .values()
            .filter(|g| g.employee_id == Some(employee_id))
            .cloned()
            .collect())
    }

    async fn upsert_guest(&self, guest: &Guest) -> AppResult<Guest> {
        let mut map = self.guests.write().await;
        let stored = match map.values().find(|g| g.email == guest.email) {
            Some(existing) => Guest {
                id: existing.id,
                created_at: existing.created_at,
                ..guest.clone()
            },
            None => guest.clone(),
        };
        map.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, event: &mut Event) -> AppResult<()> {
        event.prepare_for_save(Utc::now());
        let mut map = self.events.write().await;
        if map.contains_key(&event.id) {
            return Err(AppError::StateConflict(format!("Event {} already exists", event.id)));
        }
        map.insert(event.id, event.clone());
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let mut list: Vec<Event> = self.events.read().await.values().cloned().collect();
        list.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(list)
    }

    async fn save_event(&self, event: &mut Event) -> AppResult<()> {
        let mut map = self.events.write().await;
        match map.get(&event.id) {
            Some(current) if current.version == event.version => {}
            _ => {
                return Err(AppError::StateConflict(format!(
                    "Event {} was modified concurrently",
                    event.id
                )));
            }
        }
        let mut next = event.clone();
        next.prepare_for_save(Utc::now());
        next.version += 1;
        map.insert(next.id, next.clone());
        *event = next;
        Ok(())
    }
}

#[async_trait]
impl RaffleStore for MemoryStore {
    async fn insert_raffle(&self, raffle: &Raffle) -> AppResult<()> {
        let mut map = self.raffles.write().await;
        if map.contains_key(&raffle.id) {
            return Err(AppError::StateConflict(format!("Raffle {} already exists", raffle.id)));
        }
        map.insert(raffle.id, raffle.clone());
        Ok(())
    }

    async fn find_raffle(&self, id: Uuid) -> AppResult<Option<Raffle>> {
        Ok(self.raffles.read().await.get(&id).cloned())
    }

    async fn list_raffles(&self) -> AppResult<Vec<Raffle>> {
        let mut list: Vec<Raffle> = self.raffles.read().await.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn save_raffle(&self, raffle: &mut Raffle) -> AppResult<()> {
        let mut map = self.raffles.write().await;
        match map.get(&raffle.id) {
            Some(current) if current.version == raffle.version => {}
            _ => {
                return Err(AppError::StateConflict(format!(
                    "Raffle {} was modified concurrently",
                    raffle.id
                )));
            }
        }
        let mut next = raffle.clone();
        next.version += 1;
        next.updated_at = Utc::now();
        map.insert(next.id, next.clone());
        *raffle = next;
        Ok(())
    }

    async fn assign_pending_winner(
        &self,
        raffle_id: Uuid,
        expected_version: i64,
        winner: Uuid,
        deadline: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut map = self.raffles.write().await;
        let Some(raffle) = map.get_mut(&raffle_id) else {
            return Err(AppError::NotFound(format!("Raffle {raffle_id} not found")));
        };
        if raffle.current_winner.is_some() || raffle.version != expected_version {
            return Ok(false);
        }
        raffle.current_winner = Some(winner);
        raffle.claim_deadline = Some(deadline);
        raffle.version += 1;
        raffle.updated_at = Utc::now();
        Ok(true)
    }

    async fn raffles_with_expired_claims(&self, now: DateTime<Utc>) -> AppResult<Vec<Raffle>> {
        Ok(self
            .raffles
            .read()
            .await
            .values()
            .filter(|r| r.current_winner.is_some() && r.claim_deadline.is_some_and(|d| d < now))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ModuleConfigStore for MemoryStore {
    async fn find_module_config(&self, module_id: Uuid) -> AppResult<Option<ModuleConfig>> {
        Ok(self.module_configs.read().await.get(&module_id).cloned())
    }

    async fn save_module_config(&self, config: &ModuleConfig) -> AppResult<()> {
        self.module_configs
            .write()
            .await
            .insert(config.module_id, config.clone());
        Ok(())
    }
}
