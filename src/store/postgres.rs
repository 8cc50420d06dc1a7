use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, UpdateResult,
};
use uuid::Uuid;

use super::{EmployeeFilter, EmployeeStore, EventStore, GuestStore, ModuleConfigStore, RaffleStore};
use crate::entities::{
    employee_entity as employees, event_entity as events, guest_entity as guests,
    module_config_entity as module_configs, raffle_entity as raffles,
};
use crate::error::{AppError, AppResult};
use crate::models::{Employee, Event, Guest, ModuleConfig, PaginationParams, Raffle};

/// sea-orm (Postgres) 文档存储
#[derive(Clone)]
pub struct PgStore {
    pool: DatabaseConnection,
}

impl PgStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgStore {
    async fn insert_employee(&self, employee: &Employee) -> AppResult<()> {
        let model: employees::ActiveModel = employee.into();
        employees::Entity::insert(model).exec(&self.pool).await?;
        Ok(())
    }

    async fn update_employee(&self, employee: &Employee) -> AppResult<()> {
        let model: employees::ActiveModel = employee.into();
        let result = employees::Entity::update_many()
            .set(model)
            .filter(employees::Column::Id.eq(employee.id))
            .exec(&self.pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Employee {} not found", employee.id)));
        }
        Ok(())
    }

    async fn find_employee(&self, id: Uuid) -> AppResult<Option<Employee>> {
        let model = employees::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn find_employees(&self, ids: &[Uuid]) -> AppResult<Vec<Employee>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list = employees::Entity::find()
            .filter(employees::Column::Id.is_in(ids.to_vec()))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn list_employees(
        &self,
        filter: &EmployeeFilter,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Employee>, i64)> {
        let mut query = employees::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(employees::Column::Status.eq(status));
        }
        if let Some(department) = &filter.department {
            query = query.filter(employees::Column::Department.eq(department.as_str()));
        }

        let total = query.clone().count(&self.pool).await? as i64;
        let list = query
            .order_by_asc(employees::Column::Name)
            .order_by_asc(employees::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok((list.into_iter().map(Into::into).collect(), total))
    }
}

#[async_trait]
impl GuestStore for PgStore {
    async fn find_guest(&self, id: Uuid) -> AppResult<Option<Guest>> {
        let model = guests::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn find_guests(&self, ids: &[Uuid]) -> AppResult<Vec<Guest>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let list = guests::Entity::find()
            .filter(guests::Column::Id.is_in(ids.to_vec()))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn find_guests_by_employee(&self, employee_id: Uuid) -> AppResult<Vec<Guest>> {
        let list = guests::Entity::find()
            .filter(guests::Column::EmployeeId.eq(employee_id))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn upsert_guest(&self, guest: &Guest) -> AppResult<Guest> {
        let model: guests::ActiveModel = guest.into();
        // 邮箱冲突时只更新资料列，id / created_at 保持原值
        guests::Entity::insert(model)
            .on_conflict(
                OnConflict::column(guests::Column::Email)
                    .update_columns([
                        guests::Column::Name,
                        guests::Column::Phone,
                        guests::Column::Organization,
                        guests::Column::GuestType,
                        guests::Column::EmployeeId,
                        guests::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;

        let stored = guests::Entity::find()
            .filter(guests::Column::Email.eq(guest.email.as_str()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("Guest disappeared after upsert".into()))?;
        Ok(stored.into())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, event: &mut Event) -> AppResult<()> {
        event.prepare_for_save(Utc::now());
        let model: events::ActiveModel = (&*event).into();
        events::Entity::insert(model)
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_event(&self, id: Uuid) -> AppResult<Option<Event>> {
        let model = events::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn list_events(&self) -> AppResult<Vec<Event>> {
        let list = events::Entity::find()
            .order_by_desc(events::Column::Date)
            .order_by_asc(events::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn save_event(&self, event: &mut Event) -> AppResult<()> {
        let mut next = event.clone();
        next.prepare_for_save(Utc::now());
        next.version += 1;

        let model: events::ActiveModel = (&next).into();
        let result: UpdateResult = events::Entity::update_many()
            .set(model)
            .filter(events::Column::Id.eq(event.id))
            .filter(events::Column::Version.eq(event.version))
            .exec(&self.pool)
            .await?;

        if result.rows_affected != 1 {
            return Err(AppError::StateConflict(format!(
                "Event {} was modified concurrently",
                event.id
            )));
        }
        *event = next;
        Ok(())
    }
}

#[async_trait]
impl RaffleStore for PgStore {
    async fn insert_raffle(&self, raffle: &Raffle) -> AppResult<()> {
        let model: raffles::ActiveModel = raffle.into();
        raffles::Entity::insert(model)
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_raffle(&self, id: Uuid) -> AppResult<Option<Raffle>> {
        let model = raffles::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(model.map(Into::into))
    }

    async fn list_raffles(&self) -> AppResult<Vec<Raffle>> {
        let list = raffles::Entity::find()
            .order_by_desc(raffles::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn save_raffle(&self, raffle: &mut Raffle) -> AppResult<()> {
        let mut next = raffle.clone();
        next.version += 1;
        next.updated_at = Utc::now();

        let model: raffles::ActiveModel = (&next).into();
        let result: UpdateResult = raffles::Entity::update_many()
            .set(model)
            .filter(raffles::Column::Id.eq(raffle.id))
            .filter(raffles::Column::Version.eq(raffle.version))
            .exec(&self.pool)
            .await?;

        if result.rows_affected != 1 {
            return Err(AppError::StateConflict(format!(
                "Raffle {} was modified concurrently",
                raffle.id
            )));
        }
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
        // 原子条件更新: where current_winner IS NULL AND version = expected
        let result: UpdateResult = raffles::Entity::update_many()
            .col_expr(raffles::Column::CurrentWinner, Expr::value(Some(winner)))
            .col_expr(raffles::Column::ClaimDeadline, Expr::value(Some(deadline)))
            .col_expr(
                raffles::Column::Version,
                Expr::col(raffles::Column::Version).add(1),
            )
            .col_expr(raffles::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(raffles::Column::Id.eq(raffle_id))
            .filter(
                Condition::all()
                    .add(raffles::Column::CurrentWinner.is_null())
                    .add(raffles::Column::Version.eq(expected_version)),
            )
            .exec(&self.pool)
            .await?;

        if result.rows_affected == 1 {
            return Ok(true);
        }
        let exists = raffles::Entity::find_by_id(raffle_id)
            .one(&self.pool)
            .await?
            .is_some();
        if !exists {
            return Err(AppError::NotFound(format!("Raffle {raffle_id} not found")));
        }
        Ok(false)
    }

    async fn raffles_with_expired_claims(&self, now: DateTime<Utc>) -> AppResult<Vec<Raffle>> {
        let list = raffles::Entity::find()
            .filter(raffles::Column::CurrentWinner.is_not_null())
            .filter(raffles::Column::ClaimDeadline.lt(now))
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl ModuleConfigStore for PgStore {
    async fn find_module_config(&self, module_id: Uuid) -> AppResult<Option<ModuleConfig>> {
        let model = module_configs::Entity::find_by_id(module_id)
            .one(&self.pool)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn save_module_config(&self, config: &ModuleConfig) -> AppResult<()> {
        let model = module_configs::ActiveModel {
            module_id: Set(config.module_id),
            settings: Set(module_configs::SettingList(config.settings.clone())),
            updated_at: Set(config.updated_at),
        };
        module_configs::Entity::insert(model)
            .on_conflict(
                OnConflict::column(module_configs::Column::ModuleId)
                    .update_columns([
                        module_configs::Column::Settings,
                        module_configs::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }
}
