use crate::models::{Employee, EmployeeStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub employee_code: String,
    pub name: String,
    #[sea_orm(unique)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Employee {
    fn from(m: Model) -> Self {
        Employee {
            id: m.id,
            employee_code: m.employee_code,
            name: m.name,
            email: m.email,
            department: m.department,
            position: m.position,
            join_date: m.join_date,
            status: m.status,
            raffle_eligible: m.raffle_eligible,
            raffle_exclusion_reason: m.raffle_exclusion_reason,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Employee> for ActiveModel {
    fn from(e: &Employee) -> Self {
        ActiveModel {
            id: Set(e.id),
            employee_code: Set(e.employee_code.clone()),
            name: Set(e.name.clone()),
            email: Set(e.email.clone()),
            department: Set(e.department.clone()),
            position: Set(e.position.clone()),
            join_date: Set(e.join_date),
            status: Set(e.status),
            raffle_eligible: Set(e.raffle_eligible),
            raffle_exclusion_reason: Set(e.raffle_exclusion_reason.clone()),
            created_at: Set(e.created_at),
            updated_at: Set(e.updated_at),
        }
    }
}
