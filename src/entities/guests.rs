use crate::models::{Guest, GuestType};
use chrono::{DateTime, Utc};
use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "guests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub organization: Option<String>,
    pub guest_type: GuestType,
    /// guest_type = employee 时指向员工
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Guest {
    fn from(m: Model) -> Self {
        Guest {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            organization: m.organization,
            guest_type: m.guest_type,
            employee_id: m.employee_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<&Guest> for ActiveModel {
    fn from(g: &Guest) -> Self {
        ActiveModel {
            id: Set(g.id),
            name: Set(g.name.clone()),
            email: Set(g.email.clone()),
            phone: Set(g.phone.clone()),
            organization: Set(g.organization.clone()),
            guest_type: Set(g.guest_type),
            employee_id: Set(g.employee_id),
            created_at: Set(g.created_at),
            updated_at: Set(g.updated_at),
        }
    }
}
