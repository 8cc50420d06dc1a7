use crate::models::{ModuleConfig, ModuleSetting};
use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SettingList(pub Vec<ModuleSetting>);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "module_configs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub module_id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub settings: SettingList,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ModuleConfig {
    fn from(m: Model) -> Self {
        ModuleConfig {
            module_id: m.module_id,
            settings: m.settings.0,
            updated_at: m.updated_at,
        }
    }
}
