//! Current state of every tracked drug, one row per business id.

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "drugs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub batch_id: String,
    pub manufacturer_address: String,
    pub current_owner_address: String,
    pub status: String,
    pub manufacture_timestamp: DateTimeUtc,
    pub last_update_timestamp: DateTimeUtc,
    pub contract_address: String,
    pub last_synced_block: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::drug_history_events::Entity")]
    History,
}

impl Related<super::drug_history_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
