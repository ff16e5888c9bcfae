//! Append-only history, keyed by the source log's (transaction hash, log index).

use sea_orm::entity::prelude::*;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "drug_history_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub transaction_hash: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub log_index: i64,
    pub drug_id: String,
    pub event_type: String,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub status: Option<String>,
    pub details: Option<String>,
    pub event_timestamp: DateTimeUtc,
    pub block_number: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::drugs::Entity",
        from = "Column::DrugId",
        to = "super::drugs::Column::Id"
    )]
    Drug,
}

impl Related<super::drugs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Drug.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
