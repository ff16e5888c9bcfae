use chrono::Utc;
use sea_orm::{ActiveValue::Set, EntityTrait, TransactionTrait, sea_query::OnConflict};
use tracing::{debug, error};

use crate::{
    client::DbClient,
    entities::indexer_state::{self, LAST_INDEXED_BLOCK},
};

impl DbClient {
    /// Last block recorded as fully indexed, if any.
    pub async fn get_last_indexed_block(&self) -> eyre::Result<Option<u64>> {
        let res = indexer_state::Entity::find_by_id(LAST_INDEXED_BLOCK.to_owned())
            .one(&self.primary)
            .await?;
        Ok(res.map(|r| r.block_number as u64))
    }

    /// Records `block_number` as the last indexed block. The stored value
    /// never moves backwards: returns `false` and leaves the row untouched
    /// when it already holds the same or a higher block.
    pub async fn upsert_last_indexed_block(&self, block_number: u64) -> eyre::Result<bool> {
        let txn = self.primary.begin().await?;

        let current = indexer_state::Entity::find_by_id(LAST_INDEXED_BLOCK.to_owned())
            .one(&txn)
            .await?;
        if let Some(current) = current {
            if current.block_number >= block_number as i64 {
                debug!(
                    stored = current.block_number,
                    requested = block_number,
                    "Progress not advanced"
                );
                txn.commit().await?;
                return Ok(false);
            }
        }

        let model = indexer_state::ActiveModel {
            id: Set(LAST_INDEXED_BLOCK.to_owned()),
            block_number: Set(block_number as i64),
            updated_at: Set(Utc::now()),
        };
        indexer_state::Entity::insert(model)
            .on_conflict(
                OnConflict::column(indexer_state::Column::Id)
                    .update_columns([
                        indexer_state::Column::BlockNumber,
                        indexer_state::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| {
                error!("Failed to upsert last indexed block: {:?}", e);
                eyre::eyre!("Failed to upsert last indexed block: {:?}", e)
            })?;

        txn.commit().await?;
        Ok(true)
    }
}
