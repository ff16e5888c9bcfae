use sea_orm::{
    ColumnTrait, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::{debug, error, warn};

use crate::{
    DbOperations, UnitOutcome,
    client::DbClient,
    entities::{drug_history_events, drugs},
};

impl DbClient {
    /// Runs the writes of one source event as a single transaction.
    ///
    /// The history table is checked for `(tx_hash, log_index)` first; a hit
    /// commits nothing and reports [`UnitOutcome::Duplicate`]. Any failing
    /// write returns early, dropping the transaction, which rolls back every
    /// write made before it.
    pub async fn apply_projection_unit(
        &self,
        tx_hash: &str,
        log_index: u64,
        ops: Vec<DbOperations>,
    ) -> eyre::Result<UnitOutcome> {
        let txn = self.primary.begin().await?;

        let existing =
            drug_history_events::Entity::find_by_id((tx_hash.to_owned(), log_index as i64))
                .one(&txn)
                .await?;
        if existing.is_some() {
            debug!(tx_hash, log_index, "Event already processed");
            txn.commit().await?;
            return Ok(UnitOutcome::Duplicate);
        }

        for op in ops {
            apply_operation(op, &txn).await.map_err(|e| {
                error!(tx_hash, log_index, "Projection write failed: {:?}", e);
                eyre::eyre!("Projection write failed for {tx_hash}#{log_index}: {e}")
            })?;
        }

        txn.commit().await?;
        Ok(UnitOutcome::Committed)
    }
}

async fn apply_operation(op: DbOperations, txn: &DatabaseTransaction) -> Result<(), DbErr> {
    match op {
        DbOperations::UpsertDrug(model) => {
            drugs::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(drugs::Column::Id)
                        .update_columns([
                            drugs::Column::ProductId,
                            drugs::Column::BatchId,
                            drugs::Column::ManufacturerAddress,
                            drugs::Column::CurrentOwnerAddress,
                            drugs::Column::Status,
                            drugs::Column::ManufactureTimestamp,
                            drugs::Column::LastUpdateTimestamp,
                            drugs::Column::ContractAddress,
                            drugs::Column::LastSyncedBlock,
                        ])
                        .action_and_where(
                            Expr::col((drugs::Entity, drugs::Column::LastSyncedBlock))
                                .lte(Expr::cust("excluded.last_synced_block")),
                        )
                        .to_owned(),
                )
                .exec_without_returning(txn)
                .await?;
        }
        DbOperations::TransferDrug {
            drug_id,
            new_owner,
            new_status,
            updated_at,
            block_number,
        } => {
            let res = drugs::Entity::update_many()
                .col_expr(drugs::Column::CurrentOwnerAddress, Expr::value(new_owner))
                .col_expr(drugs::Column::Status, Expr::value(new_status))
                .col_expr(drugs::Column::LastUpdateTimestamp, Expr::value(updated_at))
                .col_expr(drugs::Column::LastSyncedBlock, Expr::value(block_number))
                .filter(drugs::Column::Id.eq(drug_id.as_str()))
                .filter(drugs::Column::LastSyncedBlock.lte(block_number))
                .exec(txn)
                .await?;

            if res.rows_affected == 0 {
                warn!(
                    drug_id = %drug_id,
                    block_number, "Transfer matched no drug at or below this block"
                );
            }
        }
        DbOperations::InsertHistory(model) => {
            drug_history_events::Entity::insert(model)
                .exec_without_returning(txn)
                .await?;
        }
    }

    Ok(())
}
