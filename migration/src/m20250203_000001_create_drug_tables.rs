use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Drugs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Drugs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Drugs::ProductId).string().not_null())
                    .col(ColumnDef::new(Drugs::BatchId).string().not_null())
                    .col(ColumnDef::new(Drugs::ManufacturerAddress).string().not_null())
                    .col(ColumnDef::new(Drugs::CurrentOwnerAddress).string().not_null())
                    .col(ColumnDef::new(Drugs::Status).string().not_null())
                    .col(
                        ColumnDef::new(Drugs::ManufactureTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Drugs::LastUpdateTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Drugs::ContractAddress).string().not_null())
                    .col(
                        ColumnDef::new(Drugs::LastSyncedBlock)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_drugs_current_owner")
                    .table(Drugs::Table)
                    .col(Drugs::CurrentOwnerAddress)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_drugs_manufacturer")
                    .table(Drugs::Table)
                    .col(Drugs::ManufacturerAddress)
                    .to_owned(),
            )
            .await?;

        // (transaction_hash, log_index) identifies a source log exactly once.
        manager
            .create_table(
                Table::create()
                    .table(DrugHistoryEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DrugHistoryEvents::TransactionHash)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrugHistoryEvents::LogIndex)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrugHistoryEvents::DrugId).string().not_null())
                    .col(
                        ColumnDef::new(DrugHistoryEvents::EventType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DrugHistoryEvents::FromAddress).string().null())
                    .col(ColumnDef::new(DrugHistoryEvents::ToAddress).string().null())
                    .col(ColumnDef::new(DrugHistoryEvents::Status).string().null())
                    .col(ColumnDef::new(DrugHistoryEvents::Details).text().null())
                    .col(
                        ColumnDef::new(DrugHistoryEvents::EventTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DrugHistoryEvents::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DrugHistoryEvents::TransactionHash)
                            .col(DrugHistoryEvents::LogIndex),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_drug_history_events_drug_order")
                    .table(DrugHistoryEvents::Table)
                    .col(DrugHistoryEvents::DrugId)
                    .col(DrugHistoryEvents::BlockNumber)
                    .col(DrugHistoryEvents::LogIndex)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DrugHistoryEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drugs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Drugs {
    Table,
    Id,
    ProductId,
    BatchId,
    ManufacturerAddress,
    CurrentOwnerAddress,
    Status,
    ManufactureTimestamp,
    LastUpdateTimestamp,
    ContractAddress,
    LastSyncedBlock,
}

#[derive(DeriveIden)]
enum DrugHistoryEvents {
    Table,
    TransactionHash,
    LogIndex,
    DrugId,
    EventType,
    FromAddress,
    ToAddress,
    Status,
    Details,
    EventTimestamp,
    BlockNumber,
}
