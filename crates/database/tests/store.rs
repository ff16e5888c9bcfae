use chrono::{DateTime, Utc};
use database::{
    DbOperations, UnitOutcome,
    client::DbClient,
    connect::connect_in_memory,
    entities::{drug_history_events, drugs},
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait, PaginatorTrait};

async fn setup() -> DbClient {
    let conn = connect_in_memory().await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    DbClient::new(conn)
}

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn drug(id: &str, owner: &str, block: i64) -> drugs::ActiveModel {
    drugs::ActiveModel {
        id: Set(id.to_owned()),
        product_id: Set("P1".to_owned()),
        batch_id: Set("B1".to_owned()),
        manufacturer_address: Set(owner.to_owned()),
        current_owner_address: Set(owner.to_owned()),
        status: Set("MANUFACTURED".to_owned()),
        manufacture_timestamp: Set(at(100)),
        last_update_timestamp: Set(at(100)),
        contract_address: Set("0xC0".to_owned()),
        last_synced_block: Set(block),
    }
}

fn history(tx: &str, log_index: i64, drug_id: &str, block: i64) -> drug_history_events::ActiveModel {
    drug_history_events::ActiveModel {
        transaction_hash: Set(tx.to_owned()),
        log_index: Set(log_index),
        drug_id: Set(drug_id.to_owned()),
        event_type: Set("DrugManufactured".to_owned()),
        from_address: Set(None),
        to_address: Set(None),
        status: Set(None),
        details: Set(None),
        event_timestamp: Set(at(100)),
        block_number: Set(block),
    }
}

async fn history_count(db: &DbClient) -> u64 {
    drug_history_events::Entity::find()
        .count(db.connection())
        .await
        .unwrap()
}

#[tokio::test]
async fn unit_commits_drug_and_history_together() {
    let db = setup().await;

    let outcome = db
        .apply_projection_unit(
            "t1",
            0,
            vec![
                DbOperations::UpsertDrug(drug("D1", "0xA", 10)),
                DbOperations::InsertHistory(history("t1", 0, "D1", 10)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(outcome, UnitOutcome::Committed);
    let stored = db.find_drug("D1").await.unwrap().unwrap();
    assert_eq!(stored.current_owner_address, "0xA");
    assert_eq!(history_count(&db).await, 1);
}

#[tokio::test]
async fn replayed_unit_is_reported_as_duplicate() {
    let db = setup().await;
    let ops = vec![
        DbOperations::UpsertDrug(drug("D1", "0xA", 10)),
        DbOperations::InsertHistory(history("t1", 0, "D1", 10)),
    ];

    db.apply_projection_unit("t1", 0, ops.clone()).await.unwrap();
    let outcome = db.apply_projection_unit("t1", 0, ops).await.unwrap();

    assert_eq!(outcome, UnitOutcome::Duplicate);
    assert_eq!(history_count(&db).await, 1);
}

#[tokio::test]
async fn failed_history_insert_rolls_back_drug_upsert() {
    let db = setup().await;
    db.connection()
        .execute_unprepared(
            "CREATE TRIGGER reject_history BEFORE INSERT ON drug_history_events \
             BEGIN SELECT RAISE(ABORT, 'history rejected'); END;",
        )
        .await
        .unwrap();

    let result = db
        .apply_projection_unit(
            "t1",
            0,
            vec![
                DbOperations::UpsertDrug(drug("D1", "0xA", 10)),
                DbOperations::InsertHistory(history("t1", 0, "D1", 10)),
            ],
        )
        .await;

    assert!(result.is_err());
    assert!(db.find_drug("D1").await.unwrap().is_none());
    assert_eq!(history_count(&db).await, 0);
}

#[tokio::test]
async fn transfer_ignores_older_blocks() {
    let db = setup().await;
    db.apply_projection_unit(
        "t1",
        0,
        vec![DbOperations::UpsertDrug(drug("D1", "0xA", 20))],
    )
    .await
    .unwrap();

    db.apply_projection_unit(
        "t0",
        0,
        vec![DbOperations::TransferDrug {
            drug_id: "D1".to_owned(),
            new_owner: "0xB".to_owned(),
            new_status: "IN_TRANSIT".to_owned(),
            updated_at: at(50),
            block_number: 15,
        }],
    )
    .await
    .unwrap();

    let stored = db.find_drug("D1").await.unwrap().unwrap();
    assert_eq!(stored.current_owner_address, "0xA");
    assert_eq!(stored.last_synced_block, 20);
}

#[tokio::test]
async fn progress_only_moves_forward() {
    let db = setup().await;
    assert_eq!(db.get_last_indexed_block().await.unwrap(), None);

    assert!(db.upsert_last_indexed_block(10).await.unwrap());
    assert!(!db.upsert_last_indexed_block(10).await.unwrap());
    assert!(!db.upsert_last_indexed_block(4).await.unwrap());
    assert_eq!(db.get_last_indexed_block().await.unwrap(), Some(10));

    assert!(db.upsert_last_indexed_block(11).await.unwrap());
    assert_eq!(db.get_last_indexed_block().await.unwrap(), Some(11));
}

#[tokio::test]
async fn reader_orders_history_and_matches_addresses_case_insensitively() {
    let db = setup().await;
    db.apply_projection_unit(
        "t2",
        1,
        vec![
            DbOperations::UpsertDrug(drug("D1", "0xAbC", 10)),
            DbOperations::InsertHistory(history("t2", 1, "D1", 10)),
        ],
    )
    .await
    .unwrap();
    db.apply_projection_unit("t1", 0, vec![DbOperations::InsertHistory(history("t1", 0, "D1", 10))])
        .await
        .unwrap();
    db.apply_projection_unit("t0", 3, vec![DbOperations::InsertHistory(history("t0", 3, "D1", 9))])
        .await
        .unwrap();

    let order: Vec<(i64, i64)> = db
        .drug_history("D1")
        .await
        .unwrap()
        .iter()
        .map(|h| (h.block_number, h.log_index))
        .collect();
    assert_eq!(order, vec![(9, 3), (10, 0), (10, 1)]);

    assert_eq!(db.find_drugs_by_owner("0xabc").await.unwrap().len(), 1);
    assert_eq!(db.find_drugs_by_manufacturer("0XABC").await.unwrap().len(), 1);
    assert!(db.find_drugs_by_owner("0xdef").await.unwrap().is_empty());

    let verified = db.verify_drug("D1").await.unwrap().unwrap();
    assert_eq!(verified.history.len(), 3);
    assert!(db.verify_drug("D2").await.unwrap().is_none());
}

#[tokio::test]
async fn verification_serializes_for_api_consumers() {
    let db = setup().await;
    db.apply_projection_unit(
        "t1",
        0,
        vec![
            DbOperations::UpsertDrug(drug("D1", "0xA", 10)),
            DbOperations::InsertHistory(history("t1", 0, "D1", 10)),
        ],
    )
    .await
    .unwrap();

    let verified = db.verify_drug("D1").await.unwrap().unwrap();
    let json = serde_json::to_value(&verified).unwrap();

    assert_eq!(json["drug"]["id"], "D1");
    assert_eq!(json["drug"]["current_owner_address"], "0xA");
    assert_eq!(json["history"][0]["transaction_hash"], "t1");
    assert_eq!(json["history"][0]["event_type"], "DrugManufactured");
}

#[tokio::test]
async fn upsert_never_rewinds_a_drug() {
    let db = setup().await;
    db.apply_projection_unit("t2", 0, vec![DbOperations::UpsertDrug(drug("D1", "0xB", 20))])
        .await
        .unwrap();
    db.apply_projection_unit("t1", 0, vec![DbOperations::UpsertDrug(drug("D1", "0xA", 10))])
        .await
        .unwrap();

    let stored = db.find_drug("D1").await.unwrap().unwrap();
    assert_eq!(stored.current_owner_address, "0xB");
    assert_eq!(stored.last_synced_block, 20);
}
