//! Runs against DynamoDB Local:
//!
//! ```sh
//! docker run -p 8000:8000 amazon/dynamodb-local
//! cargo test --test dynamo_tests -- --ignored
//! ```
#![cfg(feature = "dynamodb")]

use chrono::Utc;
use serial_test::serial;
use tablerecord::{
    build_equality_query, records::ProcessRecord, RecordSchema, TableRecord, TableStore,
};

mod common;

async fn fresh_schema(table_name: &str) -> RecordSchema {
    let config = common::local_config();
    let store = TableStore::connect(config).await;

    let _ = store
        .service()
        .db()
        .delete_table()
        .table_name(table_name)
        .send()
        .await;

    RecordSchema::new(table_name.to_string(), "process".to_string())
}

#[tokio::test]
#[serial]
#[ignore = "requires DynamoDB Local on localhost:8000"]
async fn test_round_trip_dynamo() {
    common::init_logging();

    let schema = fresh_schema("tablerecord-round-trip").await;
    let store = TableStore::connect(common::local_config()).await;

    let mut record = ProcessRecord::with_schema(&schema).unwrap();
    record.file_name = "test.txt".into();
    record.queued_time = Some(Utc::now());

    store
        .add_or_update(&record)
        .await
        .expect("Failed to insert record");

    let filter = build_equality_query("file_name", "test.txt").unwrap();
    let found: Vec<ProcessRecord> = store
        .search_in(schema.table_name(), &filter)
        .await
        .expect("Failed to search");

    assert_eq!(found, vec![record]);
}

#[tokio::test]
#[serial]
#[ignore = "requires DynamoDB Local on localhost:8000"]
async fn test_update_and_delete_dynamo() {
    common::init_logging();

    let schema = fresh_schema("tablerecord-update-delete").await;
    let store = TableStore::connect(common::local_config()).await;

    let mut record = ProcessRecord::with_schema(&schema).unwrap();
    record.file_name = "test.doc".into();
    store.add_or_update(&record).await.unwrap();

    let unprocessed = build_equality_query("processed", false).unwrap();
    let found: Vec<ProcessRecord> = store
        .search_in(schema.table_name(), &unprocessed)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    record.mark_processed(Utc::now());
    store.add_or_update(&record).await.unwrap();

    let found: Vec<ProcessRecord> = store
        .search_in(schema.table_name(), &unprocessed)
        .await
        .unwrap();
    assert!(found.is_empty());

    let report = store
        .delete_one(record.table_name(), &record)
        .await
        .unwrap();
    assert_eq!(report.deleted, 1);

    let processed = build_equality_query("processed", true).unwrap();
    let found: Vec<ProcessRecord> = store
        .search_in(schema.table_name(), &processed)
        .await
        .unwrap();
    assert!(found.is_empty());
}
