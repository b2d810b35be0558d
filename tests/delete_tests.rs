use tablerecord::{
    build_equality_query, errors::ServiceError, records::ProcessRecord, TableRecord,
};

mod common;

fn record(file_name: &str) -> ProcessRecord {
    let mut record = ProcessRecord::new().expect("Failed to create record");
    record.file_name = file_name.to_string();
    record
}

#[tokio::test]
async fn test_delete_one() {
    let (store, service) = common::memory_store();

    let keep = record("keep.txt");
    let remove = record("remove.txt");
    store.add_or_update(&keep).await.unwrap();
    store.add_or_update(&remove).await.unwrap();

    let report = store
        .delete_one("processrecords", &remove)
        .await
        .expect("Failed to delete");

    assert_eq!(report.deleted, 1);
    assert!(report.is_complete());
    assert_eq!(service.row_count("processrecords"), Some(1));

    let filter = build_equality_query("file_name", "remove.txt").unwrap();
    let found: Vec<ProcessRecord> = store.search(&filter).await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_delete_many_skips_bad_records() {
    let (store, service) = common::memory_store();

    let first = record("a.txt");
    let mut broken = record("b.txt");
    let third = record("c.txt");

    for r in [&first, &broken, &third] {
        store.add_or_update(r).await.unwrap();
    }

    broken.key_mut().set_row_key("");

    let report = store
        .delete_many("processrecords", &[first, broken, third])
        .await
        .expect("Bad records must not fail the batch");

    assert_eq!(report.deleted, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.failed.is_empty());
    assert!(!report.is_complete());
    assert_eq!(service.row_count("processrecords"), Some(1));
}

#[tokio::test]
async fn test_delete_many_continues_after_failure() {
    let (store, service) = common::memory_store();

    let stored = record("stored.txt");
    let never_stored = record("ghost.txt");
    let also_stored = record("also.txt");

    store.add_or_update(&stored).await.unwrap();
    store.add_or_update(&also_stored).await.unwrap();

    let report = store
        .delete_many(
            "processrecords",
            &[stored, never_stored.clone(), also_stored],
        )
        .await
        .unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].row_key, never_stored.row_key());
    assert!(matches!(
        report.failed[0].error,
        ServiceError::EntityNotFound { .. }
    ));
    assert_eq!(service.row_count("processrecords"), Some(0));
}

#[tokio::test]
async fn test_move_record_to_another_table() {
    let (store, service) = common::memory_store();

    let mut record = record("done.txt");
    store.add_or_update(&record).await.unwrap();

    record.key_mut().set_table_name("archive");
    store.add_or_update(&record).await.unwrap();

    let report = store.delete_one("processrecords", &record).await.unwrap();
    assert_eq!(report.deleted, 1);

    assert_eq!(service.row_count("processrecords"), Some(0));
    assert_eq!(service.row_count("archive"), Some(1));

    let filter = build_equality_query("file_name", "done.txt").unwrap();
    let archived: Vec<ProcessRecord> = store.search_in("archive", &filter).await.unwrap();
    assert_eq!(archived, vec![record]);
}
