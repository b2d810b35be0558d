//! Queue a few files, process one of them and count what is left.
//!
//! Runs against an in-memory table unless `TABLERECORD_ENDPOINT_URL` is set,
//! e.g. for DynamoDB Local:
//!
//! ```sh
//! TABLERECORD_ENDPOINT_URL=http://localhost:8000 TABLERECORD_REGION=us-east-1 \
//!     cargo run --example process_records
//! ```

use chrono::Utc;
use log::info;
use tablerecord::{
    build_equality_query, errors::ReadConversionError, records::ProcessRecord, Filter,
    MemoryTableService, StoreConfig, TableAttribute, TableRecord, TableService, TableStore,
};

const TEST_FILES: [&str; 4] = ["test.txt", "test.xls", "test.pdf", "test.doc"];

fn query(field: &str, value: impl Into<TableAttribute>) -> Result<Filter, ReadConversionError> {
    build_equality_query(field, value)
        .ok_or_else(|| ReadConversionError::InvalidFormat(format!("No query for {field}")))
}

async fn run<S: TableService>(store: TableStore<S>) -> Result<(), tablerecord::Error> {
    for file_name in TEST_FILES {
        let mut record = ProcessRecord::new()?;
        record.file_name = file_name.to_string();
        record.queued_time = Some(Utc::now());

        info!("Adding {file_name} to the table");
        store.add_or_update(&record).await?;
    }

    info!("Searching for {}", TEST_FILES[0]);
    let found: Vec<ProcessRecord> = store.search(&query("file_name", TEST_FILES[0])?).await?;
    info!("Found result: {}", !found.is_empty());

    if let Some(mut record) = found.into_iter().next() {
        info!("Updating {}", record.row_key());
        record.mark_processed(Utc::now());
        store.add_or_update(&record).await?;
    }

    let unprocessed: Vec<ProcessRecord> = store.search(&query("processed", false)?).await?;

    info!(
        "Started adding {} records, {} are unprocessed",
        TEST_FILES.len(),
        unprocessed.len()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = StoreConfig::builder().with_env().build()?;

    if config.endpoint_url().is_some() {
        run(TableStore::connect(config).await).await?;
    } else {
        run(TableStore::new(MemoryTableService::new())).await?;
    }

    Ok(())
}
