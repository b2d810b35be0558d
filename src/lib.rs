//! Persist flat "records" into key/attribute table storage and query them
//! back by field equality.
//!
//! A record is any struct deriving [`TableRecord`]. It carries a
//! [`RecordKey`] (table name, partition key and row key) and a set of
//! declared fields that map to a flat [`TableAttributes`] map.
//! [`TableStore`] wraps a [`TableService`] backend and ensures tables exist
//! lazily before every operation.
//!
//! ```ignore
//! let store = TableStore::new(MemoryTableService::new());
//!
//! let mut record = ProcessRecord::new()?;
//! record.file_name = "test.txt".into();
//! store.add_or_update(&record).await?;
//!
//! let filter = build_equality_query("file_name", "test.txt").expect("valid query");
//! let found: Vec<ProcessRecord> = store.search(&filter).await?;
//! ```

// Lets the derive macro refer to `::tablerecord` from inside this crate.
extern crate self as tablerecord;

pub mod config;
pub mod errors;
pub mod query;
pub mod records;
pub mod service;
pub mod store;
pub mod table;
pub mod traits;

pub use config::StoreConfig;
pub use errors::Error;
pub use query::{build_equality_query, Filter};
pub use service::{CreateTableOutcome, TableClient, TableService, UpdateMode};
pub use store::{DeleteReport, TableStore};
pub use table::{TableAttribute, TableAttributes};
pub use tablerecord_derive::TableRecord;
pub use traits::{RecordKey, RecordSchema, TableRecord};

#[cfg(feature = "dynamodb")]
pub use service::dynamo::DynamoTableService;
pub use service::memory::MemoryTableService;
