#![allow(unused_imports)]

// Derive Traits
use tablerecord::TableRecord;

// Errors
use tablerecord::{
    errors::{DeleteError, PutError, SearchError, TableError},
    Error,
};

// Error Dependencies
use tablerecord::errors::{ConfigError, ReadConversionError, RecordError, ServiceError};

// Records and queries
use tablerecord::{
    build_equality_query, records::ProcessRecord, Filter, RecordKey, RecordSchema, TableAttribute,
    TableAttributes,
};

// Storage
use tablerecord::{
    CreateTableOutcome, DeleteReport, MemoryTableService, StoreConfig, TableClient, TableService,
    TableStore, UpdateMode,
};

fn main() {}
