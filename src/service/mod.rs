//! The table storage capability consumed by [`TableStore`](crate::TableStore).
//!
//! Backends implement [`TableService`] (account level: find tables, hand out
//! clients) and [`TableClient`] (one table: create, upsert, query, delete).
//! Connection handling, credentials and retries are the backend's concern.

#[cfg(feature = "dynamodb")]
pub mod dynamo;
pub mod memory;

use crate::{
    query::Filter,
    table::{TableAttribute, TableAttributes},
};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by a table storage backend.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("AwsError: {0}")]
    Aws(String),
    #[error("Table not found: {0}")]
    TableNotFound(String),
    #[error("Entity not found: {partition_key}/{row_key}")]
    EntityNotFound {
        partition_key: String,
        row_key: String,
    },
    #[error("{0}")]
    Other(String),
}

/// How an upsert treats an existing row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// The stored row becomes exactly the provided attributes.
    Replace,
    /// Provided attributes overwrite, others are kept.
    Merge,
}

/// Outcome of a table creation attempt.
///
/// Creation is advisory: callers always re-resolve the table afterwards.
#[derive(Debug)]
pub enum CreateTableOutcome {
    Created,
    AlreadyExists,
    Failed(ServiceError),
}

/// Type tag attached to a typed property by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdmType {
    String,
    Boolean,
    Int32,
    Int64,
    Double,
    DateTime,
    Guid,
}

/// A property exactly as the service returned it.
#[derive(Debug, Clone, PartialEq)]
pub enum RawProperty {
    /// Already a plain scalar.
    Value(TableAttribute),
    /// A scalar wrapped with its service type tag, in textual form.
    Tagged { edm_type: EdmType, value: String },
    /// A timestamp in the service's wire format (RFC 3339).
    DateTime(String),
}

impl From<TableAttribute> for RawProperty {
    fn from(value: TableAttribute) -> Self {
        RawProperty::Value(value)
    }
}

/// A row exactly as the service returned it.
pub type RawEntity = HashMap<String, RawProperty>;

#[async_trait]
pub trait TableService: Send + Sync {
    type Client: TableClient;

    /// Names of the tables matching `table_name`. Usually zero or one.
    async fn query_tables(&self, table_name: &str) -> Result<Vec<String>, ServiceError>;

    /// A handle for `table_name`. This does not check that the table exists.
    fn table_client(&self, table_name: &str) -> Self::Client;
}

#[async_trait]
pub trait TableClient: Send + Sync {
    fn table_name(&self) -> &str;

    async fn create_table(&self) -> CreateTableOutcome;

    async fn upsert_entity(
        &self,
        entity: TableAttributes,
        mode: UpdateMode,
    ) -> Result<(), ServiceError>;

    async fn query_entities(&self, filter: &Filter) -> Result<Vec<RawEntity>, ServiceError>;

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> Result<(), ServiceError>;
}
