mod normalize;

use crate::{
    errors::{DeleteError, PutError, SearchError, TableError},
    query::Filter,
    service::{CreateTableOutcome, ServiceError, TableClient, TableService, UpdateMode},
    traits::TableRecord,
};
use itertools::Itertools;
use log::{debug, info, warn};
use normalize::normalize_entity;

/// A delete that the service rejected.
#[derive(Debug)]
pub struct DeleteFailure {
    pub partition_key: String,
    pub row_key: String,
    pub error: ServiceError,
}

/// Outcome of a best-effort bulk delete.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: usize,
    /// Records without a row or partition key.
    pub skipped: usize,
    pub failed: Vec<DeleteFailure>,
}

impl DeleteReport {
    /// Whether every record was deleted.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.failed.is_empty()
    }
}

/// Reads and writes records through a [`TableService`].
///
/// Tables are created on demand. Nothing is cached between calls: every
/// operation resolves its table again.
#[derive(Debug, Clone)]
pub struct TableStore<S> {
    service: S,
}

#[cfg(feature = "dynamodb")]
impl TableStore<crate::service::dynamo::DynamoTableService> {
    /// Connect to DynamoDB using `config` and the AWS environment.
    pub async fn connect(config: crate::StoreConfig) -> Self {
        Self::new(crate::service::dynamo::DynamoTableService::connect(config).await)
    }
}

impl<S: TableService> TableStore<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Return a client for `table_name`, creating the table if it cannot be
    /// found.
    ///
    /// Creation is best-effort so that concurrent callers racing to create
    /// the same table all succeed; the lookup afterwards decides.
    pub async fn ensure_table_client(&self, table_name: &str) -> Result<S::Client, TableError> {
        match self.resolve_table_client(table_name).await {
            Ok(client) => return Ok(client),
            Err(e) => debug!("Could not resolve table {table_name}: {e}"),
        }

        match self.service.table_client(table_name).create_table().await {
            CreateTableOutcome::Created => info!("Created table {table_name}"),
            CreateTableOutcome::AlreadyExists => debug!("Table {table_name} already exists"),
            CreateTableOutcome::Failed(e) => warn!("Failed to create table {table_name}: {e}"),
        }

        self.resolve_table_client(table_name).await
    }

    async fn resolve_table_client(&self, table_name: &str) -> Result<S::Client, TableError> {
        let found = self.service.query_tables(table_name).await?;

        if found.iter().filter(|name| name.as_str() == table_name).count() == 1 {
            Ok(self.service.table_client(table_name))
        } else {
            Err(TableError::NotFound(table_name.to_string()))
        }
    }

    /// Write `record` to its table, replacing any stored row with the same
    /// keys.
    pub async fn add_or_update<R: TableRecord>(&self, record: &R) -> Result<(), PutError> {
        let client = self.ensure_table_client(record.table_name()).await?;

        client
            .upsert_entity(record.to_attributes(), UpdateMode::Replace)
            .await?;

        debug!(
            "Upserted {}/{} into {}",
            record.partition_key(),
            record.row_key(),
            record.table_name()
        );

        Ok(())
    }

    /// Find every record of type `R` in its schema table matching `filter`.
    pub async fn search<R: TableRecord>(&self, filter: &Filter) -> Result<Vec<R>, SearchError> {
        self.search_in(R::schema().table_name(), filter).await
    }

    /// Like [`search`](Self::search) but in an explicitly named table.
    ///
    /// Rows that cannot be read back as `R` are logged and left out.
    pub async fn search_in<R: TableRecord>(
        &self,
        table_name: &str,
        filter: &Filter,
    ) -> Result<Vec<R>, SearchError> {
        let client = self.ensure_table_client(table_name).await?;
        let entities = client.query_entities(filter).await?;

        if entities.is_empty() {
            info!("Failed to get results for query: {filter}");
        }

        let mut records = Vec::with_capacity(entities.len());

        for raw in entities {
            let record = normalize_entity(raw)
                .and_then(|attributes| R::from_entity(table_name, attributes));

            match record {
                Ok(record) => records.push(record),
                Err(e) => warn!("Ignoring unreadable row in {table_name} for query {filter}: {e}"),
            }
        }

        Ok(records)
    }

    pub async fn delete_one<R: TableRecord>(
        &self,
        table_name: &str,
        record: &R,
    ) -> Result<DeleteReport, DeleteError> {
        self.delete_many(table_name, std::slice::from_ref(record))
            .await
    }

    /// Delete `records` from `table_name`, one at a time.
    ///
    /// Records missing a row or partition key are skipped. A failed delete
    /// does not stop the remaining ones; failures are collected in the
    /// returned report.
    pub async fn delete_many<R: TableRecord>(
        &self,
        table_name: &str,
        records: &[R],
    ) -> Result<DeleteReport, DeleteError> {
        let client = self.ensure_table_client(table_name).await?;
        let mut report = DeleteReport::default();

        for record in records {
            let key = record.key();

            if !key.is_addressable() {
                warn!("Ignoring bad record on row or partition: {key:?}");
                report.skipped += 1;
                continue;
            }

            match client
                .delete_entity(key.partition_key(), key.row_key())
                .await
            {
                Ok(()) => report.deleted += 1,
                Err(error) => report.failed.push(DeleteFailure {
                    partition_key: key.partition_key().to_string(),
                    row_key: key.row_key().to_string(),
                    error,
                }),
            }
        }

        if !report.failed.is_empty() {
            warn!(
                "Failed to delete {} records from {table_name}: {}",
                report.failed.len(),
                report
                    .failed
                    .iter()
                    .map(|f| format!("{}/{} ({})", f.partition_key, f.row_key, f.error))
                    .join(", ")
            );
        }

        Ok(report)
    }
}
