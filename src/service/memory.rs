//! An in-process table service. Rows are returned with the same typed
//! wrappers a remote service would use so callers exercise the same
//! normalization path.

use super::{
    CreateTableOutcome, EdmType, RawEntity, RawProperty, ServiceError, TableClient, TableService,
    UpdateMode,
};
use crate::{
    query::Filter,
    table::{TableAttribute, TableAttributes},
    traits::{PARTITION_KEY, ROW_KEY},
};
use async_trait::async_trait;
use chrono::SecondsFormat;
use itertools::Itertools;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

type Rows = BTreeMap<(String, String), TableAttributes>;

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Rows>,
}

/// Table service backed by memory. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableService {
    state: Arc<Mutex<State>>,
}

impl MemoryTableService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every table, sorted.
    ///
    /// Inspection helpers read through a poisoned lock: a panic in another
    /// caller leaves the tables readable.
    pub fn table_names(&self) -> Vec<String> {
        self.inspect()
            .tables
            .keys()
            .cloned()
            .sorted()
            .collect()
    }

    /// Number of rows in `table_name`, or `None` if the table does not exist.
    pub fn row_count(&self, table_name: &str) -> Option<usize> {
        self.inspect().tables.get(table_name).map(|rows| rows.len())
    }

    fn inspect(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn lock(state: &Mutex<State>) -> Result<MutexGuard<'_, State>, ServiceError> {
    state
        .lock()
        .map_err(|_| ServiceError::Other("memory table state is poisoned".to_string()))
}

#[async_trait]
impl TableService for MemoryTableService {
    type Client = MemoryTableClient;

    async fn query_tables(&self, table_name: &str) -> Result<Vec<String>, ServiceError> {
        let state = lock(&self.state)?;

        Ok(state
            .tables
            .keys()
            .filter(|name| name.as_str() == table_name)
            .cloned()
            .collect())
    }

    fn table_client(&self, table_name: &str) -> Self::Client {
        MemoryTableClient {
            state: self.state.clone(),
            table_name: table_name.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct MemoryTableClient {
    state: Arc<Mutex<State>>,
    table_name: String,
}

impl MemoryTableClient {
    fn with_rows<T>(
        &self,
        f: impl FnOnce(&mut Rows) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let mut state = lock(&self.state)?;
        let rows = state
            .tables
            .get_mut(&self.table_name)
            .ok_or_else(|| ServiceError::TableNotFound(self.table_name.clone()))?;

        f(rows)
    }
}

#[async_trait]
impl TableClient for MemoryTableClient {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn create_table(&self) -> CreateTableOutcome {
        let mut state = match lock(&self.state) {
            Ok(state) => state,
            Err(e) => return CreateTableOutcome::Failed(e),
        };

        if state.tables.contains_key(&self.table_name) {
            CreateTableOutcome::AlreadyExists
        } else {
            state.tables.insert(self.table_name.clone(), Rows::new());
            CreateTableOutcome::Created
        }
    }

    async fn upsert_entity(
        &self,
        entity: TableAttributes,
        mode: UpdateMode,
    ) -> Result<(), ServiceError> {
        let key = (
            key_part(&entity, PARTITION_KEY)?,
            key_part(&entity, ROW_KEY)?,
        );

        self.with_rows(|rows| {
            let row = match (mode, rows.remove(&key)) {
                (UpdateMode::Merge, Some(existing)) => existing.merge(entity),
                _ => entity,
            };

            rows.insert(key, row);
            Ok(())
        })
    }

    async fn query_entities(&self, filter: &Filter) -> Result<Vec<RawEntity>, ServiceError> {
        self.with_rows(|rows| {
            Ok(rows
                .values()
                .filter(|row| filter.matches(row))
                .map(to_raw_entity)
                .collect())
        })
    }

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> Result<(), ServiceError> {
        self.with_rows(|rows| {
            rows.remove(&(partition_key.to_string(), row_key.to_string()))
                .map(|_| ())
                .ok_or_else(|| ServiceError::EntityNotFound {
                    partition_key: partition_key.to_string(),
                    row_key: row_key.to_string(),
                })
        })
    }
}

fn key_part(entity: &TableAttributes, name: &str) -> Result<String, ServiceError> {
    entity
        .get(name)
        .and_then(TableAttribute::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Other(format!("entity is missing {name}")))
}

fn to_raw_entity(row: &TableAttributes) -> RawEntity {
    row.iter()
        .map(|(key, value)| {
            let raw = match value {
                TableAttribute::Int(i) => RawProperty::Tagged {
                    edm_type: EdmType::Int64,
                    value: i.to_string(),
                },
                TableAttribute::Double(d) => RawProperty::Tagged {
                    edm_type: EdmType::Double,
                    value: d.to_string(),
                },
                TableAttribute::Timestamp(ts) => {
                    RawProperty::DateTime(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true))
                }
                other => RawProperty::Value(other.clone()),
            };

            (key.clone(), raw)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poisoned_state() {
        let service = MemoryTableService::new();
        let client = service.table_client("records");
        assert!(matches!(
            client.create_table().await,
            CreateTableOutcome::Created
        ));

        let state = service.state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("poison the table state");
        })
        .join();

        // Inspection still works
        assert_eq!(service.table_names(), vec!["records".to_string()]);
        assert_eq!(service.row_count("records"), Some(0));

        // Service calls report the failure
        assert!(matches!(
            service.query_tables("records").await,
            Err(ServiceError::Other(_))
        ));
        assert!(matches!(
            client.create_table().await,
            CreateTableOutcome::Failed(ServiceError::Other(_))
        ));
    }
}
