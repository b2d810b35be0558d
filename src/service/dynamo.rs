//! DynamoDB backend.
//!
//! Tables use `PartitionKey` as the hash key and `RowKey` as the range key.
//! Timestamps have no native DynamoDB type and are stored as a map of
//! `{ "edm": "DateTime", "value": <RFC 3339> }`.

use super::{
    CreateTableOutcome, EdmType, RawEntity, RawProperty, ServiceError, TableClient, TableService,
    UpdateMode,
};
use crate::{
    config::StoreConfig,
    query::Filter,
    table::{TableAttribute, TableAttributes},
    traits::{PARTITION_KEY, ROW_KEY},
};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    config::Region,
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
        ProvisionedThroughput, ScalarAttributeType, TableStatus,
    },
    Client,
};
use chrono::SecondsFormat;
use log::{debug, info};
use std::{collections::HashMap, time::Duration};

const EDM_TAG: &str = "edm";
const EDM_VALUE: &str = "value";
const EDM_DATETIME: &str = "DateTime";

const TABLE_READY_POLL: Duration = Duration::from_millis(500);
const TABLE_READY_ATTEMPTS: usize = 60;

#[derive(Debug, Clone)]
pub struct DynamoTableService {
    db: Client,
    config: StoreConfig,
}

impl DynamoTableService {
    pub fn new(db: Client, config: StoreConfig) -> Self {
        Self { db, config }
    }

    /// Load AWS configuration from the environment, applying the endpoint and
    /// region overrides in `config`.
    pub async fn connect(config: StoreConfig) -> Self {
        let mut loader = aws_config::from_env();

        if let Some(endpoint_url) = config.endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        if let Some(region) = config.region() {
            loader = loader.region(Region::new(region.to_string()));
        }

        let sdk_config = loader.load().await;
        info!("Connected to DynamoDB");

        Self::new(Client::new(&sdk_config), config)
    }

    pub fn db(&self) -> &Client {
        &self.db
    }
}

#[async_trait]
impl TableService for DynamoTableService {
    type Client = DynamoTableClient;

    async fn query_tables(&self, table_name: &str) -> Result<Vec<String>, ServiceError> {
        match table_status(&self.db, table_name).await? {
            Some(TableStatus::Active) | Some(TableStatus::Updating) => {
                Ok(vec![table_name.to_string()])
            }
            Some(status) => {
                debug!("Table {table_name} is not usable yet: {status:?}");
                Ok(vec![])
            }
            None => Ok(vec![]),
        }
    }

    fn table_client(&self, table_name: &str) -> Self::Client {
        DynamoTableClient {
            db: self.db.clone(),
            config: self.config.clone(),
            table_name: table_name.to_string(),
        }
    }
}

pub struct DynamoTableClient {
    db: Client,
    config: StoreConfig,
    table_name: String,
}

impl DynamoTableClient {
    /// Returns `false` when the table already exists.
    async fn create(&self) -> Result<bool, ServiceError> {
        let mut request = self
            .db
            .create_table()
            .table_name(&self.table_name)
            .attribute_definitions(key_definition(PARTITION_KEY)?)
            .attribute_definitions(key_definition(ROW_KEY)?)
            .key_schema(key_schema(PARTITION_KEY, KeyType::Hash)?)
            .key_schema(key_schema(ROW_KEY, KeyType::Range)?);

        request = match self.config.capacity() {
            Some(capacity) => request
                .billing_mode(BillingMode::Provisioned)
                .provisioned_throughput(
                    ProvisionedThroughput::builder()
                        .read_capacity_units(capacity.read)
                        .write_capacity_units(capacity.write)
                        .build()
                        .map_err(|e| ServiceError::Aws(e.to_string()))?,
                ),
            None => request.billing_mode(BillingMode::PayPerRequest),
        };

        match request.send().await {
            Ok(_) => Ok(true),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                Ok(false)
            }
            Err(e) => Err(ServiceError::Aws(format!("{e:?}"))),
        }
    }

    /// DynamoDB creates tables asynchronously; wait until this one is usable.
    async fn wait_until_active(&self) -> Result<(), ServiceError> {
        for _ in 0..TABLE_READY_ATTEMPTS {
            if let Some(TableStatus::Active) = table_status(&self.db, &self.table_name).await? {
                return Ok(());
            }

            tokio::time::sleep(TABLE_READY_POLL).await;
        }

        Err(ServiceError::Other(format!(
            "table {} did not become active",
            self.table_name
        )))
    }
}

#[async_trait]
impl TableClient for DynamoTableClient {
    fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn create_table(&self) -> CreateTableOutcome {
        let outcome = match self.create().await {
            Ok(true) => CreateTableOutcome::Created,
            Ok(false) => CreateTableOutcome::AlreadyExists,
            Err(e) => return CreateTableOutcome::Failed(e),
        };

        // Either we or a concurrent creator started the table
        match self.wait_until_active().await {
            Ok(()) => outcome,
            Err(e) => CreateTableOutcome::Failed(e),
        }
    }

    async fn upsert_entity(
        &self,
        entity: TableAttributes,
        mode: UpdateMode,
    ) -> Result<(), ServiceError> {
        match mode {
            UpdateMode::Replace => {
                let item: HashMap<String, AttributeValue> = entity
                    .into_iter()
                    .map(|(k, v)| (k, to_attribute_value(v)))
                    .collect();

                self.db
                    .put_item()
                    .table_name(&self.table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map_err(|e| ServiceError::Aws(format!("{e:?}")))?;
            }
            UpdateMode::Merge => {
                let mut entity = entity;
                let pk = entity.remove(PARTITION_KEY).map(to_attribute_value);
                let rk = entity.remove(ROW_KEY).map(to_attribute_value);

                let (Some(pk), Some(rk)) = (pk, rk) else {
                    return Err(ServiceError::Other(
                        "entity is missing PartitionKey or RowKey".to_string(),
                    ));
                };

                let mut request = self
                    .db
                    .update_item()
                    .table_name(&self.table_name)
                    .key(PARTITION_KEY, pk)
                    .key(ROW_KEY, rk);

                let mut assignments = Vec::with_capacity(entity.len());

                for (i, (name, value)) in entity.into_iter().enumerate() {
                    assignments.push(format!("#a{i} = :v{i}"));
                    request = request
                        .expression_attribute_names(format!("#a{i}"), name)
                        .expression_attribute_values(format!(":v{i}"), to_attribute_value(value));
                }

                // Nothing but the key: creates the row with only its key attributes
                if !assignments.is_empty() {
                    request = request.update_expression(format!("SET {}", assignments.join(", ")));
                }

                request
                    .send()
                    .await
                    .map_err(|e| ServiceError::Aws(format!("{e:?}")))?;
            }
        }

        Ok(())
    }

    async fn query_entities(&self, filter: &Filter) -> Result<Vec<RawEntity>, ServiceError> {
        let mut entities = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .db
                .scan()
                .table_name(&self.table_name)
                .filter_expression("#f = :v")
                .expression_attribute_names("#f", filter.field())
                .expression_attribute_values(":v", to_attribute_value(filter.value().clone()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| ServiceError::Aws(format!("{e:?}")))?;

            for item in output.items.unwrap_or_default() {
                entities.push(to_raw_entity(item)?);
            }

            start_key = output.last_evaluated_key;

            if start_key.is_none() {
                break;
            }
        }

        Ok(entities)
    }

    async fn delete_entity(&self, partition_key: &str, row_key: &str) -> Result<(), ServiceError> {
        self.db
            .delete_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(partition_key.to_string()))
            .key(ROW_KEY, AttributeValue::S(row_key.to_string()))
            .send()
            .await
            .map_err(|e| ServiceError::Aws(e.to_string()))?;

        Ok(())
    }
}

async fn table_status(db: &Client, table_name: &str) -> Result<Option<TableStatus>, ServiceError> {
    match db.describe_table().table_name(table_name).send().await {
        Ok(output) => Ok(output.table.and_then(|table| table.table_status)),
        Err(e)
            if e.as_service_error()
                .is_some_and(|e| e.is_resource_not_found_exception()) =>
        {
            Ok(None)
        }
        Err(e) => Err(ServiceError::Aws(format!("{e:?}"))),
    }
}

fn key_definition(name: &str) -> Result<AttributeDefinition, ServiceError> {
    AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| ServiceError::Aws(e.to_string()))
}

fn key_schema(name: &str, key_type: KeyType) -> Result<KeySchemaElement, ServiceError> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(|e| ServiceError::Aws(e.to_string()))
}

fn to_attribute_value(attribute: TableAttribute) -> AttributeValue {
    match attribute {
        TableAttribute::String(s) => AttributeValue::S(s),
        TableAttribute::Int(i) => AttributeValue::N(i.to_string()),
        TableAttribute::Double(d) => AttributeValue::N(d.to_string()),
        TableAttribute::Bool(b) => AttributeValue::Bool(b),
        TableAttribute::Timestamp(ts) => AttributeValue::M(HashMap::from([
            (EDM_TAG.to_string(), AttributeValue::S(EDM_DATETIME.to_string())),
            (
                EDM_VALUE.to_string(),
                AttributeValue::S(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            ),
        ])),
        TableAttribute::Null => AttributeValue::Null(true),
    }
}

fn to_raw_property(value: AttributeValue) -> Result<RawProperty, ServiceError> {
    match value {
        AttributeValue::S(s) => Ok(RawProperty::Value(TableAttribute::String(s))),
        AttributeValue::N(n) => {
            let edm_type = if n.parse::<i64>().is_ok() {
                EdmType::Int64
            } else {
                EdmType::Double
            };

            Ok(RawProperty::Tagged { edm_type, value: n })
        }
        AttributeValue::Bool(b) => Ok(RawProperty::Value(TableAttribute::Bool(b))),
        AttributeValue::Null(_) => Ok(RawProperty::Value(TableAttribute::Null)),
        AttributeValue::M(mut map)
            if matches!(map.get(EDM_TAG), Some(AttributeValue::S(tag)) if tag == EDM_DATETIME) =>
        {
            match map.remove(EDM_VALUE) {
                Some(AttributeValue::S(value)) => Ok(RawProperty::DateTime(value)),
                other => Err(ServiceError::Other(format!(
                    "Malformed DateTime attribute: {other:?}"
                ))),
            }
        }
        other => Err(ServiceError::Other(format!(
            "Unsupported DynamoDB attribute value: {other:?}"
        ))),
    }
}

fn to_raw_entity(item: HashMap<String, AttributeValue>) -> Result<RawEntity, ServiceError> {
    item.into_iter()
        .map(|(k, v)| to_raw_property(v).map(|raw| (k, raw)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_timestamp_round_trips_through_map() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

        let raw = to_raw_property(to_attribute_value(TableAttribute::Timestamp(ts))).unwrap();

        assert_eq!(raw, RawProperty::DateTime("2024-05-06T07:08:09Z".to_string()));
    }

    #[test]
    fn test_numbers_are_tagged() {
        assert_eq!(
            to_raw_property(AttributeValue::N("42".into())).unwrap(),
            RawProperty::Tagged {
                edm_type: EdmType::Int64,
                value: "42".into()
            }
        );
        assert_eq!(
            to_raw_property(AttributeValue::N("4.5".into())).unwrap(),
            RawProperty::Tagged {
                edm_type: EdmType::Double,
                value: "4.5".into()
            }
        );
    }

    #[test]
    fn test_unsupported_value() {
        let result = to_raw_property(AttributeValue::Ss(vec!["a".into()]));
        assert!(matches!(result, Err(ServiceError::Other(_))));
    }
}
