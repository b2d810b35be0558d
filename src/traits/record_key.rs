use super::{ReadConversionError, RecordError, TableRecord};
use crate::table::{TableAttribute, TableAttributes};
use uuid::Uuid;

/// Stored name of the partition key attribute.
pub const PARTITION_KEY: &str = "PartitionKey";
/// Stored name of the row key attribute.
pub const ROW_KEY: &str = "RowKey";
/// Name of the routing metadata that is never written to a row.
pub const TABLE_NAME: &str = "TableName";

/// Where a record lives: its table plus the partition and row keys that
/// together identify it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    table_name: String,
    partition_key: String,
    row_key: String,
}

impl RecordKey {
    /// Build a key, generating a random row key when none is supplied.
    pub fn new(
        partition_key: impl Into<String>,
        row_key: Option<String>,
        table_name: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let partition_key = partition_key.into();
        let table_name = table_name.into();

        if partition_key.is_empty() {
            return Err(RecordError::MissingPartitionKey);
        }

        if table_name.is_empty() {
            return Err(RecordError::MissingTableName);
        }

        let row_key = row_key
            .filter(|row_key| !row_key.is_empty())
            .unwrap_or_else(Self::generate_row_key);

        Ok(Self {
            table_name,
            partition_key,
            row_key,
        })
    }

    pub fn generate_row_key() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) {
        self.table_name = table_name.into();
    }

    pub fn set_partition_key(&mut self, partition_key: impl Into<String>) {
        self.partition_key = partition_key.into();
    }

    pub fn set_row_key(&mut self, row_key: impl Into<String>) {
        self.row_key = row_key.into();
    }

    /// Whether both halves of the primary key are present.
    pub fn is_addressable(&self) -> bool {
        !self.partition_key.is_empty() && !self.row_key.is_empty()
    }

    pub fn to_attributes(&self) -> TableAttributes {
        let mut attributes = TableAttributes::new();
        attributes.insert(PARTITION_KEY, self.partition_key.as_str());
        attributes.insert(ROW_KEY, self.row_key.as_str());
        attributes
    }

    /// Take the key attributes out of a row read from `table_name`.
    ///
    /// A missing partition key falls back to the schema's partition id and a
    /// missing row key is generated, as for a freshly constructed record.
    pub fn take_from_attributes<R: TableRecord>(
        table_name: &str,
        attributes: &mut TableAttributes,
    ) -> Result<Self, ReadConversionError> {
        // Routing metadata never belongs to the row
        attributes.remove(TABLE_NAME);

        let partition_key = match attributes.remove(PARTITION_KEY) {
            Some(value) => key_string(PARTITION_KEY, value)?,
            None => R::schema().partition_id().to_string(),
        };

        let row_key = match attributes.remove(ROW_KEY) {
            Some(value) => key_string(ROW_KEY, value)?,
            None => Self::generate_row_key(),
        };

        Ok(Self {
            table_name: table_name.to_string(),
            partition_key,
            row_key,
        })
    }
}

fn key_string(name: &str, value: TableAttribute) -> Result<String, ReadConversionError> {
    match value {
        TableAttribute::String(s) => Ok(s),
        TableAttribute::Null => Ok(String::new()),
        other => Err(ReadConversionError::ConversionFailed(format!(
            "{name} must be a String, got {}",
            other.type_name()
        ))),
    }
}
