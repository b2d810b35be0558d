mod record_key;
pub use record_key::*;

use crate::table::TableAttributes;
pub use crate::table::{TableAttribute, TryFromTableAttr};

use std::{borrow::Cow, fmt::Debug};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadConversionError {
    #[error("Missing attribute: {0}")]
    NoSuchAttribute(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Failed to convert attribute: {0}")]
    ConversionFailed(String),
    #[error("Expected at least one entity to reconstruct a record from")]
    EmptyEntityList,
}

/// Error returned when a record is constructed without the keys it needs
/// to be stored.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("partition_key cannot be empty")]
    MissingPartitionKey,
    #[error("table_name cannot be empty")]
    MissingTableName,
}

/// Static description of where a record type lives: every instance of the
/// type shares its table name and default partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    table_name: Cow<'static, str>,
    partition_id: Cow<'static, str>,
}

impl RecordSchema {
    pub fn new(
        table_name: impl Into<Cow<'static, str>>,
        partition_id: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            partition_id: partition_id.into(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_id(&self) -> &str {
        &self.partition_id
    }

    /// Build a key in this schema's table and partition with a fresh row key.
    pub fn new_key(&self) -> Result<RecordKey, RecordError> {
        RecordKey::new(self.partition_id(), None, self.table_name())
    }
}

/// A record that can be written to and read back from a table.
///
/// Usually derived with `#[derive(TableRecord)]`.
pub trait TableRecord: Debug + Sized {
    fn schema() -> RecordSchema;

    fn key(&self) -> &RecordKey;

    fn key_mut(&mut self) -> &mut RecordKey;

    /// Stored names of the fields this type declares, excluding the key.
    fn declared_attributes() -> &'static [&'static str];

    /// Flatten the record into the attribute map sent to storage.
    ///
    /// Contains `PartitionKey`, `RowKey` and every declared field but never
    /// the table name.
    fn to_attributes(&self) -> TableAttributes;

    /// Rebuild a record from a row. Declared fields missing from the row
    /// take their `Default` value.
    fn from_attributes(
        table_name: &str,
        attributes: TableAttributes,
    ) -> Result<Self, ReadConversionError>;

    fn new_key() -> Result<RecordKey, RecordError> {
        Self::schema().new_key()
    }

    fn table_name(&self) -> &str {
        self.key().table_name()
    }

    fn partition_key(&self) -> &str {
        self.key().partition_key()
    }

    fn row_key(&self) -> &str {
        self.key().row_key()
    }

    fn from_entity(
        table_name: &str,
        attributes: impl Into<TableAttributes>,
    ) -> Result<Self, ReadConversionError> {
        Self::from_attributes(table_name, attributes.into())
    }

    /// Rebuild a record from the first of a list of rows.
    fn from_entity_list(
        table_name: &str,
        entities: Vec<TableAttributes>,
    ) -> Result<Self, ReadConversionError> {
        let first = entities
            .into_iter()
            .next()
            .ok_or(ReadConversionError::EmptyEntityList)?;

        Self::from_attributes(table_name, first)
    }
}
