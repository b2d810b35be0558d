use crate::{
    table::TableAttributes,
    traits::{RecordError, RecordKey, RecordSchema},
    TableRecord,
};
use chrono::{DateTime, Utc};

/// A file queued for processing and whether it has been processed yet.
#[derive(Debug, Clone, PartialEq, TableRecord)]
#[table(name = "processrecords", partition = "process")]
pub struct ProcessRecord {
    #[table(key)]
    key: RecordKey,

    /// Path of the file in the file share
    pub file_name: String,
    pub queued_time: Option<DateTime<Utc>>,
    pub processed_time: Option<DateTime<Utc>>,
    pub processed: bool,

    /// Attributes found on a stored row that this type does not declare.
    /// They are written back on the next upsert.
    #[table(extra)]
    pub extra: TableAttributes,
}

impl ProcessRecord {
    /// A new, unprocessed record in the default table and partition.
    pub fn new() -> Result<Self, RecordError> {
        Ok(Self::with_key(Self::new_key()?))
    }

    /// A new record stored under a table and partition chosen at runtime.
    pub fn with_schema(schema: &RecordSchema) -> Result<Self, RecordError> {
        Ok(Self::with_key(schema.new_key()?))
    }

    pub fn with_key(key: RecordKey) -> Self {
        Self {
            key,
            file_name: String::new(),
            queued_time: None,
            processed_time: None,
            processed: false,
            extra: TableAttributes::new(),
        }
    }

    /// Mark the record processed at `when`.
    pub fn mark_processed(&mut self, when: DateTime<Utc>) {
        self.processed = true;
        self.processed_time = Some(when);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        table::TableAttribute,
        traits::{PARTITION_KEY, ROW_KEY, TABLE_NAME},
    };
    use chrono::TimeZone;

    #[test]
    fn test_schema() {
        let schema = ProcessRecord::schema();

        assert_eq!(schema.table_name(), "processrecords");
        assert_eq!(schema.partition_id(), "process");
        assert_eq!(
            ProcessRecord::declared_attributes(),
            &["file_name", "processed", "processed_time", "queued_time"]
        );
    }

    #[test]
    fn test_new_record_defaults() {
        let record = ProcessRecord::new().unwrap();

        assert_eq!(record.table_name(), "processrecords");
        assert_eq!(record.partition_key(), "process");
        assert!(!record.row_key().is_empty());
        assert!(!record.processed);
        assert_eq!(record.queued_time, None);
    }

    #[test]
    fn test_with_schema() {
        let schema = RecordSchema::new("otherrecords".to_string(), "batch-7".to_string());
        let record = ProcessRecord::with_schema(&schema).unwrap();

        assert_eq!(record.table_name(), "otherrecords");
        assert_eq!(record.partition_key(), "batch-7");
    }

    #[test]
    fn test_with_empty_schema_fails() {
        let schema = RecordSchema::new("", "batch-7");

        assert_eq!(
            ProcessRecord::with_schema(&schema),
            Err(RecordError::MissingTableName)
        );
    }

    #[test]
    fn test_to_attributes() {
        let queued = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        let mut record = ProcessRecord::new().unwrap();
        record.file_name = "test.txt".into();
        record.queued_time = Some(queued);

        let attributes = record.to_attributes();

        assert_eq!(attributes.len(), 6);
        assert_eq!(
            attributes.get(PARTITION_KEY),
            Some(&TableAttribute::from("process"))
        );
        assert_eq!(
            attributes.get(ROW_KEY),
            Some(&TableAttribute::from(record.row_key()))
        );
        assert_eq!(
            attributes.get("file_name"),
            Some(&TableAttribute::from("test.txt"))
        );
        assert_eq!(
            attributes.get("queued_time"),
            Some(&TableAttribute::Timestamp(queued))
        );
        assert_eq!(attributes.get("processed_time"), Some(&TableAttribute::Null));
        assert_eq!(attributes.get("processed"), Some(&TableAttribute::Bool(false)));
        assert!(!attributes.contains_key(TABLE_NAME));
    }

    #[test]
    fn test_round_trip() {
        let mut record = ProcessRecord::new().unwrap();
        record.file_name = "test.pdf".into();
        record.queued_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
        record.mark_processed(Utc.with_ymd_and_hms(2024, 3, 1, 9, 5, 0).unwrap());

        let rebuilt =
            ProcessRecord::from_entity("processrecords", record.to_attributes()).unwrap();

        assert_eq!(rebuilt, record);
    }

    #[test]
    fn test_from_entity_stamps_table_name() {
        let record = ProcessRecord::new().unwrap();

        let rebuilt = ProcessRecord::from_entity("archive", record.to_attributes()).unwrap();

        assert_eq!(rebuilt.table_name(), "archive");
        assert_eq!(rebuilt.row_key(), record.row_key());
    }

    #[test]
    fn test_from_entity_missing_fields_use_defaults() {
        let mut attributes = TableAttributes::new();
        attributes.insert("file_name", "partial.doc");

        let rebuilt = ProcessRecord::from_entity("processrecords", attributes).unwrap();

        assert_eq!(rebuilt.file_name, "partial.doc");
        assert_eq!(rebuilt.partition_key(), "process");
        assert!(!rebuilt.row_key().is_empty());
        assert!(!rebuilt.processed);
        assert_eq!(rebuilt.processed_time, None);
    }

    #[test]
    fn test_from_entity_keeps_undeclared_attributes() {
        let mut record = ProcessRecord::new().unwrap();
        record.file_name = "test.xls".into();

        let mut attributes = record.to_attributes();
        attributes.insert("retries", 3);
        attributes.insert(TABLE_NAME, "ignored");

        let rebuilt = ProcessRecord::from_entity("processrecords", attributes).unwrap();

        assert_eq!(rebuilt.extra.len(), 1);
        assert_eq!(rebuilt.extra.get("retries"), Some(&TableAttribute::Int(3)));
        assert_eq!(
            rebuilt.to_attributes().get("retries"),
            Some(&TableAttribute::Int(3))
        );
    }

    #[test]
    fn test_from_entity_list() {
        let first = ProcessRecord::new().unwrap();
        let second = ProcessRecord::new().unwrap();

        let rebuilt = ProcessRecord::from_entity_list(
            "processrecords",
            vec![first.to_attributes(), second.to_attributes()],
        )
        .unwrap();
        assert_eq!(rebuilt, first);

        let empty = ProcessRecord::from_entity_list("processrecords", vec![]);
        assert!(empty.is_err());
    }
}
