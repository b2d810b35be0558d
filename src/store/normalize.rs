use crate::{
    service::{EdmType, RawEntity, RawProperty},
    table::{TableAttribute, TableAttributes},
    traits::ReadConversionError,
};
use chrono::{DateTime, Utc};
use std::str::FromStr;

/// Strip the service's typed wrappers from a row.
pub(crate) fn normalize_entity(raw: RawEntity) -> Result<TableAttributes, ReadConversionError> {
    raw.into_iter()
        .map(|(key, property)| normalize_property(&key, property).map(|value| (key, value)))
        .collect::<Result<Vec<_>, _>>()
        .map(|pairs| pairs.into_iter().collect())
}

fn normalize_property(
    key: &str,
    property: RawProperty,
) -> Result<TableAttribute, ReadConversionError> {
    match property {
        RawProperty::Value(value) => Ok(value),
        RawProperty::DateTime(value) => parse_datetime(key, &value).map(TableAttribute::Timestamp),
        RawProperty::Tagged { edm_type, value } => match edm_type {
            EdmType::String | EdmType::Guid => Ok(TableAttribute::String(value)),
            EdmType::Boolean => parse(key, &value).map(TableAttribute::Bool),
            EdmType::Int32 | EdmType::Int64 => parse(key, &value).map(TableAttribute::Int),
            EdmType::Double => parse(key, &value).map(TableAttribute::Double),
            EdmType::DateTime => parse_datetime(key, &value).map(TableAttribute::Timestamp),
        },
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ReadConversionError> {
    value
        .parse()
        .map_err(|_| ReadConversionError::InvalidFormat(format!("{key}: {value}")))
}

fn parse_datetime(key: &str, value: &str) -> Result<DateTime<Utc>, ReadConversionError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| ReadConversionError::InvalidFormat(format!("{key}: {value}")))
}
