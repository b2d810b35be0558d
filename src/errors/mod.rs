use thiserror::Error;

pub use crate::{
    config::ConfigError,
    service::ServiceError,
    traits::{ReadConversionError, RecordError},
};

/// Error returned when a table cannot be confirmed to exist, even after
/// trying to create it
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table {0} not found")]
    NotFound(String),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
}

/// Error returned by [`TableStore::add_or_update`](crate::TableStore::add_or_update)
#[derive(Error, Debug)]
pub enum PutError {
    #[error("TableError: {0}")]
    Table(#[from] TableError),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
}

/// Error returned by [`TableStore::search`](crate::TableStore::search) when
/// the table or the query fails
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("TableError: {0}")]
    Table(#[from] TableError),
    #[error("ServiceError: {0}")]
    Service(#[from] ServiceError),
}

/// Error returned by [`TableStore::delete_many`](crate::TableStore::delete_many).
///
/// Failures of individual deletes are reported in the
/// [`DeleteReport`](crate::DeleteReport) instead.
#[derive(Error, Debug)]
pub enum DeleteError {
    #[error("TableError: {0}")]
    Table(#[from] TableError),
}

/// Error abstracting all errors returned by `tablerecord`.
///
/// If you use this error you can use `?` to convert from other `tablerecord` errors to
/// this one.
#[derive(Error, Debug)]
pub enum Error {
    #[error("RecordError: {0}")]
    RecordError(#[from] RecordError),
    #[error("ConfigError: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("TableError: {0}")]
    TableError(#[from] TableError),
    #[error("PutError: {0}")]
    PutError(#[from] PutError),
    #[error("SearchError: {0}")]
    SearchError(#[from] SearchError),
    #[error("DeleteError: {0}")]
    DeleteError(#[from] DeleteError),
    #[error("ReadConversionError: {0}")]
    ReadConversionError(#[from] ReadConversionError),
}
