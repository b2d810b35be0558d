#![allow(dead_code)]

use tablerecord::{MemoryTableService, StoreConfig, TableStore};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn memory_store() -> (TableStore<MemoryTableService>, MemoryTableService) {
    init_logging();

    let service = MemoryTableService::new();
    (TableStore::new(service.clone()), service)
}

/// Config for a DynamoDB Local instance on the default port.
pub fn local_config() -> StoreConfig {
    StoreConfig::builder()
        .endpoint_url("http://localhost:8000")
        .region("us-east-1")
        .with_env()
        .build()
        .expect("Failed to build config")
}

#[macro_export]
macro_rules! assert_err {
    ($cond:expr,) => {
        $crate::assert_err!($cond);
    };
    ($cond:expr) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?})", t);
            },
            Err(e) => e,
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        match $cond {
            Ok(t) => {
                panic!("assertion failed, expected Err(..), got Ok({:?}): {}", t, format_args!($($arg)+));
            },
            Err(e) => e,
        }
    };
}
