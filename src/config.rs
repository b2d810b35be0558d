//! Backend configuration.

use std::env;
use thiserror::Error;

const ENDPOINT_URL_VAR: &str = "TABLERECORD_ENDPOINT_URL";
const REGION_VAR: &str = "TABLERECORD_REGION";
const READ_CAPACITY_VAR: &str = "TABLERECORD_READ_CAPACITY";
const WRITE_CAPACITY_VAR: &str = "TABLERECORD_WRITE_CAPACITY";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
    #[error("Read and write capacity must be set together")]
    PartialCapacity,
}

/// Provisioned throughput for tables created by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub read: i64,
    pub write: i64,
}

/// Where and how to reach the table service.
///
/// Credentials are not part of the config; the backend picks them up from
/// its own credential chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    endpoint_url: Option<String>,
    region: Option<String>,
    capacity: Option<Capacity>,
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Provisioned capacity for new tables. `None` means on-demand billing.
    pub fn capacity(&self) -> Option<Capacity> {
        self.capacity
    }
}

#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    endpoint_url: Option<String>,
    region: Option<String>,
    read_capacity: Option<i64>,
    write_capacity: Option<i64>,
    env_error: Option<ConfigError>,
}

impl StoreConfigBuilder {
    pub fn endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn capacity(mut self, read: i64, write: i64) -> Self {
        self.read_capacity = Some(read);
        self.write_capacity = Some(write);
        self
    }

    /// Fill unset values from `TABLERECORD_*` environment variables.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&'static str) -> Option<String>) -> Self {
        if self.endpoint_url.is_none() {
            self.endpoint_url = var(ENDPOINT_URL_VAR);
        }

        if self.region.is_none() {
            self.region = var(REGION_VAR);
        }

        for (name, slot) in [
            (READ_CAPACITY_VAR, &mut self.read_capacity),
            (WRITE_CAPACITY_VAR, &mut self.write_capacity),
        ] {
            if slot.is_some() {
                continue;
            }

            if let Some(value) = var(name) {
                match value.parse::<i64>() {
                    Ok(parsed) if parsed > 0 => *slot = Some(parsed),
                    _ => {
                        self.env_error
                            .get_or_insert(ConfigError::InvalidValue { name, value });
                    }
                }
            }
        }

        self
    }

    pub fn build(self) -> Result<StoreConfig, ConfigError> {
        if let Some(error) = self.env_error {
            return Err(error);
        }

        let capacity = match (self.read_capacity, self.write_capacity) {
            (Some(read), Some(write)) => Some(Capacity { read, write }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCapacity),
        };

        Ok(StoreConfig {
            endpoint_url: self.endpoint_url,
            region: self.region,
            capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
        let map: HashMap<&'static str, String> =
            pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::builder().build().unwrap();

        assert_eq!(config.endpoint_url(), None);
        assert_eq!(config.region(), None);
        assert_eq!(config.capacity(), None);
    }

    #[test]
    fn test_env_values() {
        let config = StoreConfig::builder()
            .with_vars(vars(&[
                (ENDPOINT_URL_VAR, "http://localhost:8000"),
                (REGION_VAR, "us-east-1"),
                (READ_CAPACITY_VAR, "5"),
                (WRITE_CAPACITY_VAR, "10"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.endpoint_url(), Some("http://localhost:8000"));
        assert_eq!(config.region(), Some("us-east-1"));
        assert_eq!(config.capacity(), Some(Capacity { read: 5, write: 10 }));
    }

    #[test]
    fn test_explicit_values_win_over_env() {
        let config = StoreConfig::builder()
            .region("ap-southeast-2")
            .with_vars(vars(&[(REGION_VAR, "us-east-1")]))
            .build()
            .unwrap();

        assert_eq!(config.region(), Some("ap-southeast-2"));
    }

    #[test]
    fn test_invalid_capacity() {
        let result = StoreConfig::builder()
            .with_vars(vars(&[(READ_CAPACITY_VAR, "lots"), (WRITE_CAPACITY_VAR, "5")]))
            .build();

        assert_eq!(
            result,
            Err(ConfigError::InvalidValue {
                name: READ_CAPACITY_VAR,
                value: "lots".to_string()
            })
        );
    }

    #[test]
    fn test_partial_capacity() {
        let result = StoreConfig::builder()
            .with_vars(vars(&[(WRITE_CAPACITY_VAR, "5")]))
            .build();

        assert_eq!(result, Err(ConfigError::PartialCapacity));
    }
}
