use super::{TableAttribute, TryFromTableAttr};
use crate::traits::{ReadConversionError, TableRecord};
use itertools::Itertools;
use log::debug;
use std::collections::HashMap;

/// Represents the flat attribute map of a table row.
/// Attributes are stored as a map of `String` to `TableAttribute`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableAttributes(HashMap<String, TableAttribute>);

impl TableAttributes {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<TableAttribute>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&TableAttribute> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<TableAttribute> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TableAttribute)> {
        self.0.iter()
    }

    /// Copy every attribute from `other` whose key is not already present.
    /// Existing values win.
    pub fn extend_missing(&mut self, other: Self) {
        for (key, value) in other.0 {
            self.0.entry(key).or_insert(value);
        }
    }

    /// Overwrite attributes with those in `other`.
    pub fn merge(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Remove `key` and convert it to `T`.
    ///
    /// An absent key yields `T::default()`, as do `Null` and `""` for types
    /// that cannot represent them.
    pub fn take_or_default<T>(&mut self, key: &str) -> Result<T, ReadConversionError>
    where
        T: TryFromTableAttr + Default,
    {
        match self.0.remove(key) {
            None => Ok(T::default()),
            Some(value @ TableAttribute::Null) => {
                Ok(T::try_from_table_attr(value).unwrap_or_default())
            }
            Some(TableAttribute::String(s)) if s.is_empty() => {
                Ok(T::try_from_table_attr(TableAttribute::String(s)).unwrap_or_default())
            }
            Some(value) => T::try_from_table_attr(value).map_err(|e| {
                ReadConversionError::ConversionFailed(format!("attribute '{key}': {e}"))
            }),
        }
    }

    /// Drop whatever is left after a record has taken its declared fields.
    pub fn discard_undeclared<R: TableRecord>(self) {
        if !self.is_empty() {
            debug!(
                "Ignoring undeclared attributes for {}: {}",
                std::any::type_name::<R>(),
                self.keys().sorted().join(",")
            );
        }
    }
}

impl From<HashMap<String, TableAttribute>> for TableAttributes {
    fn from(map: HashMap<String, TableAttribute>) -> Self {
        Self(map)
    }
}

impl<K, V> FromIterator<(K, V)> for TableAttributes
where
    K: Into<String>,
    V: Into<TableAttribute>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for TableAttributes {
    type Item = (String, TableAttribute);
    type IntoIter = std::collections::hash_map::IntoIter<String, TableAttribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
