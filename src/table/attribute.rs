use crate::traits::ReadConversionError;
use chrono::{DateTime, Utc};

/// Trait for converting `TableAttribute` to `Self`
pub trait TryFromTableAttr: Sized {
    /// Try to convert `value` to `Self`
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError>;
}

/// A single scalar value as stored in a table row.
///
/// Rows are flat: there are no nested maps or lists.
#[derive(Clone, PartialEq, Debug)]
pub enum TableAttribute {
    String(String),
    Int(i64),
    Double(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),

    Null,
}

impl TableAttribute {
    /// Whether the value counts as "set" for query building.
    ///
    /// Zero and `Null` are falsy. Strings and booleans are always considered
    /// set, including `""` and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(i) => *i != 0,
            Self::Double(d) => *d != 0.0,
            Self::String(_) | Self::Bool(_) | Self::Timestamp(_) => true,
            Self::Null => false,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Int(_) => "Int",
            Self::Double(_) => "Double",
            Self::Bool(_) => "Bool",
            Self::Timestamp(_) => "Timestamp",
            Self::Null => "Null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Self::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// Equality that treats `Int` and `Double` as the same numeric domain.
    pub fn loosely_eq(&self, other: &TableAttribute) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Double(b)) | (Self::Double(b), Self::Int(a)) => *a as f64 == *b,
            _ => self == other,
        }
    }
}

fn conversion_failed<T>(value: &TableAttribute) -> ReadConversionError {
    ReadConversionError::ConversionFailed(format!(
        "{} from {}",
        std::any::type_name::<T>(),
        value.type_name()
    ))
}

macro_rules! impl_int_table_attr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for TableAttribute {
                fn from(value: $ty) -> Self {
                    TableAttribute::Int(i64::from(value))
                }
            }

            impl TryFromTableAttr for $ty {
                fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
                    let TableAttribute::Int(inner) = value else {
                        return Err(conversion_failed::<$ty>(&value));
                    };

                    <$ty>::try_from(inner).map_err(|_| {
                        ReadConversionError::ConversionFailed(format!(
                            "{} out of range: {inner}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

macro_rules! impl_simple_table_attr {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for TableAttribute {
                fn from(value: $ty) -> Self {
                    TableAttribute::$variant(value)
                }
            }
        )*
    };
}

impl_int_table_attr!(i8, i16, i32, i64, u8, u16, u32);

impl_simple_table_attr!(
    String => String,
    bool => Bool,
    f64 => Double,
    DateTime<Utc> => Timestamp,
);

impl From<f32> for TableAttribute {
    fn from(value: f32) -> Self {
        TableAttribute::Double(f64::from(value))
    }
}

impl From<&str> for TableAttribute {
    fn from(value: &str) -> Self {
        TableAttribute::String(value.to_string())
    }
}

impl<T> From<Option<T>> for TableAttribute
where
    T: Into<TableAttribute>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => TableAttribute::Null,
        }
    }
}

impl TryFromTableAttr for TableAttribute {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        Ok(value)
    }
}

impl TryFromTableAttr for String {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            TableAttribute::String(s) => Ok(s),
            other => Err(conversion_failed::<String>(&other)),
        }
    }
}

impl TryFromTableAttr for bool {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            TableAttribute::Bool(b) => Ok(b),
            other => Err(conversion_failed::<bool>(&other)),
        }
    }
}

impl TryFromTableAttr for f64 {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            TableAttribute::Double(d) => Ok(d),
            TableAttribute::Int(i) => Ok(i as f64),
            other => Err(conversion_failed::<f64>(&other)),
        }
    }
}

impl TryFromTableAttr for f32 {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        f64::try_from_table_attr(value).map(|d| d as f32)
    }
}

impl TryFromTableAttr for DateTime<Utc> {
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            TableAttribute::Timestamp(ts) => Ok(ts),
            // Rows written by other clients may hold timestamps as plain strings
            TableAttribute::String(s) => DateTime::parse_from_rfc3339(&s)
                .map(|ts| ts.with_timezone(&Utc))
                .map_err(|_| ReadConversionError::InvalidFormat(s)),
            other => Err(conversion_failed::<DateTime<Utc>>(&other)),
        }
    }
}

impl<T> TryFromTableAttr for Option<T>
where
    T: TryFromTableAttr,
{
    fn try_from_table_attr(value: TableAttribute) -> Result<Self, ReadConversionError> {
        match value {
            // Older rows store unset values as empty strings
            TableAttribute::Null => Ok(None),
            TableAttribute::String(ref s) if s.is_empty() => Ok(None),
            value => T::try_from_table_attr(value).map(Some),
        }
    }
}
