use crate::table::{TableAttribute, TableAttributes};
use chrono::SecondsFormat;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("eq"),
        }
    }
}

/// A single-predicate filter over one attribute.
///
/// `Display` renders it in the table service filter syntax, for example
/// `processed eq false` or `file_name eq 'test.txt'`. Backends that speak a
/// different dialect read the field and value directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    operator: Operator,
    value: TableAttribute,
}

impl Filter {
    /// Build `field eq value`.
    ///
    /// Returns `None` if `field` is empty or `value` is a zero number or
    /// `Null`. Strings and booleans always produce a filter, so `""` renders
    /// as `field eq ''`.
    pub fn eq(field: impl Into<String>, value: impl Into<TableAttribute>) -> Option<Self> {
        let field = field.into();
        let value = value.into();

        if field.is_empty() || !value.is_truthy() {
            return None;
        }

        Some(Self {
            field,
            operator: Operator::Eq,
            value,
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &TableAttribute {
        &self.value
    }

    /// Evaluate the filter against a row.
    pub fn matches(&self, attributes: &TableAttributes) -> bool {
        match self.operator {
            Operator::Eq => attributes
                .get(&self.field)
                .is_some_and(|value| value.loosely_eq(&self.value)),
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.operator)?;

        match &self.value {
            TableAttribute::Bool(b) => write!(f, "{b}"),
            TableAttribute::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            TableAttribute::Int(i) => write!(f, "{i}"),
            // Debug keeps the decimal point on whole numbers
            TableAttribute::Double(d) => write!(f, "{d:?}"),
            TableAttribute::Timestamp(ts) => write!(
                f,
                "datetime'{}'",
                ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
            ),
            TableAttribute::Null => f.write_str("null"),
        }
    }
}

/// Build an equality query for `field`, see [`Filter::eq`].
pub fn build_equality_query(
    field: impl Into<String>,
    value: impl Into<TableAttribute>,
) -> Option<Filter> {
    Filter::eq(field, value)
}
