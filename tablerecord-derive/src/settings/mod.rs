mod builder;
use self::builder::SettingsBuilder;
use itertools::Itertools;
use proc_macro2::Ident;
use syn::DeriveInput;

pub(crate) enum AttributeMode {
    Stored { rename: Option<String> },
    Key,
    Skipped,
    Extra,
}

/// A field that is written to and read from the table.
pub(crate) struct StoredAttribute {
    pub(crate) field: String,
    pub(crate) stored: String,
}

pub(crate) struct Settings {
    ident: Ident,
    pub(crate) table_name: String,
    pub(crate) partition_id: String,
    pub(crate) key_field: String,
    attributes: Vec<StoredAttribute>,

    /// Skipped attributes are never stored; `from_attributes` rebuilds them
    /// via `Default` (like serde).
    skipped_attributes: Vec<String>,
    pub(crate) extra_field: Option<String>,

    /// Every field name in declaration order.
    fields: Vec<String>,
}

impl Settings {
    pub(crate) fn builder(input: &DeriveInput) -> SettingsBuilder {
        SettingsBuilder::new(input)
    }

    pub(crate) fn ident(&self) -> &Ident {
        &self.ident
    }

    pub(crate) fn attributes(&self) -> &[StoredAttribute] {
        &self.attributes
    }

    /// Stored attribute names, sorted to keep the generated output stable.
    pub(crate) fn stored_attributes(&self) -> Vec<&str> {
        self.attributes
            .iter()
            .map(|attr| attr.stored.as_str())
            .sorted()
            .collect()
    }

    pub(crate) fn skipped_attributes(&self) -> Vec<&str> {
        self.skipped_attributes
            .iter()
            .map(|s| s.as_str())
            .sorted()
            .collect()
    }

    pub(crate) fn all_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|s| s.as_str()).collect()
    }
}
