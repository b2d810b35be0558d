use super::{AttributeMode, Settings, StoredAttribute};
use proc_macro2::{Ident, Span};
use syn::{Data, DeriveInput, Fields, LitStr};

/// Names owned by the record key or used for routing.
const RESERVED_ATTRIBUTE_NAMES: &[&str] = &["PartitionKey", "RowKey", "TableName"];

pub(crate) struct SettingsBuilder {
    ident: Ident,
    type_name: String,
    table_name: Option<String>,
    partition_id: Option<String>,
    key_field: Option<String>,
    attributes: Vec<StoredAttribute>,
    skipped_attributes: Vec<String>,
    extra_field: Option<String>,
    fields: Vec<String>,
}

impl SettingsBuilder {
    pub(crate) fn new(input: &DeriveInput) -> Self {
        let type_name = input.ident.to_string().to_lowercase();

        Self {
            ident: input.ident.clone(),
            type_name,
            table_name: None,
            partition_id: None,
            key_field: None,
            attributes: Vec::new(),
            skipped_attributes: Vec::new(),
            extra_field: None,
            fields: Vec::new(),
        }
    }

    pub(crate) fn container_attributes(
        mut self,
        DeriveInput { attrs, .. }: &DeriveInput,
    ) -> Result<Self, syn::Error> {
        for attr in attrs {
            if attr.path().is_ident("table") {
                attr.parse_nested_meta(|meta| {
                    let ident = meta.path.get_ident().map(|i| i.to_string());
                    match ident.as_deref() {
                        Some("name") => {
                            let value = meta.value()?.parse::<LitStr>()?;
                            self.table_name = Some(Self::non_empty(value, "table name")?);
                            Ok(())
                        }
                        Some("partition") => {
                            let value = meta.value()?.parse::<LitStr>()?;
                            self.partition_id = Some(Self::non_empty(value, "partition")?);
                            Ok(())
                        }
                        _ => Err(meta.error("unsupported attribute")),
                    }
                })?;
            }
        }

        Ok(self)
    }

    pub(crate) fn field_attributes(
        mut self,
        DeriveInput { data, ident, .. }: &DeriveInput,
    ) -> Result<Self, syn::Error> {
        let Data::Struct(data_struct) = data else {
            return Err(syn::Error::new_spanned(
                ident,
                "TableRecord can only be derived for structs",
            ));
        };

        let Fields::Named(fields_named) = &data_struct.fields else {
            return Err(syn::Error::new_spanned(
                ident,
                "TableRecord can only be derived for structs with named fields",
            ));
        };

        for field in &fields_named.named {
            let field_name = field
                .ident
                .as_ref()
                .ok_or_else(|| {
                    syn::Error::new_spanned(field, "internal error: identifier was not Some")
                })?
                .to_string();

            let mut mode = AttributeMode::Stored { rename: None };

            for attr in &field.attrs {
                if !attr.path().is_ident("table") {
                    continue;
                }

                attr.parse_nested_meta(|meta| {
                    let directive = meta.path.get_ident().map(|i| i.to_string());
                    match directive.as_deref() {
                        Some("key") => {
                            mode = AttributeMode::Key;
                            Ok(())
                        }
                        Some("skip") => {
                            // Don't store this field at all
                            mode = AttributeMode::Skipped;
                            Ok(())
                        }
                        Some("extra") => {
                            mode = AttributeMode::Extra;
                            Ok(())
                        }
                        Some("rename") => {
                            let value = meta.value()?.parse::<LitStr>()?;
                            mode = AttributeMode::Stored {
                                rename: Some(Self::non_empty(value, "rename")?),
                            };
                            Ok(())
                        }
                        _ => Err(meta.error("unsupported field attribute")),
                    }
                })?;
            }

            self.add_field(field, field_name, mode)?;
        }

        Ok(self)
    }

    pub(crate) fn build(self) -> Result<Settings, syn::Error> {
        let SettingsBuilder {
            ident,
            type_name,
            table_name,
            partition_id,
            key_field,
            attributes,
            skipped_attributes,
            extra_field,
            fields,
        } = self;

        let key_field = key_field.ok_or_else(|| {
            syn::Error::new(
                Span::call_site(),
                "Missing required field attribute for TableRecord: #[table(key)]",
            )
        })?;

        let table_name = table_name.unwrap_or_else(|| type_name.clone());
        let partition_id = partition_id.unwrap_or(type_name);

        Ok(Settings {
            ident,
            table_name,
            partition_id,
            key_field,
            attributes,
            skipped_attributes,
            extra_field,
            fields,
        })
    }

    fn add_field(
        &mut self,
        field: &syn::Field,
        field_name: String,
        mode: AttributeMode,
    ) -> Result<(), syn::Error> {
        match mode {
            AttributeMode::Key => {
                if let Some(f) = &self.key_field {
                    return Err(syn::Error::new_spanned(
                        field,
                        format!("record key was already specified to be '{f}'"),
                    ));
                }
                self.key_field = Some(field_name.clone());
            }
            AttributeMode::Extra => {
                if let Some(f) = &self.extra_field {
                    return Err(syn::Error::new_spanned(
                        field,
                        format!("extra attributes field was already specified to be '{f}'"),
                    ));
                }
                self.extra_field = Some(field_name.clone());
            }
            AttributeMode::Skipped => self.skipped_attributes.push(field_name.clone()),
            AttributeMode::Stored { rename } => {
                let stored = rename.unwrap_or_else(|| field_name.clone());

                if RESERVED_ATTRIBUTE_NAMES.contains(&stored.as_str()) {
                    return Err(syn::Error::new_spanned(
                        field,
                        format!("Invalid attribute '{stored}': name is reserved for internal use"),
                    ));
                }

                if self.attributes.iter().any(|attr| attr.stored == stored) {
                    return Err(syn::Error::new_spanned(
                        field,
                        format!("Attribute '{stored}' has been defined more than once"),
                    ));
                }

                self.attributes.push(StoredAttribute {
                    field: field_name.clone(),
                    stored,
                });
            }
        }

        self.fields.push(field_name);

        Ok(())
    }

    fn non_empty(value: LitStr, what: &str) -> Result<String, syn::Error> {
        let v = value.value();
        if v.is_empty() {
            Err(syn::Error::new(value.span(), format!("{what} must not be empty")))
        } else {
            Ok(v)
        }
    }
}
