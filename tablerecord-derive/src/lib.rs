extern crate proc_macro2;
extern crate quote;
extern crate syn;

mod settings;
mod table_record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `tablerecord::traits::TableRecord` for a struct with named fields.
///
/// ```ignore
/// #[derive(TableRecord)]
/// #[table(name = "processrecords", partition = "process")]
/// struct ProcessRecord {
///     #[table(key)]
///     key: RecordKey,
///     file_name: String,
///     #[table(rename = "done")]
///     processed: bool,
///     #[table(skip)]
///     scratch: u32,
///     #[table(extra)]
///     extra: TableAttributes,
/// }
/// ```
#[proc_macro_derive(TableRecord, attributes(table))]
pub fn derive_table_record(input: TokenStream) -> TokenStream {
    table_record::derive_table_record(parse_macro_input!(input as DeriveInput))
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
