use crate::settings::Settings;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

pub(crate) fn derive_table_record(input: DeriveInput) -> Result<TokenStream, syn::Error> {
    let settings = Settings::builder(&input)
        .container_attributes(&input)?
        .field_attributes(&input)?
        .build()?;

    let ident = settings.ident();
    let table_name = &settings.table_name;
    let partition_id = &settings.partition_id;
    let key_field = format_ident!("{}", settings.key_field);

    let stored_names = settings.stored_attributes();

    let to_attributes_impl = settings.attributes().iter().map(|attr| {
        let field = format_ident!("{}", attr.field);
        let stored = &attr.stored;

        quote! {
            attributes.insert(#stored, ::core::clone::Clone::clone(&self.#field));
        }
    });

    let extra_merge_impl = settings.extra_field.as_ref().map(|extra| {
        let extra = format_ident!("{extra}");

        quote! {
            attributes.extend_missing(::core::clone::Clone::clone(&self.#extra));
        }
    });

    let local = |field: &str| format_ident!("__tablerecord_{field}");

    let key_local = local(&settings.key_field);

    let take_fields_impl = settings.attributes().iter().map(|attr| {
        let local = local(&attr.field);
        let stored = &attr.stored;

        quote! {
            let #local = __attributes.take_or_default(#stored)?;
        }
    });

    let default_fields_impl = settings.skipped_attributes().into_iter().map(|field| {
        let local = local(field);

        quote! {
            let #local = ::core::default::Default::default();
        }
    });

    let remainder_impl = match &settings.extra_field {
        Some(extra) => {
            let local = local(extra);
            quote! { let #local = __attributes; }
        }
        None => quote! { __attributes.discard_undeclared::<Self>(); },
    };

    let struct_fields = settings
        .all_fields()
        .into_iter()
        .map(|field| {
            let field_ident = format_ident!("{field}");
            let local = local(field);
            quote! { #field_ident: #local }
        })
        .collect::<Vec<_>>();

    let expanded = quote! {
        #[automatically_derived]
        impl ::tablerecord::traits::TableRecord for #ident {
            #[inline]
            fn schema() -> ::tablerecord::traits::RecordSchema {
                ::tablerecord::traits::RecordSchema::new(#table_name, #partition_id)
            }

            #[inline]
            fn key(&self) -> &::tablerecord::RecordKey {
                &self.#key_field
            }

            #[inline]
            fn key_mut(&mut self) -> &mut ::tablerecord::RecordKey {
                &mut self.#key_field
            }

            fn declared_attributes() -> &'static [&'static str] {
                &[#(#stored_names,)*]
            }

            fn to_attributes(&self) -> ::tablerecord::TableAttributes {
                let mut attributes = self.#key_field.to_attributes();

                #(#to_attributes_impl)*
                #extra_merge_impl

                attributes
            }

            fn from_attributes(
                table_name: &str,
                mut __attributes: ::tablerecord::TableAttributes,
            ) -> ::core::result::Result<Self, ::tablerecord::traits::ReadConversionError> {
                let #key_local = ::tablerecord::RecordKey::take_from_attributes::<Self>(
                    table_name,
                    &mut __attributes,
                )?;

                #(#take_fields_impl)*
                #(#default_fields_impl)*
                #remainder_impl

                Ok(Self {
                    #(#struct_fields,)*
                })
            }
        }
    };

    Ok(expanded)
}
