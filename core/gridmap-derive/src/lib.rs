//! gridmap Derive — procedural macros for gridmap.
//!
//! Provides `#[derive(Entity)]` mapping a struct to entity key metadata and tuples.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derive macro implementing `gridmap_core::api::Entity`.
///
/// # Example
///
/// ```ignore
/// #[derive(Entity)]
/// #[gridmap(table = "users")]
/// pub struct User {
///     #[gridmap(id)]
///     pub id: i64,
///     #[gridmap(column = "user_name")]
///     pub name: String,
///     pub email: Option<String>,
/// }
/// ```
///
/// Generates:
/// - `TABLE_NAME` constant
/// - `Entity` trait implementation; the key metadata is built once per type
#[proc_macro_derive(Entity, attributes(gridmap))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct FieldMapping<'a> {
    ident: &'a syn::Ident,
    column: String,
    is_id: bool,
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Entity cannot be derived for generic structs",
        ));
    }
    let table_name = extract_table_name(input)?.unwrap_or_else(|| name.to_string().to_lowercase());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Entity can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Entity can only be derived for structs",
            ));
        }
    };

    let mut mappings = Vec::with_capacity(fields.len());
    for field in fields {
        // named fields always carry an ident
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let mut mapping = FieldMapping {
            ident,
            column: ident.to_string(),
            is_id: false,
        };
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("gridmap")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    mapping.is_id = true;
                    Ok(())
                } else if meta.path.is_ident("column") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    mapping.column = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("expected `id` or `column = \"...\"`"))
                }
            })?;
        }
        mappings.push(mapping);
    }

    let ids: Vec<&FieldMapping> = mappings.iter().filter(|m| m.is_id).collect();
    if ids.is_empty() {
        return Err(syn::Error::new_spanned(
            name,
            "Entity needs at least one field marked #[gridmap(id)]",
        ));
    }

    let id_columns = ids.iter().map(|m| &m.column);
    let id_values = ids.iter().map(|m| {
        let ident = m.ident;
        quote! { ::gridmap_core::api::IntoValue::to_value(&self.#ident) }
    });
    let puts = mappings.iter().map(|m| {
        let ident = m.ident;
        let column = &m.column;
        quote! { tuple.put(#column, ::gridmap_core::api::IntoValue::to_value(&self.#ident)); }
    });
    let reads = mappings.iter().map(|m| {
        let ident = m.ident;
        let column = &m.column;
        quote! { #ident: ::gridmap_core::api::FromValue::from_value(tuple.get(#column))? }
    });

    Ok(quote! {
        impl #name {
            pub const TABLE_NAME: &'static str = #table_name;
        }

        impl ::gridmap_core::api::Entity for #name {
            fn entity_key_metadata() -> ::std::sync::Arc<::gridmap_core::model::EntityKeyMetadata> {
                static METADATA: ::std::sync::OnceLock<
                    ::std::sync::Arc<::gridmap_core::model::EntityKeyMetadata>,
                > = ::std::sync::OnceLock::new();
                METADATA
                    .get_or_init(|| {
                        ::std::sync::Arc::new(::gridmap_core::model::EntityKeyMetadata::new(
                            #table_name,
                            [#(#id_columns),*],
                        ))
                    })
                    .clone()
            }

            fn entity_key(&self) -> ::gridmap_core::error::GridResult<::gridmap_core::model::EntityKey> {
                ::gridmap_core::model::EntityKey::new(
                    <Self as ::gridmap_core::api::Entity>::entity_key_metadata(),
                    [#(#id_values),*],
                )
            }

            fn to_tuple(&self) -> ::gridmap_core::model::Tuple {
                let mut tuple = ::gridmap_core::model::Tuple::new();
                #(#puts)*
                tuple
            }

            fn from_tuple(
                tuple: &::gridmap_core::model::Tuple,
            ) -> ::gridmap_core::error::GridResult<Self> {
                Ok(Self {
                    #(#reads),*
                })
            }
        }
    })
}

fn extract_table_name(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut table = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("gridmap")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("table") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                table = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `table = \"...\"`"))
            }
        })?;
    }
    Ok(table)
}
