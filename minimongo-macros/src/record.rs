use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{ext::IdentExt, parse_quote, DataStruct, DeriveInput, Fields, LitStr, Path, Result};

pub(crate) fn generate_record_for_struct(ast: &DeriveInput, data: &DataStruct) -> Result<TokenStream> {
    let name = &ast.ident;

    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            format!(
                "Cannot derive Record for generic struct '{}': the field table is cached per concrete type.",
                name
            ),
        ));
    }

    let mut krate: Path = parse_quote!(::minimongo_core);

    for attr in &ast.attrs {
        if attr.path().is_ident("record") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("crate") {
                    let value: LitStr = meta.value()?.parse()?;
                    krate = value.parse()?;
                    Ok(())
                } else {
                    Err(meta.error("Unknown record attribute"))
                }
            })?;
        }
    }

    let fields = match &data.fields {
        Fields::Named(named) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                ast,
                format!(
                    "Cannot derive Record for '{}': only structs with named fields are supported.",
                    name
                ),
            ))
        }
    };

    let mut getters = Vec::with_capacity(fields.len());
    let mut accessors = Vec::with_capacity(fields.len());

    for (position, field) in fields.iter().enumerate() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        let mut skip = false;
        let mut via_serde = false;

        for attr in &field.attrs {
            if attr.path().is_ident("record") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("skip") {
                        skip = true;
                        Ok(())
                    } else if meta.path.is_ident("serde") {
                        via_serde = true;
                        Ok(())
                    } else {
                        Err(meta.error("Unknown record field attribute"))
                    }
                })?;
            }
        }

        if skip {
            continue;
        }

        let key = ident.unraw().to_string();
        let get = format_ident!("__get_{}", position);
        let get_mut = format_ident!("__get_mut_{}", position);

        let read = if via_serde {
            quote! { #krate::value::serialized(&record.#ident) }
        } else {
            quote! { #krate::value::FieldValue::to_value(&record.#ident) }
        };

        getters.push(quote! {
            fn #get(record: &#name) -> #krate::value::Value<'_> {
                #read
            }

            fn #get_mut(record: &mut #name) -> &mut dyn ::std::any::Any {
                &mut record.#ident
            }
        });

        accessors.push(quote! {
            #krate::record::FieldAccessor::new(#key, #get, #get_mut)
        });
    }

    Ok(quote! {
        impl #krate::record::Record for #name {
            fn field_table() -> &'static #krate::record::FieldTable<Self> {
                static TABLE: ::std::sync::OnceLock<#krate::record::FieldTable<#name>> =
                    ::std::sync::OnceLock::new();

                TABLE.get_or_init(|| {
                    #(#getters)*

                    #krate::record::FieldTable::new(::std::vec![#(#accessors),*])
                })
            }
        }

        impl #krate::record::RecordSlot for #name {
            type Record = #name;

            fn from_record(record: #name) -> Self {
                record
            }

            fn into_record(self) -> ::std::option::Option<#name> {
                ::std::option::Option::Some(self)
            }
        }
    })
}
