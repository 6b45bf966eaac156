//! Descriptor code generation.
//!
//! Emits a `Mappable` impl whose descriptor is built once behind a
//! `LazyLock` and shared on every call. All paths go through the
//! `rowmap` facade crate.

use proc_macro2::TokenStream;
use quote::quote;

use super::parse::{EntityDef, FieldDef, NamingArg};

/// Generate the `Mappable` impl for a parsed entity.
pub fn generate(entity: &EntityDef) -> TokenStream {
    let ident = &entity.ident;
    let builder = builder_chain(entity);

    quote! {
        impl ::rowmap::Mappable for #ident {
            fn descriptor() -> ::std::sync::Arc<::rowmap::TypeDescriptor> {
                static DESCRIPTOR: ::std::sync::LazyLock<
                    ::std::sync::Arc<::rowmap::TypeDescriptor>,
                > = ::std::sync::LazyLock::new(|| #builder);
                ::std::sync::Arc::clone(&DESCRIPTOR)
            }
        }
    }
}

fn builder_chain(entity: &EntityDef) -> TokenStream {
    let ident = &entity.ident;
    let mut chain = quote! { ::rowmap::TypeDescriptor::builder::<#ident>() };

    // Direct settings come before bundles so explicit keys win during
    // marker resolution.
    if let Some(naming) = entity.naming {
        let case = naming_tokens(naming);
        chain.extend(quote! { .with_naming(#case) });
    }
    if entity.ignore_case {
        chain.extend(quote! { .with_ignore_case() });
    }
    if entity.map_all {
        chain.extend(quote! { .with_map_all_fields() });
    }
    if let Some(factory) = &entity.factory {
        chain.extend(quote! { .with_factory(::rowmap::mapper_factory::<#factory>()) });
    }
    for bundle in &entity.bundles {
        chain.extend(quote! { .with_bundle(#bundle) });
    }
    for tag in &entity.tags {
        chain.extend(quote! { .with_tag(#tag) });
    }
    for field in &entity.fields {
        let tokens = field_tokens(entity, field);
        chain.extend(quote! { .field(#tokens) });
    }
    chain.extend(quote! { .build() });
    chain
}

fn field_tokens(entity: &EntityDef, field: &FieldDef) -> TokenStream {
    let entity_ident = &entity.ident;
    let ident = &field.ident;
    let name = ident.to_string();
    let ty = &field.ty;

    let mut chain = if field.symbolic {
        if let Some(inner) = field.option_inner() {
            quote! {
                ::rowmap::Field::symbolic_opt(
                    #name,
                    |entity: &mut #entity_ident, value: ::std::option::Option<#inner>| {
                        entity.#ident = value
                    },
                )
            }
        } else {
            quote! {
                ::rowmap::Field::symbolic(
                    #name,
                    |entity: &mut #entity_ident, value: #ty| entity.#ident = value,
                )
            }
        }
    } else if field.custom {
        quote! {
            ::rowmap::Field::custom(
                #name,
                |entity: &mut #entity_ident, value: #ty| entity.#ident = value,
            )
        }
    } else {
        quote! {
            ::rowmap::Field::new(
                #name,
                |entity: &mut #entity_ident, value: #ty| entity.#ident = value,
            )
        }
    };

    if let Some(column) = &field.column {
        chain.extend(quote! { .with_column(#column) });
    }
    if let Some(factory) = &field.factory {
        chain.extend(quote! { .with_factory(::rowmap::coercion_factory::<#factory>()) });
    }
    if field.ignore {
        chain.extend(quote! { .with_ignore() });
    }
    if field.marked && field.column.is_none() && field.factory.is_none() && !field.ignore {
        // A bare `#[row]` still records an empty field marker so the
        // field is included without `map_all`.
        chain.extend(quote! {
            .with_marker(::rowmap::Marker::Field(::rowmap::FieldMarker::new()))
        });
    }
    for bundle in &field.bundles {
        chain.extend(quote! { .with_bundle(#bundle) });
    }
    for tag in &field.tags {
        chain.extend(quote! { .with_tag(#tag) });
    }
    chain
}

fn naming_tokens(naming: NamingArg) -> TokenStream {
    match naming {
        NamingArg::FieldName => quote! { ::rowmap::ColumnCase::FieldName },
        NamingArg::Camel => quote! { ::rowmap::ColumnCase::Camel },
        NamingArg::Snake => quote! { ::rowmap::ColumnCase::Snake },
        NamingArg::Kebab => quote! { ::rowmap::ColumnCase::Kebab },
        NamingArg::Pascal => quote! { ::rowmap::ColumnCase::Pascal },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn rendered(input: syn::DeriveInput) -> String {
        let entity = EntityDef::from_derive_input(&input).unwrap();
        generate(&entity).to_string().replace(' ', "")
    }

    #[test]
    fn test_generates_descriptor_impl() {
        let code = rendered(parse_quote! {
            #[row(naming = "snake", map_all)]
            struct User {
                id: i64,
                full_name: String,
            }
        });

        assert!(code.contains("impl::rowmap::MappableforUser"));
        assert!(code.contains("::rowmap::TypeDescriptor::builder::<User>()"));
        assert!(code.contains(".with_naming(::rowmap::ColumnCase::Snake)"));
        assert!(code.contains(".with_map_all_fields()"));
        assert!(code.contains("::rowmap::Field::new(\"id\""));
        assert!(code.contains("::rowmap::Field::new(\"full_name\""));
        assert!(code.contains(".build()"));
    }

    #[test]
    fn test_field_settings_become_sugar_calls() {
        let code = rendered(parse_quote! {
            struct User {
                #[row(column = "uid")]
                id: i64,
                #[row(ignore)]
                token: String,
            }
        });

        assert!(code.contains(".with_column(\"uid\")"));
        assert!(code.contains(".with_ignore()"));
        // Sugar already records a field marker; no extra empty one.
        assert!(!code.contains("FieldMarker::new()"));
    }

    #[test]
    fn test_bare_row_emits_empty_field_marker() {
        let code = rendered(parse_quote! {
            struct User {
                #[row]
                id: i64,
            }
        });

        assert!(code.contains("::rowmap::Marker::Field(::rowmap::FieldMarker::new())"));
    }

    #[test]
    fn test_symbolic_option_uses_null_tolerant_constructor() {
        let code = rendered(parse_quote! {
            struct User {
                #[row(symbolic)]
                status: Status,
                #[row(symbolic)]
                mood: Option<Mood>,
            }
        });

        assert!(code.contains("::rowmap::Field::symbolic(\"status\""));
        assert!(code.contains("::rowmap::Field::symbolic_opt(\"mood\""));
        assert!(code.contains("::std::option::Option<Mood>"));
    }

    #[test]
    fn test_custom_field_constructor() {
        let code = rendered(parse_quote! {
            struct Priced {
                #[row(custom, column = "amount")]
                amount: Euros,
            }
        });

        assert!(code.contains("::rowmap::Field::custom(\"amount\""));
        assert!(code.contains(".with_column(\"amount\")"));
    }

    #[test]
    fn test_factories_resolve_through_refs() {
        let code = rendered(parse_quote! {
            #[row(factory = "crate::WideFactory")]
            struct Wide {
                #[row(factory = "crate::HexFactory")]
                raw: i64,
            }
        });

        assert!(code.contains(".with_factory(::rowmap::mapper_factory::<crate::WideFactory>())"));
        assert!(code.contains(".with_factory(::rowmap::coercion_factory::<crate::HexFactory>())"));
    }

    #[test]
    fn test_bundles_and_tags_emit_in_order() {
        let code = rendered(parse_quote! {
            #[row(bundle = "audit", tag = "v2")]
            struct User {
                #[row(bundle = "pk")]
                id: i64,
            }
        });

        assert!(code.contains(".with_bundle(\"audit\")"));
        assert!(code.contains(".with_tag(\"v2\")"));
        assert!(code.contains(".with_bundle(\"pk\")"));
    }
}
