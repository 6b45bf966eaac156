//! `Symbolic` derive implementation.
//!
//! Fieldless enums only; each variant's identifier is its symbol,
//! matched exactly.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields};

/// Main entry point for the Symbolic derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.write_errors(),
    }
}

fn expand(input: &DeriveInput) -> darling::Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(
            darling::Error::custom("`Symbolic` can only be derived for enums")
                .with_span(&input.ident),
        );
    };
    if !input.generics.params.is_empty() {
        return Err(
            darling::Error::custom("`Symbolic` cannot be derived for generic enums")
                .with_span(&input.generics),
        );
    }

    let mut errors = darling::Error::accumulator();
    let mut idents = Vec::new();
    for variant in &data.variants {
        if matches!(variant.fields, Fields::Unit) {
            idents.push(&variant.ident);
        } else {
            errors.push(
                darling::Error::custom("`Symbolic` variants cannot carry data")
                    .with_span(&variant.ident),
            );
        }
    }
    errors.finish()?;
    if idents.is_empty() {
        return Err(
            darling::Error::custom("`Symbolic` requires at least one variant")
                .with_span(&input.ident),
        );
    }

    let ident = &input.ident;
    let names: Vec<String> = idents.iter().map(|ident| ident.to_string()).collect();

    Ok(quote! {
        impl ::rowmap::Symbolic for #ident {
            const SYMBOLS: &'static [&'static str] = &[#(#names),*];

            fn from_symbol(symbol: &str) -> ::std::option::Option<Self> {
                match symbol {
                    #(#names => ::std::option::Option::Some(Self::#idents),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn symbol(&self) -> &'static str {
                match self {
                    #(Self::#idents => #names,)*
                }
            }
        }
    })
}
