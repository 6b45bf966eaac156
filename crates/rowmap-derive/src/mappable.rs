//! `Mappable` derive implementation.

mod expand;
mod parse;

use proc_macro2::TokenStream;
use syn::DeriveInput;

use self::parse::EntityDef;

/// Main entry point for the Mappable derive macro.
pub fn derive(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match EntityDef::from_derive_input(&input) {
        Ok(entity) => expand::generate(&entity),
        Err(err) => err.write_errors(),
    }
}
