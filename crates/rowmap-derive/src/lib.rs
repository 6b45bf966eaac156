//! Derive macros for rowmap entity descriptors.
//!
//! ```rust,ignore
//! use rowmap::{Mappable, Symbolic};
//!
//! #[derive(Mappable, Default)]
//! #[row(naming = "snake", map_all)]
//! pub struct User {
//!     pub id: i64,
//!     pub full_name: String,
//!     #[row(column = "mail")]
//!     pub email: Option<String>,
//!     #[row(symbolic)]
//!     pub status: Status,
//!     #[row(ignore)]
//!     pub session_token: String,
//! }
//!
//! #[derive(Symbolic, Default)]
//! pub enum Status {
//!     #[default]
//!     Active,
//!     Disabled,
//! }
//! ```
//!
//! `#[derive(Mappable)]` turns the struct's `#[row(...)]` attributes into
//! a static type descriptor. Any `#[row]` attribute on a field marks it
//! for mapping unless the attribute carries only `bundle`/`tag` entries;
//! unmarked fields map only when the type opts in with `map_all`. The
//! generated code refers to items through the `rowmap` facade crate, so
//! that crate must be a direct dependency.

mod mappable;
mod symbolic;

use proc_macro::TokenStream;

/// Derive a static [`TypeDescriptor`] and the `Mappable` impl for a
/// named-field struct.
///
/// [`TypeDescriptor`]: https://docs.rs/rowmap
#[proc_macro_derive(Mappable, attributes(row))]
pub fn derive_mappable(input: TokenStream) -> TokenStream {
    mappable::derive(input.into()).into()
}

/// Derive the `Symbolic` trait for a fieldless enum, using the variant
/// names verbatim as symbols.
#[proc_macro_derive(Symbolic)]
pub fn derive_symbolic(input: TokenStream) -> TokenStream {
    symbolic::derive(input.into()).into()
}
