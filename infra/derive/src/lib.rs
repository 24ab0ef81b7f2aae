#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every crate of the workspace.
//!
//! * [`macro@sapp_error`] turns a plain enum into a context-aware error type.
//! * [`macro@sapp_slice`] turns a struct into a registrable feature slice handle.
//!
//! Examples are `ignore`d here because a proc-macro crate cannot use its own macros;
//! the integration tests under `tests/` exercise them from a consumer's point of view.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Turns an enum into a workspace error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>`, and for `Result<T, Source>`
///   whenever a variant wraps a source error.
/// * `From<Source>` for each variant that carries a `source` (or `#[source]`) field.
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A private `format_context` helper for use in `#[error(...)]` strings.
///
/// # Requirements
///
/// Every variant uses named fields. A variant with a source must also declare
/// `context: Option<Cow<'static, str>>`. Two variants must not wrap the same source type.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[sapp_derive::sapp_error]
/// pub enum CatalogError {
///     #[error("Catalog seed unreadable{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal catalog error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read(path: &str) -> Result<String, CatalogError> {
///     std::fs::read_to_string(path).context("Reading catalog seed")
/// }
/// ```
#[proc_macro_attribute]
pub fn sapp_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Defines a feature slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` turns into an `Arc` wrapper
/// that derefs to the inner state and implements
/// `sapp_kernel::domain::registry::FeatureSlice`, so it can be registered and looked up
/// at runtime.
///
/// # Example
/// ```rust,ignore
/// #[sapp_derive::sapp_slice]
/// pub struct Catalog {
///     pub items: Vec<Item>,
/// }
///
/// let slice = Catalog::new(CatalogInner { items: Vec::new() });
/// ```
#[proc_macro_attribute]
pub fn sapp_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
