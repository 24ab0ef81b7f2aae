//! Catalog feature slice: the read-only set of purchasable items and a filter search over it.
//!
//! The catalog is seeded once from a JSON document and never mutated afterwards, so the
//! slice handle can be cloned into every session that needs to resolve item identities.

mod catalog;
mod error;
mod facets;
pub mod search;

pub use crate::error::{CatalogError, CatalogErrorExt};
pub use crate::facets::{Facets, PriceBands};
pub use crate::search::SearchQuery;

use indexmap::IndexMap;
use sapp_kernel::domain::config::CatalogConfig;
use sapp_kernel::domain::model::{Item, ItemId};
use sapp_kernel::domain::registry::InitializedSlice;

/// Catalog feature state. Items are kept in seed order.
#[sapp_derive::sapp_slice]
pub struct Catalog {
    items: IndexMap<ItemId, Item>,
}

/// Initialize the catalog feature from its configuration section.
///
/// # Errors
/// Returns a [`CatalogError`] if the configured seed cannot be read or is invalid.
pub fn init(config: &CatalogConfig) -> Result<InitializedSlice, CatalogError> {
    let catalog = Catalog::from_config(config)?;
    tracing::info!(items = catalog.len(), "Catalog slice initialized");

    Ok(InitializedSlice::new(catalog))
}
