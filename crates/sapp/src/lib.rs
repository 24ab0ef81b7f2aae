//! Facade crate for `SuperApp` features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `sapp` with the desired feature flags (`cart`/`catalog`, both on by default).
//! - Call [`init`] once with the loaded [`AppConfig`](domain::config::AppConfig), then look up
//!   slices with [`domain::registry::find`].

pub use sapp_domain as domain;
pub use sapp_kernel as kernel;

use sapp_domain::config::AppConfig;
use sapp_domain::registry::InitializedSlice;

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "cart")]
    pub use sapp_cart as cart;
    #[cfg(feature = "catalog")]
    pub use sapp_catalog as catalog;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "cart")]
        "cart",
        #[cfg(feature = "catalog")]
        "catalog",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize all enabled features.
///
/// The catalog comes first so later slices can rely on it being loaded.
///
/// # Errors
/// Returns an error if any feature initialization fails.
#[allow(unused_variables, unused_mut)]
pub fn init(config: &AppConfig) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error>> {
    let mut slices = Vec::new();

    // Catalog
    #[cfg(feature = "catalog")]
    slices.push(features::catalog::init(&config.catalog)?);

    // Cart sessions & wishlists
    #[cfg(feature = "cart")]
    slices.push(features::cart::init(config)?);

    tracing::info!(slices = slices.len(), enabled = ?features::ENABLED, "Features initialized");
    Ok(slices)
}
