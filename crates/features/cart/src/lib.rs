//! Cart feature slice: the cart reconciler, the wishlist and the per-session store that
//! isolates them.

mod cart;
mod error;
mod sessions;
mod wishlist;

pub use crate::cart::{Cart, CartLine, Decrement, Totals};
pub use crate::error::{CartError, CartErrorExt};
pub use crate::sessions::{CartSessions, CartSessionsInner, CartSnapshot, Session, SessionId};
pub use crate::wishlist::{MAX_NOTES_CHARS, Wishlist, WishlistEntry};

use sapp_kernel::domain::config::AppConfig;
use sapp_kernel::domain::registry::InitializedSlice;

/// Initialize the cart feature: a session store using the configured decrement policy.
///
/// # Errors
/// Infallible today; the signature matches the other slices.
pub fn init(config: &AppConfig) -> Result<InitializedSlice, CartError> {
    let sessions = CartSessions::with_config(&config.sessions, config.cart.policy);
    tracing::info!(
        policy = ?sessions.policy(),
        capacity = config.sessions.capacity,
        idle_timeout_seconds = config.sessions.idle_timeout_seconds,
        "Cart slice initialized"
    );

    Ok(InitializedSlice::new(sessions))
}
