//! Per-session cart store.
//!
//! Every session owns its own [`Cart`] and [`Wishlist`] behind its own mutex, so concurrent
//! sessions never contend and never observe each other's state. The map of sessions is a
//! `moka` cache: idle sessions expire and the number of retained sessions is bounded.

use crate::cart::{Cart, CartLine, Totals};
use crate::error::CartError;
use crate::wishlist::Wishlist;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use sapp_kernel::domain::config::{DecrementPolicy, SessionConfig};
use sapp_kernel::safe_nanoid;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type Store = Cache<SessionId, Arc<Mutex<Session>>>;

/// Opaque, URL-safe session handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(Arc<str>);

impl SessionId {
    fn generate() -> Self {
        Self(Arc::from(safe_nanoid!()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

/// State owned by one session.
#[derive(Debug, Default)]
pub struct Session {
    pub cart: Cart,
    pub wishlist: Wishlist,
}

/// Point-in-time copy of a session's cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub totals: Totals,
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        Self { lines: cart.lines().cloned().collect(), totals: cart.totals() }
    }
}

/// Session store feature state.
#[sapp_derive::sapp_slice]
pub struct CartSessions {
    store: Store,
    policy: DecrementPolicy,
}

impl CartSessions {
    /// Builds a store whose carts decrement with `policy`.
    ///
    /// A capacity of zero is raised to one; an idle timeout of zero disables idle expiry.
    /// A full store evicts its least recently used session, so a freshly opened one survives.
    #[must_use]
    pub fn with_config(config: &SessionConfig, policy: DecrementPolicy) -> Self {
        let mut builder = Store::builder()
            .max_capacity(config.capacity.max(1))
            .eviction_policy(EvictionPolicy::lru());
        if config.idle_timeout_seconds > 0 {
            builder = builder.time_to_idle(Duration::from_secs(config.idle_timeout_seconds));
        }

        Self::new(CartSessionsInner { store: builder.build(), policy: policy.normalized() })
    }

    /// Decrement policy given to new carts.
    #[must_use]
    pub fn policy(&self) -> DecrementPolicy {
        self.policy
    }

    /// Opens an empty session and returns its handle.
    pub fn open(&self) -> SessionId {
        let id = SessionId::generate();
        let session = Session { cart: Cart::new(self.policy), wishlist: Wishlist::default() };
        self.store.insert(id.clone(), Arc::new(Mutex::new(session)));

        tracing::debug!(session = %id, "Cart session opened");
        id
    }

    /// Runs `f` with exclusive access to the whole session.
    ///
    /// # Errors
    /// [`CartError::SessionNotFound`] if the session is unknown, closed, or expired.
    ///
    /// # Deadlocks
    /// The session mutex is not reentrant and stays locked while `f` runs. `f` must not call
    /// back into this store for the same session; other sessions are safe to touch.
    pub fn with_session<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, CartError> {
        let session = self.store.get(id).ok_or_else(|| {
            tracing::warn!(session = %id, "Unknown cart session");
            CartError::SessionNotFound { message: id.to_string().into(), context: None }
        })?;

        let mut guard = session.lock();
        Ok(f(&mut guard))
    }

    /// Runs `f` with exclusive access to the session's cart.
    ///
    /// # Errors
    /// As [`CartSessions::with_session`].
    pub fn with_cart<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Cart) -> R,
    ) -> Result<R, CartError> {
        self.with_session(id, |session| f(&mut session.cart))
    }

    /// Runs `f` with exclusive access to the session's wishlist.
    ///
    /// # Errors
    /// As [`CartSessions::with_session`].
    pub fn with_wishlist<R>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Wishlist) -> R,
    ) -> Result<R, CartError> {
        self.with_session(id, |session| f(&mut session.wishlist))
    }

    /// Copies the session's cart lines and totals.
    ///
    /// # Errors
    /// As [`CartSessions::with_session`].
    pub fn snapshot(&self, id: &SessionId) -> Result<CartSnapshot, CartError> {
        self.with_cart(id, |cart| CartSnapshot::from(&*cart))
    }

    /// Drops the session. Returns whether it was still open.
    pub fn close(&self, id: &SessionId) -> bool {
        let closed = self.store.remove(id).is_some();
        if closed {
            tracing::debug!(session = %id, "Cart session closed");
        }
        closed
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.store.run_pending_tasks();
        self.store.entry_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
