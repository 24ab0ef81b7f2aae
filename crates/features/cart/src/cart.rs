//! Cart reconciler.
//!
//! A [`Cart`] is an insertion-ordered set of [`CartLine`]s keyed by item identity. Every
//! operation is total: an unknown identity is a no-op, quantities saturate instead of
//! overflowing, and [`Cart::totals`] is folded from the lines on every call, so it can never
//! disagree with them.
//!
//! ```rust
//! # use sapp_cart::{Cart, Decrement};
//! # use sapp_kernel::domain::model::{Item, Money};
//! let mut cart = Cart::default();
//! cart.add_or_increment(Item::new("1", "Notebook", Money::from_minor(1_000)));
//! cart.add_or_increment(Item::new("1", "Notebook", Money::from_minor(1_000)));
//!
//! assert_eq!(cart.quantity("1"), Some(2));
//! assert_eq!(cart.totals().total_amount.to_string(), "20.00");
//! assert_eq!(cart.decrement("1"), Decrement::Decreased { quantity: 1 });
//! ```

use indexmap::IndexMap;
use sapp_kernel::domain::config::DecrementPolicy;
use sapp_kernel::domain::model::{Item, ItemId, Money};
use serde::Serialize;

/// One item in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub item: Item,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity, saturating.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.item.price.saturating_mul(u64::from(self.quantity))
    }
}

/// Aggregates derived from the current lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub line_count: usize,
    pub total_quantity: u64,
    pub total_amount: Money,
}

/// What a decrement did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// No line with that identity.
    Missing,
    /// Quantity went down by one and the line is still present.
    Decreased { quantity: u32 },
    /// The line is already at the clamp floor and was left unchanged.
    AtFloor { quantity: u32 },
    /// Quantity reached zero and the line was deleted.
    Removed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: IndexMap<ItemId, CartLine>,
    policy: DecrementPolicy,
}

impl Cart {
    /// An empty cart whose [`Cart::decrement`] follows `policy`.
    #[must_use]
    pub fn new(policy: DecrementPolicy) -> Self {
        Self { lines: IndexMap::new(), policy: policy.normalized() }
    }

    #[must_use]
    pub const fn policy(&self) -> DecrementPolicy {
        self.policy
    }

    /// Appends `item` with quantity 1, or bumps the existing line. Returns the new quantity.
    pub fn add_or_increment(&mut self, item: Item) -> u32 {
        let id = item.id.clone();
        let line = self.lines.entry(id).or_insert_with(|| CartLine { item, quantity: 0 });
        line.quantity = line.quantity.saturating_add(1);

        tracing::debug!(item = %line.item.id, quantity = line.quantity, "Cart line added");
        line.quantity
    }

    /// Bumps an existing line. Returns `false` when the identity is not in the cart.
    pub fn increment(&mut self, id: &str) -> bool {
        let Some(line) = self.lines.get_mut(id) else {
            return false;
        };
        line.quantity = line.quantity.saturating_add(1);

        tracing::debug!(item = id, quantity = line.quantity, "Cart line incremented");
        true
    }

    /// Decrements using the cart's own policy.
    pub fn decrement(&mut self, id: &str) -> Decrement {
        self.decrement_with(id, self.policy)
    }

    /// Decrements using an explicit policy.
    ///
    /// Under [`DecrementPolicy::Clamp`] a quantity already at or below the floor is left as is.
    pub fn decrement_with(&mut self, id: &str, policy: DecrementPolicy) -> Decrement {
        let Some(line) = self.lines.get_mut(id) else {
            return Decrement::Missing;
        };

        let outcome = match policy.normalized() {
            DecrementPolicy::Clamp { floor } if line.quantity <= floor => {
                Decrement::AtFloor { quantity: line.quantity }
            },
            DecrementPolicy::Clamp { .. } => {
                line.quantity -= 1;
                Decrement::Decreased { quantity: line.quantity }
            },
            DecrementPolicy::RemoveAtZero => {
                line.quantity = line.quantity.saturating_sub(1);
                if line.quantity == 0 {
                    self.lines.shift_remove(id);
                    Decrement::Removed
                } else {
                    Decrement::Decreased { quantity: line.quantity }
                }
            },
        };

        tracing::debug!(item = id, ?outcome, "Cart line decremented");
        outcome
    }

    /// Deletes a line, keeping the order of the remaining ones.
    pub fn remove(&mut self, id: &str) -> Option<CartLine> {
        let removed = self.lines.shift_remove(id);
        if removed.is_some() {
            tracing::debug!(item = id, "Cart line removed");
        }
        removed
    }

    /// Folds the lines into counts and the total amount.
    #[must_use]
    pub fn totals(&self) -> Totals {
        self.lines.values().fold(Totals::default(), |acc, line| Totals {
            line_count: acc.line_count + 1,
            total_quantity: acc.total_quantity.saturating_add(u64::from(line.quantity)),
            total_amount: acc.total_amount.saturating_add(line.subtotal()),
        })
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl ExactSizeIterator<Item = &CartLine> {
        self.lines.values()
    }

    #[must_use]
    pub fn line(&self, id: &str) -> Option<&CartLine> {
        self.lines.get(id)
    }

    #[must_use]
    pub fn quantity(&self, id: &str) -> Option<u32> {
        self.lines.get(id).map(|line| line.quantity)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.lines.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Empties the cart, e.g. after checkout.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
