use crate::cart::Cart;
use crate::error::CartError;
use indexmap::IndexMap;
use sapp_kernel::domain::model::{Item, ItemId, Money};
use serde::Serialize;

/// Longest note, in characters, a wishlist entry may carry.
pub const MAX_NOTES_CHARS: usize = 500;

/// A saved item and the shopper's optional note about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WishlistEntry {
    pub item: Item,
    pub notes: Option<String>,
}

/// Saved-for-later items, unique by identity, in the order they were saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wishlist {
    entries: IndexMap<ItemId, WishlistEntry>,
}

impl Wishlist {
    /// Saves `item`. Returns `false` if its identity is already saved.
    pub fn add(&mut self, item: Item) -> bool {
        if self.entries.contains_key(&item.id) {
            return false;
        }
        tracing::debug!(item = %item.id, "Wishlist item saved");
        self.entries.insert(item.id.clone(), WishlistEntry { item, notes: None });
        true
    }

    /// Saves `item` with a note. An already saved item keeps its entry and note.
    ///
    /// # Errors
    /// [`CartError::InvalidNotes`] if `notes` is longer than [`MAX_NOTES_CHARS`].
    pub fn add_with_notes(
        &mut self,
        item: Item,
        notes: impl Into<String>,
    ) -> Result<bool, CartError> {
        let notes = checked_notes(notes.into())?;
        let id = item.id.clone();
        if !self.add(item) {
            return Ok(false);
        }
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.notes = notes;
        }
        Ok(true)
    }

    /// Replaces the note of a saved item; a blank note clears it. Returns `false` if the item
    /// is not saved.
    ///
    /// # Errors
    /// [`CartError::InvalidNotes`] if `notes` is longer than [`MAX_NOTES_CHARS`].
    pub fn set_notes(&mut self, id: &str, notes: impl Into<String>) -> Result<bool, CartError> {
        let notes = checked_notes(notes.into())?;
        let Some(entry) = self.entries.get_mut(id) else {
            return Ok(false);
        };
        entry.notes = notes;
        Ok(true)
    }

    #[must_use]
    pub fn notes(&self, id: &str) -> Option<&str> {
        self.entries.get(id).and_then(|entry| entry.notes.as_deref())
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        self.entries.shift_remove(id).map(|entry| entry.item)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn items(&self) -> impl ExactSizeIterator<Item = &Item> {
        self.entries.values().map(|entry| &entry.item)
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &WishlistEntry> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the saved unit prices.
    #[must_use]
    pub fn total_value(&self) -> Money {
        self.items().map(|item| item.price).sum()
    }

    /// Moves a saved item into `cart`. Returns the cart quantity, or `None` if it was not saved.
    /// The note is dropped with the entry.
    pub fn move_to_cart(&mut self, id: &str, cart: &mut Cart) -> Option<u32> {
        let item = self.remove(id)?;
        Some(cart.add_or_increment(item))
    }
}

fn checked_notes(notes: String) -> Result<Option<String>, CartError> {
    let chars = notes.chars().count();
    if chars > MAX_NOTES_CHARS {
        return Err(CartError::InvalidNotes {
            message: format!("{chars} characters, at most {MAX_NOTES_CHARS} allowed").into(),
            context: None,
        });
    }

    let trimmed = notes.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
}
