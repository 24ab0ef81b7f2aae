use crate::error::{CatalogError, CatalogErrorExt};
use crate::search::{MAX_RATING, SearchQuery};
use crate::{Catalog, CatalogInner};
use indexmap::IndexMap;
use indexmap::map::Entry;
use sapp_kernel::domain::config::CatalogConfig;
use sapp_kernel::domain::model::Item;
use serde::de::value::SeqAccessDeserializer;
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Accepted seed layouts: `{ "products": [...] }` or a bare array.
///
/// The layout is chosen from the first token, so an invalid item reports its own error and
/// position instead of a generic layout mismatch.
struct SeedDocument(Vec<Item>);

impl<'de> Deserialize<'de> for SeedDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(SeedVisitor).map(Self)
    }
}

struct SeedVisitor;

impl<'de> Visitor<'de> for SeedVisitor {
    type Value = Vec<Item>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a product array or an object with a `products` array")
    }

    fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        Vec::deserialize(SeqAccessDeserializer::new(seq))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut products = None;
        while let Some(key) = map.next_key::<String>()? {
            if key == "products" {
                if products.is_some() {
                    return Err(de::Error::duplicate_field("products"));
                }
                products = Some(map.next_value()?);
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        products.ok_or_else(|| de::Error::missing_field("products"))
    }
}

impl Catalog {
    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(CatalogInner { items: IndexMap::new() })
    }

    /// Builds a catalog from items, preserving their order.
    ///
    /// # Errors
    /// * [`CatalogError::DuplicateItem`] if two items share an id.
    /// * [`CatalogError::InvalidItem`] for a blank title or a rating outside `0..=5`.
    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Result<Self, CatalogError> {
        let mut map = IndexMap::new();

        for item in items {
            validate_item(&item)?;
            match map.entry(item.id.clone()) {
                Entry::Occupied(entry) => {
                    return Err(CatalogError::DuplicateItem {
                        message: format!("id '{}' appears more than once", entry.key()).into(),
                        context: None,
                    });
                },
                Entry::Vacant(entry) => {
                    entry.insert(item);
                },
            }
        }

        Ok(Self::new(CatalogInner { items: map }))
    }

    /// Parses a JSON seed document.
    ///
    /// # Errors
    /// [`CatalogError::Parse`] for malformed JSON plus everything [`Catalog::from_items`] rejects.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let SeedDocument(items) =
            serde_json::from_str::<SeedDocument>(raw).context("Invalid seed document")?;
        Self::from_items(items)
    }

    /// Reads and parses a JSON seed file.
    ///
    /// # Errors
    /// [`CatalogError::Io`] if the file cannot be read, otherwise as [`Catalog::from_json`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).context(path.display().to_string())?;
        let catalog = Self::from_json(&raw).context(path.display().to_string())?;
        tracing::info!(path = %path.display(), items = catalog.len(), "Catalog seed loaded");

        Ok(catalog)
    }

    /// Loads the configured seed, or returns an empty catalog when none is set.
    ///
    /// # Errors
    /// As [`Catalog::load`].
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        match &config.seed {
            Some(path) => Self::load(path),
            None => {
                tracing::warn!("No catalog seed configured, starting with an empty catalog");
                Ok(Self::empty())
            },
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Items in seed order.
    pub fn items(&self) -> impl ExactSizeIterator<Item = &Item> {
        self.items.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Distinct categories, sorted.
    #[must_use]
    pub fn categories(&self) -> BTreeSet<&str> {
        self.items.values().filter_map(|item| item.category.as_deref()).collect()
    }

    /// Distinct brands, sorted.
    #[must_use]
    pub fn brands(&self) -> BTreeSet<&str> {
        self.items.values().filter_map(|item| item.brand.as_deref()).collect()
    }

    /// Runs a filter search. Results keep catalog order and never exceed `query.limit`.
    ///
    /// # Errors
    /// [`CatalogError::InvalidQuery`] for a limit outside `1..=50`, an inverted price range,
    /// or a minimum rating outside `0..=5`.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<&Item>, CatalogError> {
        query.validate()?;
        let matcher = query.matcher();
        let hits: Vec<&Item> =
            self.items.values().filter(|item| matcher.matches(item)).take(query.limit).collect();

        tracing::debug!(text = %query.text, hits = hits.len(), "Catalog search");
        Ok(hits)
    }

    /// Items related to `id` by subcategory, category and shared tags, best match first.
    ///
    /// The item itself is never returned; unrelated items are left out. Ties keep catalog
    /// order. An unknown `id` yields no results.
    #[must_use]
    pub fn similar(&self, id: &str, limit: usize) -> Vec<&Item> {
        let Some(target) = self.items.get(id) else {
            return Vec::new();
        };

        let mut scored: Vec<(usize, &Item)> = self
            .items
            .values()
            .filter(|item| item.id != target.id)
            .filter_map(|item| {
                let score = affinity(target, item);
                (score > 0).then_some((score, item))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));

        scored.into_iter().take(limit).map(|(_, item)| item).collect()
    }
}

fn same_label(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

fn affinity(target: &Item, other: &Item) -> usize {
    let mut score = 0;
    if same_label(target.subcategory.as_deref(), other.subcategory.as_deref()) {
        score += 3;
    }
    if same_label(target.category.as_deref(), other.category.as_deref()) {
        score += 2;
    }
    score
        + other
            .tags
            .iter()
            .filter(|tag| target.tags.iter().any(|own| own.eq_ignore_ascii_case(tag)))
            .count()
}

fn validate_item(item: &Item) -> Result<(), CatalogError> {
    let id = &item.id;

    if item.title.trim().is_empty() {
        return Err(CatalogError::InvalidItem {
            message: format!("item '{id}' has an empty title").into(),
            context: None,
        });
    }

    if let Some(rating) = item.rating
        && !(0.0..=MAX_RATING).contains(&rating)
    {
        return Err(CatalogError::InvalidItem {
            message: format!("item '{id}' has rating {rating} outside 0..=5").into(),
            context: None,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sapp_kernel::domain::model::Money;

    #[test]
    fn duplicate_ids_are_rejected() {
        let items = [
            Item::new("a", "First", Money::from_minor(100)),
            Item::new("a", "Second", Money::from_minor(200)),
        ];
        let err = Catalog::from_items(items).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateItem { .. }));
    }

    #[test]
    fn blank_titles_and_bad_ratings_are_rejected() {
        let err = Catalog::from_items([Item::new("a", "  ", Money::ZERO)]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidItem { .. }));

        let err = Catalog::from_items([Item::new("a", "A", Money::ZERO).with_rating(7.5)])
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidItem { .. }));
    }

    #[test]
    fn both_seed_layouts_parse() {
        let wrapped = r#"{"products":[{"id":"x","title":"X","price":"1.50"}]}"#;
        let bare = r#"[{"_id":7,"name":"Seven","price":7}]"#;

        let catalog = Catalog::from_json(wrapped).unwrap();
        assert_eq!(catalog.get("x").map(|item| item.price), Some(Money::from_minor(150)));

        let catalog = Catalog::from_json(bare).unwrap();
        assert_eq!(catalog.get("7").map(|item| item.title.as_str()), Some("Seven"));
    }

    #[test]
    fn similar_ranks_by_shared_attributes() {
        let catalog = Catalog::from_items([
            Item::new("phone", "Phone", Money::ZERO).with_category("Electronics").with_tags(["camera"]),
            Item::new("laptop", "Laptop", Money::ZERO).with_category("Electronics"),
            Item::new("pan", "Pan", Money::ZERO).with_category("Kitchen"),
            Item::new("tablet", "Tablet", Money::ZERO)
                .with_category("electronics")
                .with_tags(["camera", "5g"]),
        ])
        .unwrap();

        let ids: Vec<_> = catalog.similar("phone", 5).iter().map(|item| item.id.to_string()).collect();
        assert_eq!(ids, ["tablet", "laptop"]);
        assert_eq!(catalog.similar("phone", 1).len(), 1);
        assert!(catalog.similar("pan", 5).is_empty());
        assert!(catalog.similar("missing", 5).is_empty());
    }

    #[test]
    fn malformed_seed_is_a_parse_error() {
        let err = Catalog::from_json(r#"{"items": 3}"#).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(err.to_string().contains("missing field `products`"));

        let err = Catalog::from_json("3").unwrap_err();
        assert!(err.to_string().contains("a product array"));
    }

    #[test]
    fn invalid_item_keeps_its_cause() {
        let err = Catalog::from_json(r#"{"products":[{"id":"x","title":"X","price":"-1.00"}]}"#)
            .unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, CatalogError::Parse { .. }));
        assert!(message.contains("amount cannot be negative"), "{message}");
        assert!(message.contains("line 1"), "{message}");

        let err = Catalog::from_json(r#"[{"id":"x","price":"1.00"}]"#).unwrap_err();
        assert!(err.to_string().contains("missing field `title`"));
    }
}
