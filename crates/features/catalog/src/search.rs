//! Deterministic catalog filtering.
//!
//! A [`SearchQuery`] combines an optional free-text part with structured filters. An item
//! is returned when it passes every filter that is set:
//!
//! * **text**: every whitespace-separated term must occur (case-insensitively) in the item's
//!   title, description, brand, category, subcategory or tags. Empty text matches everything.
//! * **category / brand**: case-insensitive equality.
//! * **`price_min` / `price_max`**: inclusive bounds on the unit price.
//! * **`in_stock_only`**: on by default, hides sold-out items.
//! * **`min_rating`**: items without a rating are treated as `0.0`.
//!
//! Results keep catalog order and are truncated to `limit` (`1..=50`, default 5).

use crate::error::CatalogError;
use sapp_kernel::domain::model::{Item, Money};
use serde::Deserialize;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 50;
pub(crate) const MAX_RATING: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub text: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price_min: Option<Money>,
    pub price_max: Option<Money>,
    pub in_stock_only: bool,
    pub min_rating: Option<f32>,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: None,
            brand: None,
            price_min: None,
            price_max: None,
            in_stock_only: true,
            min_rating: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchQuery {
    /// Free-text query with default filters.
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), ..Self::default() }
    }

    /// Matches the whole catalog (still honouring `in_stock_only` and `limit`).
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub const fn price_between(mut self, min: Option<Money>, max: Option<Money>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    #[must_use]
    pub const fn min_rating(mut self, rating: f32) -> Self {
        self.min_rating = Some(rating);
        self
    }

    #[must_use]
    pub const fn include_out_of_stock(mut self) -> Self {
        self.in_stock_only = false;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), CatalogError> {
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(CatalogError::InvalidQuery {
                message: format!("limit must be within 1..={MAX_LIMIT}, got {}", self.limit).into(),
                context: None,
            });
        }

        if let (Some(min), Some(max)) = (self.price_min, self.price_max)
            && min > max
        {
            return Err(CatalogError::InvalidQuery {
                message: format!("price_min {min} exceeds price_max {max}").into(),
                context: None,
            });
        }

        if let Some(rating) = self.min_rating
            && !(0.0..=MAX_RATING).contains(&rating)
        {
            return Err(CatalogError::InvalidQuery {
                message: format!("min_rating must be within 0..=5, got {rating}").into(),
                context: None,
            });
        }

        Ok(())
    }

    /// Compiles the query once so matching does not re-lowercase it per item.
    pub(crate) fn matcher(&self) -> Matcher<'_> {
        Matcher {
            query: self,
            terms: self.text.split_whitespace().map(str::to_lowercase).collect(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Matcher<'q> {
    query: &'q SearchQuery,
    terms: Vec<String>,
}

impl Matcher<'_> {
    pub(crate) fn matches(&self, item: &Item) -> bool {
        let q = self.query;

        if q.in_stock_only && !item.in_stock {
            return false;
        }
        if !equals_ignore_case(q.category.as_deref(), item.category.as_deref())
            || !equals_ignore_case(q.brand.as_deref(), item.brand.as_deref())
        {
            return false;
        }
        if q.price_min.is_some_and(|min| item.price < min)
            || q.price_max.is_some_and(|max| item.price > max)
        {
            return false;
        }
        if q.min_rating.is_some_and(|min| item.rating.unwrap_or(0.0) < min) {
            return false;
        }

        self.terms.is_empty() || self.matches_text(item)
    }

    fn matches_text(&self, item: &Item) -> bool {
        let mut haystack = String::with_capacity(item.title.len() + item.description.len() + 64);
        let fields = [
            Some(item.title.as_str()),
            Some(item.description.as_str()),
            item.brand.as_deref(),
            item.category.as_deref(),
            item.subcategory.as_deref(),
        ];
        for field in fields.into_iter().flatten().chain(item.tags.iter().map(String::as_str)) {
            haystack.push_str(&field.to_lowercase());
            haystack.push('\n');
        }

        self.terms.iter().all(|term| haystack.contains(term.as_str()))
    }
}

/// `true` when no filter is set, otherwise a case-insensitive comparison.
fn equals_ignore_case(filter: Option<&str>, value: Option<&str>) -> bool {
    match (filter, value) {
        (None, _) => true,
        (Some(filter), Some(value)) => filter.trim().eq_ignore_ascii_case(value.trim()),
        (Some(_), None) => false,
    }
}
