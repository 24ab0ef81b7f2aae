//! Catalog entities shared by every slice: item identity, money and the item record itself.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use std::sync::Arc;

/// Largest minor-unit amount that survives a round trip through `f64` without loss.
const MAX_EXACT_MINOR: f64 = 9_007_199_254_740_992.0;
const MINOR_PER_MAJOR: u64 = 100;

/// Stable, opaque identity of a catalog item.
///
/// Backed by a shared string so cart lines and wishlists can clone it freely. Numeric ids
/// from seed files (`"id": 42`) are accepted and stored in their decimal form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(Arc<str>);

impl ItemId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<u64> for ItemId {
    fn from(value: u64) -> Self {
        Self(Arc::from(value.to_string()))
    }
}

impl From<&Self> for ItemId {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) if text.trim().is_empty() => {
                Err(serde::de::Error::custom("item id cannot be empty"))
            },
            Repr::Text(text) => Ok(Self::from(text)),
            Repr::Number(number) => Ok(Self::from(number)),
        }
    }
}

/// Reasons a price string or number cannot become [`Money`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMoneyError {
    Empty,
    Negative,
    InvalidDigit,
    TooPrecise,
    Overflow,
}

impl fmt::Display for ParseMoneyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Empty => "amount is empty",
            Self::Negative => "amount cannot be negative",
            Self::InvalidDigit => "amount contains an invalid character",
            Self::TooPrecise => "amount has more than two fractional digits",
            Self::Overflow => "amount is too large",
        };
        f.write_str(reason)
    }
}

impl std::error::Error for ParseMoneyError {}

/// Non-negative amount of money in minor units (cents).
///
/// Aggregation helpers saturate rather than overflow, which keeps cart totals total
/// functions even for absurd quantities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    #[must_use]
    pub const fn minor(self) -> u64 {
        self.0
    }

    /// Converts a decimal amount such as `1199.99`, rounding to the nearest cent.
    ///
    /// # Errors
    /// Returns [`ParseMoneyError`] for negative, non-finite or out-of-range values.
    pub fn from_major(value: f64) -> Result<Self, ParseMoneyError> {
        if !value.is_finite() {
            return Err(ParseMoneyError::InvalidDigit);
        }
        if value < 0.0 {
            return Err(ParseMoneyError::Negative);
        }

        let minor = (value * 100.0).round();
        if minor > MAX_EXACT_MINOR {
            return Err(ParseMoneyError::Overflow);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(Self(minor as u64))
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    #[must_use]
    pub const fn saturating_mul(self, quantity: u64) -> Self {
        Self(self.0.saturating_mul(quantity))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}.{:02}", self.0 / MINOR_PER_MAJOR, self.0 % MINOR_PER_MAJOR))
    }
}

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseMoneyError::Empty);
        }
        if s.starts_with('-') {
            return Err(ParseMoneyError::Negative);
        }

        let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
        let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
            return Err(ParseMoneyError::InvalidDigit);
        }

        let fraction_minor = match fraction.len() {
            0 => 0,
            1 => u64::from(fraction.as_bytes()[0] - b'0') * 10,
            2 => fraction.parse::<u64>().map_err(|_| ParseMoneyError::InvalidDigit)?,
            _ => return Err(ParseMoneyError::TooPrecise),
        };

        let whole = if whole.is_empty() {
            0
        } else {
            whole.parse::<u64>().map_err(|_| ParseMoneyError::Overflow)?
        };

        whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|minor| minor.checked_add(fraction_minor))
            .map(Self)
            .ok_or(ParseMoneyError::Overflow)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(f64),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => text.parse().map_err(serde::de::Error::custom),
            Repr::Number(number) => Self::from_major(number).map_err(serde::de::Error::custom),
        }
    }
}

const fn default_in_stock() -> bool {
    true
}

/// Immutable catalog entry.
///
/// Seed documents may use the storefront field names (`_id`, `name`), which are
/// accepted as aliases of `id` and `title`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(alias = "_id", alias = "product_id")]
    pub id: ItemId,
    #[serde(alias = "name")]
    pub title: String,
    pub price: Money,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Average review score, `0.0..=5.0`.
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Item {
    /// Creates an in-stock item without metadata.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            price,
            description: String::new(),
            category: None,
            subcategory: None,
            brand: None,
            rating: None,
            in_stock: true,
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub const fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub const fn with_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = in_stock;
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}
