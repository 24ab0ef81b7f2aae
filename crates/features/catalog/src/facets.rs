//! Refinement hints derived from a set of search hits.

use sapp_kernel::domain::model::{Item, Money};
use serde::Serialize;
use std::collections::BTreeSet;

/// Share of the hit price span below which a price counts as low, in percent.
const LOW_BAND_PERCENT: u64 = 30;
/// Share of the hit price span above which a price counts as high, in percent.
const HIGH_BAND_PERCENT: u64 = 70;

/// Categories, brands and price bands present in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets<'a> {
    pub categories: BTreeSet<&'a str>,
    pub brands: BTreeSet<&'a str>,
    pub price_bands: Option<PriceBands>,
}

/// Three suggested price ranges: `..low`, `low..=high` and `high..`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBands {
    pub min: Money,
    pub low: Money,
    pub high: Money,
    pub max: Money,
}

impl PriceBands {
    fn spanning(min: Money, max: Money) -> Self {
        let span = max.minor() - min.minor();
        let at = |percent: u64| Money::from_minor(min.minor() + span.saturating_mul(percent) / 100);

        Self { min, low: at(LOW_BAND_PERCENT), high: at(HIGH_BAND_PERCENT), max }
    }
}

impl<'a> Facets<'a> {
    /// Summarizes `hits`. No hits yield empty sets and no price bands.
    pub fn from_hits(hits: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut facets = Self::default();
        let mut range: Option<(Money, Money)> = None;

        for item in hits {
            facets.categories.extend(item.category.as_deref());
            facets.brands.extend(item.brand.as_deref());
            range = Some(match range {
                None => (item.price, item.price),
                Some((min, max)) => (min.min(item.price), max.max(item.price)),
            });
        }

        facets.price_bands = range.map(|(min, max)| PriceBands::spanning(min, max));
        facets
    }
}
