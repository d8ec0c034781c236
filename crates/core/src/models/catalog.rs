use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::CoreError;

use super::money::Price;
use super::product::Product;

/// Listing order for catalog results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Catalog order, unchanged.
    #[default]
    #[serde(rename = "featured")]
    Featured,
    #[serde(rename = "price-low")]
    PriceLowToHigh,
    #[serde(rename = "price-high")]
    PriceHighToLow,
    /// Highest rated first; unrated listings sort as 0.
    #[serde(rename = "rating")]
    Rating,
    /// Highest numeric id first.
    #[serde(rename = "newest")]
    Newest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Featured => "featured",
            SortOrder::PriceLowToHigh => "price-low",
            SortOrder::PriceHighToLow => "price-high",
            SortOrder::Rating => "rating",
            SortOrder::Newest => "newest",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "featured" => Ok(SortOrder::Featured),
            "price-low" => Ok(SortOrder::PriceLowToHigh),
            "price-high" => Ok(SortOrder::PriceHighToLow),
            "rating" => Ok(SortOrder::Rating),
            "newest" => Ok(SortOrder::Newest),
            other => Err(CoreError::ValidationError(format!(
                "Unknown sort order: {other}"
            ))),
        }
    }
}

/// Filters and ordering for a catalog listing.
///
/// Every filter is optional; the default query matches everything in
/// catalog order. Text comparisons ignore case.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    /// Substring of the name or description.
    pub search: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Inclusive lower bound.
    pub min_price: Option<Price>,
    /// Inclusive upper bound.
    pub max_price: Option<Price>,
    pub sort: SortOrder,
}

/// Selector value that stands for "no filter".
const ALL: &str = "All";

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Restrict to one category. `"All"` clears the filter.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = selector(category.into());
        self
    }

    /// Restrict to one brand. `"All"` clears the filter.
    #[must_use]
    pub fn by_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = selector(brand.into());
        self
    }

    #[must_use]
    pub fn price_between(mut self, min: Price, max: Price) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    #[must_use]
    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        self.matches_search(product)
            && same_text(self.category.as_deref(), product.category())
            && same_text(self.brand.as_deref(), product.brand())
            && self.min_price.map_or(true, |min| product.price >= min)
            && self.max_price.map_or(true, |max| product.price <= max)
    }

    fn matches_search(&self, product: &Product) -> bool {
        let term = self.search.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        product.name.to_lowercase().contains(&term)
            || product
                .description()
                .is_some_and(|d| d.to_lowercase().contains(&term))
    }
}

fn selector(value: String) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case(ALL) {
        None
    } else {
        Some(value.to_string())
    }
}

/// No filter matches anything; a filter never matches a missing field.
fn same_text(filter: Option<&str>, field: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(wanted) => field.is_some_and(|f| f.eq_ignore_ascii_case(wanted)),
    }
}
