use std::cmp::Ordering;

use crate::models::catalog::{CatalogQuery, SortOrder};
use crate::models::product::{Product, ProductId};

/// Search, filter and sort over a product listing.
///
/// Pure business logic, no I/O. The catalog itself is owned by the host.
#[derive(Debug, Clone, Default)]
pub struct CatalogService;

impl CatalogService {
    pub fn new() -> Self {
        Self
    }

    /// Products passing `query`, in the order it asks for.
    /// Ties keep catalog order.
    pub fn query<'a>(&self, products: &'a [Product], query: &CatalogQuery) -> Vec<&'a Product> {
        let mut matched: Vec<&Product> = products.iter().filter(|p| query.matches(p)).collect();

        match query.sort {
            SortOrder::Featured => {}
            SortOrder::PriceLowToHigh => matched.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceHighToLow => matched.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Rating => matched.sort_by(|a, b| {
                let (ra, rb) = (a.rating().unwrap_or(0.0), b.rating().unwrap_or(0.0));
                rb.total_cmp(&ra)
            }),
            SortOrder::Newest => matched.sort_by(|a, b| newest_first(&a.id, &b.id)),
        }

        tracing::debug!(
            matched = matched.len(),
            total = products.len(),
            sort = %query.sort,
            "catalog query"
        );
        matched
    }

    /// Distinct categories in first-seen order, for the filter selector.
    pub fn categories<'a>(&self, products: &'a [Product]) -> Vec<&'a str> {
        distinct(products.iter().filter_map(Product::category))
    }

    /// Distinct brands in first-seen order, for the filter selector.
    pub fn brands<'a>(&self, products: &'a [Product]) -> Vec<&'a str> {
        distinct(products.iter().filter_map(Product::brand))
    }
}

/// Numeric ids descending; text ids carry no age and go last.
fn newest_first(a: &ProductId, b: &ProductId) -> Ordering {
    match (a, b) {
        (ProductId::Numeric(x), ProductId::Numeric(y)) => y.cmp(x),
        (ProductId::Numeric(_), ProductId::Text(_)) => Ordering::Less,
        (ProductId::Text(_), ProductId::Numeric(_)) => Ordering::Greater,
        (ProductId::Text(_), ProductId::Text(_)) => Ordering::Equal,
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}
