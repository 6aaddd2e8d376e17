use serde::{Deserialize, Serialize};

use super::{GeoPoint, Product};

/// Category filter value that matches every product.
pub const ALL_CATEGORIES: &str = "Semua";

/// What a consumer is browsing for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Category display name. `None` or `"Semua"` matches everything.
    pub category: Option<String>,
    /// Case-insensitive substring of the product name.
    pub search: Option<String>,
    /// Where the buyer is, when known.
    pub buyer_location: Option<GeoPoint>,
}

impl CatalogFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn near(mut self, location: GeoPoint) -> Self {
        self.buyer_location = Some(location);
        self
    }

    /// Returns true if the product passes the category and search filters.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) => true,
            Some(name) => product.category.as_str() == name,
        };

        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(needle) => product
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        };

        category_ok && search_ok
    }

    /// Filters the products and, when the buyer location is known, sorts
    /// them nearest first. Without a location the input order is kept.
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        let mut matching: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();

        if let Some(buyer) = self.buyer_location {
            // sort_by is stable, so equal distances keep their order.
            matching.sort_by(|a, b| {
                let da = buyer.distance_km(&a.location());
                let db = buyer.distance_km(&b.location());
                da.total_cmp(&db)
            });
        }

        matching
    }
}
