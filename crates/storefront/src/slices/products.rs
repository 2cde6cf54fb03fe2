//! Catalog: product listing, the product being viewed, categories and
//! subcategories.
//!
//! Listing and detail requests are tagged with a generation number when they
//! start. A response is applied only if no newer request of the same kind
//! has started since, so a slow response for an old filter can never
//! overwrite the listing for the filter the user picked last.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopfront_core::{CategoryId, ProductId};

use super::OpStatus;
use crate::api::{Category, Product, ProductFilter, SubCategory};

pub const LOAD_PRODUCTS_FAILED: &str = "Failed to load products";
pub const LOAD_PRODUCT_FAILED: &str = "Failed to load product";
pub const LOAD_CATEGORIES_FAILED: &str = "Failed to load categories";
pub const LOAD_SUBCATEGORIES_FAILED: &str = "Failed to load subcategories";

/// Which subcategories are currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubcategoryScope {
    All,
    Category(CategoryId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LastFetched {
    pub products: Option<DateTime<Utc>>,
    pub categories: Option<DateTime<Utc>>,
    pub subcategories: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductsState {
    pub items: Vec<Product>,
    /// Filter of the most recently requested listing.
    pub filter: ProductFilter,
    pub listing: OpStatus,
    pub current_item: Option<Product>,
    pub current: OpStatus,
    pub categories: Vec<Category>,
    pub categories_status: OpStatus,
    pub subcategories: Vec<SubCategory>,
    pub subcategories_scope: Option<SubcategoryScope>,
    pub subcategories_status: OpStatus,
    pub last_fetched: LastFetched,
    #[serde(skip)]
    listing_generation: u64,
    #[serde(skip)]
    current_generation: u64,
}

impl ProductsState {
    // =========================================================================
    // Listing
    // =========================================================================

    /// Start a listing request and return its generation.
    pub fn begin_listing(&mut self, filter: ProductFilter) -> u64 {
        self.listing_generation += 1;
        self.filter = filter;
        self.listing.start();
        self.listing_generation
    }

    /// Apply a listing result. Returns `false` if a newer listing request has
    /// started since, in which case nothing changes.
    pub fn finish_listing(
        &mut self,
        generation: u64,
        result: Result<Vec<Product>, String>,
        now: DateTime<Utc>,
    ) -> bool {
        if generation != self.listing_generation {
            return false;
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.last_fetched.products = Some(now);
                self.listing.succeed();
            }
            Err(message) => self.listing.fail(message),
        }
        true
    }

    // =========================================================================
    // Current item
    // =========================================================================

    /// Start loading a product; the previous one is cleared while pending.
    pub fn begin_current(&mut self) -> u64 {
        self.current_generation += 1;
        self.current_item = None;
        self.current.start();
        self.current_generation
    }

    /// Apply a product detail result unless a newer request superseded it.
    pub fn finish_current(&mut self, generation: u64, result: Result<Product, String>) -> bool {
        if generation != self.current_generation {
            return false;
        }
        match result {
            Ok(product) => {
                self.current_item = Some(product);
                self.current.succeed();
            }
            Err(message) => self.current.fail(message),
        }
        true
    }

    /// Find a product in the listing or the current item.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.current_item
            .iter()
            .chain(self.items.iter())
            .find(|p| &p.id == id)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Whether categories were fetched within `window` of `now`.
    #[must_use]
    pub fn categories_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        is_fresh(self.last_fetched.categories, now, window)
    }

    pub fn set_categories(&mut self, categories: Vec<Category>, now: DateTime<Utc>) {
        self.categories = categories;
        self.last_fetched.categories = Some(now);
        self.categories_status.succeed();
    }

    /// Whether the held subcategories cover `scope` and are within `window`.
    #[must_use]
    pub fn subcategories_fresh(
        &self,
        scope: SubcategoryScope,
        now: DateTime<Utc>,
        window: Duration,
    ) -> bool {
        self.subcategories_scope == Some(scope)
            && is_fresh(self.last_fetched.subcategories, now, window)
    }

    pub fn set_subcategories(
        &mut self,
        scope: SubcategoryScope,
        subcategories: Vec<SubCategory>,
        now: DateTime<Utc>,
    ) {
        self.subcategories = subcategories;
        self.subcategories_scope = Some(scope);
        self.last_fetched.subcategories = Some(now);
        self.subcategories_status.succeed();
    }
}

fn is_fresh(fetched: Option<DateTime<Utc>>, now: DateTime<Utc>, window: Duration) -> bool {
    let Some(fetched) = fetched else {
        return false;
    };
    chrono::Duration::from_std(window).is_ok_and(|window| now.signed_duration_since(fetched) < window)
}
