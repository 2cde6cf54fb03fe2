//! Short-lived cache for product detail responses.

use std::time::Duration;

use moka::future::Cache;
use shopfront_core::ProductId;

use super::types::Product;

const MAX_CAPACITY: u64 = 500;
const TIME_TO_LIVE: Duration = Duration::from_secs(30);

/// Product details keyed by id.
pub type ProductCache = Cache<ProductId, Product>;

/// Build the product cache with the standard capacity and TTL.
#[must_use]
pub fn product_cache() -> ProductCache {
    Cache::builder()
        .max_capacity(MAX_CAPACITY)
        .time_to_live(TIME_TO_LIVE)
        .build()
}
