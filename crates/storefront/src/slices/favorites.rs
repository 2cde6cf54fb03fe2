//! Favorites list, one entry per product.

use serde::{Deserialize, Serialize};
use shopfront_core::{Price, ProductId};

use crate::api::Product;
use crate::persistence::{Persistence, keys};

/// Rating shown when the caller supplies none.
pub const DEFAULT_RATING: f64 = 4.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    pub image: String,
    pub brand: String,
    pub slug: String,
    pub stock: u32,
    #[serde(default = "default_rating")]
    pub rating: f64,
    pub product_data: Product,
}

const fn default_rating() -> f64 {
    DEFAULT_RATING
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FavoritesState {
    pub items: Vec<FavoriteItem>,
    pub total_items: usize,
    pub is_open: bool,
}

impl FavoritesState {
    pub fn initialize(&mut self, persistence: &Persistence) {
        self.items = persistence
            .load::<Vec<FavoriteItem>>(keys::FAVORITES)
            .unwrap_or_default();
        self.total_items = self.items.len();
    }

    /// Add `product`. Returns `false` (and changes nothing) if it is already
    /// a favorite.
    pub fn add(
        &mut self,
        product: &Product,
        rating: Option<f64>,
        original_price: Option<Price>,
    ) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.items.push(FavoriteItem {
            id: product.id.clone(),
            title: product.title.clone(),
            price: product.price,
            original_price,
            image: product.display_image(),
            brand: product.brand.clone(),
            slug: product.slug.clone(),
            stock: product.stock,
            rating: rating.unwrap_or(DEFAULT_RATING),
            product_data: product.clone(),
        });
        self.total_items = self.items.len();
        true
    }

    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        self.total_items = self.items.len();
        self.items.len() != before
    }

    /// Add if absent, remove if present. Returns whether it is now a favorite.
    pub fn toggle(
        &mut self,
        product: &Product,
        rating: Option<f64>,
        original_price: Option<Price>,
    ) -> bool {
        if self.remove(&product.id) {
            false
        } else {
            self.add(product, rating, original_price)
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.total_items = 0;
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.id == id)
    }

    pub const fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    pub const fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    pub fn persist(&self, persistence: &Persistence) {
        persistence.save(keys::FAVORITES, &self.items);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::new(id),
            title: "Mug".to_string(),
            slug: "mug".to_string(),
            price: Price::from_units(12),
            stock: 4,
            brand: String::new(),
            images: vec![],
            description: None,
            category_id: None,
            sub_category_id: None,
            category: None,
            sub_category: None,
        }
    }

    #[test]
    fn test_toggle_twice_restores_collection() {
        let mut favorites = FavoritesState::default();
        favorites.add(&product("a"), None, None);
        let before = favorites.items.clone();

        assert!(favorites.toggle(&product("b"), Some(5.0), None));
        assert!(favorites.contains(&ProductId::new("b")));
        assert!(!favorites.toggle(&product("b"), None, None));

        assert_eq!(favorites.items, before);
        assert_eq!(favorites.total_items, 1);
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut favorites = FavoritesState::default();
        assert!(favorites.add(&product("a"), Some(3.0), None));
        assert!(!favorites.add(&product("a"), Some(1.0), None));
        assert_eq!(favorites.items.len(), 1);
        assert!((favorites.items[0].rating - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_default_rating_and_placeholder_image() {
        let mut favorites = FavoritesState::default();
        favorites.add(&product("a"), None, Some(Price::from_units(20)));
        let item = &favorites.items[0];
        assert!((item.rating - DEFAULT_RATING).abs() < f64::EPSILON);
        assert_eq!(item.image, "/placeholder.svg");
        assert_eq!(item.original_price, Some(Price::from_units(20)));
    }

    #[test]
    fn test_persisted_round_trip() {
        let persistence = Persistence::in_memory();
        let mut favorites = FavoritesState::default();
        favorites.add(&product("a"), None, None);
        favorites.persist(&persistence);

        let mut restored = FavoritesState::default();
        restored.initialize(&persistence);
        assert_eq!(restored.items, favorites.items);
        assert_eq!(restored.total_items, 1);
    }
}
