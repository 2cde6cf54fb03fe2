//! Shopping cart.
//!
//! A line is identified by `(product id, size, color)`. Totals are derived
//! from the lines and recomputed on every mutation, so they can never drift.
//! Every mutation of the lines is written to the `cart` key; the drawer's
//! open flag is not persisted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::{Price, ProductId};

use crate::api::{NewOrderLine, Product};
use crate::persistence::{Persistence, keys};

/// Flat shipping charge applied at checkout.
pub const SHIPPING_FLAT: Price = Price::new(Decimal::from_parts(599, 0, 0, false, 2));

/// Tax rate applied to the subtotal at checkout.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub quantity: u32,
    /// Display image, already resolved.
    pub image: String,
    pub brand: String,
    pub slug: String,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Product as it was when added.
    pub product_data: Product,
}

impl CartItem {
    fn is_line(&self, id: &ProductId, size: Option<&str>, color: Option<&str>) -> bool {
        &self.id == id && self.size.as_deref() == size && self.color.as_deref() == color
    }

    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Pricing shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub item_count: u32,
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_amount: Price,
    pub is_open: bool,
}

impl CartState {
    /// Rehydrate lines from persistence. Missing or malformed data yields an
    /// empty cart.
    pub fn initialize(&mut self, persistence: &Persistence) {
        self.items = persistence
            .load::<Vec<CartItem>>(keys::CART)
            .unwrap_or_default();
        self.recompute();
    }

    /// Add `quantity` of `product`.
    ///
    /// An existing line is incremented without checking stock; a new line
    /// takes the product's display image as-is.
    pub fn add_item(
        &mut self,
        product: &Product,
        quantity: u32,
        size: Option<String>,
        color: Option<String>,
    ) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|i| i.is_line(&product.id, size.as_deref(), color.as_deref()))
        {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                id: product.id.clone(),
                title: product.title.clone(),
                price: product.price,
                quantity,
                image: product.display_image(),
                brand: product.brand.clone(),
                slug: product.slug.clone(),
                stock: product.stock,
                size,
                color,
                product_data: product.clone(),
            });
        }
        self.recompute();
    }

    /// Remove a line. Returns `false` if there was no such line.
    pub fn remove_item(&mut self, id: &ProductId, size: Option<&str>, color: Option<&str>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.is_line(id, size, color));
        let removed = self.items.len() != before;
        self.recompute();
        removed
    }

    /// Set a line's quantity. Zero or less removes the line; anything else is
    /// capped at the line's stock. Unknown lines are ignored.
    pub fn set_quantity(
        &mut self,
        id: &ProductId,
        size: Option<&str>,
        color: Option<&str>,
        quantity: i64,
    ) -> bool {
        let Some(index) = self.items.iter().position(|i| i.is_line(id, size, color)) else {
            return false;
        };
        if quantity <= 0 {
            self.items.remove(index);
        } else if let Some(line) = self.items.get_mut(index) {
            let wanted = u32::try_from(quantity).unwrap_or(u32::MAX);
            line.quantity = wanted.min(line.stock);
        }
        self.recompute();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    pub const fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
    }

    pub const fn set_open(&mut self, open: bool) {
        self.is_open = open;
    }

    #[must_use]
    pub fn line(&self, id: &ProductId, size: Option<&str>, color: Option<&str>) -> Option<&CartItem> {
        self.items.iter().find(|i| i.is_line(id, size, color))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Subtotal plus flat shipping plus tax on the subtotal.
    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        let subtotal = self.total_amount;
        let tax = subtotal.scaled(TAX_RATE).rounded();
        CheckoutSummary {
            item_count: self.total_items,
            subtotal,
            shipping: SHIPPING_FLAT,
            tax,
            total: subtotal + SHIPPING_FLAT + tax,
        }
    }

    /// Order lines for the current cart.
    #[must_use]
    pub fn order_lines(&self) -> Vec<NewOrderLine> {
        self.items
            .iter()
            .map(|i| NewOrderLine {
                product_id: i.id.clone(),
                quantity: i.quantity,
                unit_price: i.price,
            })
            .collect()
    }

    /// Write the lines to persistence.
    pub fn persist(&self, persistence: &Persistence) {
        persistence.save(keys::CART, &self.items);
    }

    fn recompute(&mut self) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
    }
}
