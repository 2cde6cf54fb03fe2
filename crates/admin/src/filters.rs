//! Dashboard list filters.

use shopfront_core::OrderStatus;
use shopfront_storefront::api::{Order, Product};

/// Products whose title, slug or brand contains `query`, ignoring case.
/// A blank query matches everything.
#[must_use]
pub fn filter_products<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let query = query.trim().to_lowercase();
    products
        .iter()
        .filter(|p| {
            query.is_empty()
                || [&p.title, &p.slug, &p.brand]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

/// Order list filter: a status (or all) plus free-text search over the order
/// id and the customer's name and email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub query: String,
}

impl OrderFilter {
    #[must_use]
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|status| order.status == status) && self.matches_query(order)
    }

    fn matches_query(&self, order: &Order) -> bool {
        let query = self.query.trim();
        if query.is_empty() {
            return true;
        }
        if order.id.to_string().contains(query) {
            return true;
        }
        let query = query.to_lowercase();
        order.user.as_ref().is_some_and(|user| {
            user.name.to_lowercase().contains(&query) || user.email.to_lowercase().contains(&query)
        })
    }

    #[must_use]
    pub fn apply<'a>(&self, orders: &'a [Order]) -> Vec<&'a Order> {
        orders.iter().filter(|o| self.matches(o)).collect()
    }
}
