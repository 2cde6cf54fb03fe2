//! The signed-in user's orders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shopfront_core::{OrderId, OrderStatus};

use super::OpStatus;
use crate::api::Order;

pub const FETCH_ORDERS_FAILED: &str = "Failed to fetch orders";
pub const CREATE_ORDER_FAILED: &str = "Failed to create order";
pub const CANCEL_ORDER_FAILED: &str = "Failed to cancel order";
pub const FETCH_DETAILS_FAILED: &str = "Failed to fetch order details";
pub const NOT_CANCELLABLE: &str = "Only pending orders can be cancelled";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrdersState {
    pub orders: Vec<Order>,
    pub selected_order: Option<Order>,
    pub fetch_orders: OpStatus,
    pub fetch_order_details: OpStatus,
    pub cancel_order: OpStatus,
    pub create_order: OpStatus,
    pub last_fetched: Option<DateTime<Utc>>,
}

impl OrdersState {
    /// Replace the list with a fresh fetch.
    pub fn replace(&mut self, orders: Vec<Order>, fetched_at: DateTime<Utc>) {
        self.orders = orders;
        self.last_fetched = Some(fetched_at);
    }

    /// Newly created orders go to the front.
    pub fn prepend(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// Mark `id` cancelled in the list and in the selected order.
    pub fn mark_cancelled(&mut self, id: OrderId) {
        for order in self.orders.iter_mut().filter(|o| o.id == id) {
            order.status = OrderStatus::Cancelled;
        }
        if let Some(selected) = self.selected_order.as_mut()
            && selected.id == id
        {
            selected.status = OrderStatus::Cancelled;
        }
    }

    /// The status the client currently knows for `id`, if any.
    #[must_use]
    pub fn known_status(&self, id: OrderId) -> Option<OrderStatus> {
        self.orders
            .iter()
            .chain(self.selected_order.iter())
            .find(|o| o.id == id)
            .map(|o| o.status)
    }

    /// Refuse to cancel an order known to be past `pending`.
    ///
    /// # Errors
    ///
    /// Returns the message to show when the order cannot be cancelled.
    pub fn ensure_cancellable(&self, id: OrderId) -> Result<(), &'static str> {
        match self.known_status(id) {
            Some(status) if !status.can_cancel() => Err(NOT_CANCELLABLE),
            _ => Ok(()),
        }
    }

    pub fn set_selected_order(&mut self, order: Option<Order>) {
        self.selected_order = order;
    }

    pub fn clear_selected_order(&mut self) {
        self.selected_order = None;
    }

    pub fn clear_errors(&mut self) {
        self.fetch_orders.error = None;
        self.fetch_order_details.error = None;
        self.cancel_order.error = None;
        self.create_order.error = None;
    }
}
