//! Stock reconciliation.

/// Pick the authoritative stock figure for a product.
///
/// Depending on API version a product carries a flat `stock` field, a nested
/// `inventory.quantity`, or both. The nested quantity wins, then the flat
/// field, then zero. Negative figures count as zero.
#[must_use]
pub fn reconcile_stock(flat: Option<i64>, inventory_quantity: Option<i64>) -> u32 {
    inventory_quantity
        .or(flat)
        .map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_quantity_wins() {
        assert_eq!(reconcile_stock(Some(10), Some(3)), 3);
        assert_eq!(reconcile_stock(None, Some(0)), 0);
    }

    #[test]
    fn test_flat_stock_fallback() {
        assert_eq!(reconcile_stock(Some(7), None), 7);
    }

    #[test]
    fn test_missing_and_negative() {
        assert_eq!(reconcile_stock(None, None), 0);
        assert_eq!(reconcile_stock(Some(-4), None), 0);
    }
}
