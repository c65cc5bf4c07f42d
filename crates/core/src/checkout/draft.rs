//! Order draft arithmetic.
//!
//! The draft is the mutable order-in-progress: selected items, freight,
//! coupon discount, and the derived totals. Totals are recomputed by an
//! explicit [`OrderDraft::recompute`] call on each state-change event
//! (items changed, freight resolved, coupon applied) rather than tracked
//! reactively; every setter recomputes before returning.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, ProductId, VendorId};

/// One selected product in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftItem {
    pub product_id: ProductId,
    pub vendor_id: VendorId,
    pub quantity: u32,
    /// Price captured when the item was added; order submission snapshots
    /// this value.
    pub unit_price: Money,
}

impl DraftItem {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.scale(Decimal::from(self.quantity))
    }
}

/// The order being assembled during checkout.
///
/// `subtotal`, `discount`, and `total` are derived; they are only written
/// by [`Self::recompute`], which every setter calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    items: Vec<DraftItem>,
    freight: Money,
    /// Percentage taken off the subtotal by a coupon, e.g. `10` for 10%.
    coupon_percent: Option<Decimal>,
    subtotal: Money,
    discount: Money,
    total: Money,
}

impl OrderDraft {
    /// Empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft seeded with items.
    #[must_use]
    pub fn with_items(items: Vec<DraftItem>) -> Self {
        let mut draft = Self {
            items,
            ..Self::default()
        };
        draft.recompute();
        draft
    }

    #[must_use]
    pub fn items(&self) -> &[DraftItem] {
        &self.items
    }

    #[must_use]
    pub const fn freight(&self) -> Money {
        self.freight
    }

    #[must_use]
    pub const fn coupon_percent(&self) -> Option<Decimal> {
        self.coupon_percent
    }

    #[must_use]
    pub const fn subtotal(&self) -> Money {
        self.subtotal
    }

    #[must_use]
    pub const fn discount(&self) -> Money {
        self.discount
    }

    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the selected items.
    pub fn set_items(&mut self, items: Vec<DraftItem>) {
        self.items = items;
        self.recompute();
    }

    /// Record the resolved freight value.
    pub fn set_freight(&mut self, freight: Money) {
        self.freight = freight;
        self.recompute();
    }

    /// Apply or clear a percentage coupon.
    pub fn set_coupon_percent(&mut self, percent: Option<Decimal>) {
        self.coupon_percent = percent;
        self.recompute();
    }

    /// Recompute `subtotal`, `discount`, and `total` from current state.
    ///
    /// `subtotal` sums the item lines; `discount` applies the coupon
    /// percentage to the subtotal (never to freight), rounded to centavos;
    /// `total = subtotal - discount + freight`.
    pub fn recompute(&mut self) {
        self.subtotal = self.items.iter().map(DraftItem::line_total).sum();
        self.discount = self.coupon_percent.map_or(Money::ZERO, |percent| {
            self.subtotal
                .scale(percent / Decimal::ONE_HUNDRED)
                .round_centavos()
        });
        self.total = self.subtotal - self.discount + self.freight;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(product: i32, quantity: u32, unit_centavos: i64) -> DraftItem {
        DraftItem {
            product_id: ProductId::new(product),
            vendor_id: VendorId::new(1),
            quantity,
            unit_price: Money::from_centavos(unit_centavos),
        }
    }

    #[test]
    fn test_empty_draft_is_all_zero() {
        let draft = OrderDraft::new();
        assert!(draft.is_empty());
        assert_eq!(draft.subtotal(), Money::ZERO);
        assert_eq!(draft.total(), Money::ZERO);
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        let draft = OrderDraft::with_items(vec![item(1, 2, 4_000), item(2, 1, 5_000)]);
        // 2 * 40.00 + 50.00 = 130.00
        assert_eq!(draft.subtotal(), Money::from_reais(130));
        assert_eq!(draft.total(), Money::from_reais(130));
    }

    #[test]
    fn test_freight_adds_to_total() {
        let mut draft = OrderDraft::with_items(vec![item(1, 2, 4_000), item(2, 1, 5_000)]);
        draft.set_freight(Money::from_reais(20));

        assert_eq!(draft.subtotal(), Money::from_reais(130));
        assert_eq!(draft.total(), Money::from_reais(150));
    }

    #[test]
    fn test_coupon_discounts_subtotal_not_freight() {
        let mut draft = OrderDraft::with_items(vec![item(1, 1, 10_000)]);
        draft.set_freight(Money::from_reais(30));
        draft.set_coupon_percent(Some(Decimal::from(10)));

        // 10% of 100.00 = 10.00; freight untouched
        assert_eq!(draft.discount(), Money::from_reais(10));
        assert_eq!(draft.total(), Money::from_reais(120));
    }

    #[test]
    fn test_clearing_coupon_restores_total() {
        let mut draft = OrderDraft::with_items(vec![item(1, 1, 10_000)]);
        draft.set_coupon_percent(Some(Decimal::from(10)));
        assert_eq!(draft.total(), Money::from_reais(90));

        draft.set_coupon_percent(None);
        assert_eq!(draft.total(), Money::from_reais(100));
    }

    #[test]
    fn test_discount_rounds_to_centavos() {
        let mut draft = OrderDraft::with_items(vec![item(1, 1, 3_333)]);
        draft.set_coupon_percent(Some(Decimal::from(15)));

        // 15% of 33.33 = 4.9995 -> 5.00
        assert_eq!(draft.discount(), Money::from_reais(5));
        assert_eq!(draft.total(), Money::from_centavos(2_833));
    }

    #[test]
    fn test_set_items_recomputes() {
        let mut draft = OrderDraft::with_items(vec![item(1, 1, 10_000)]);
        draft.set_freight(Money::from_reais(20));

        draft.set_items(vec![item(2, 3, 1_000)]);
        assert_eq!(draft.subtotal(), Money::from_reais(30));
        assert_eq!(draft.total(), Money::from_reais(50));
    }
}
