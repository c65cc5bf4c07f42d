//! Multi-method payment allocation for a single order.
//!
//! A checkout covers one order total with a combination of payment
//! instruments. The plan keeps the allocations consistent as the total
//! changes (freight recalculated after an address change) and gates
//! submission on exact balance.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Money, PaymentKind};

/// Default cash discount rate (5%).
pub const DEFAULT_CASH_DISCOUNT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Tolerance when comparing the allocated sum against the order total.
pub const BALANCE_EPSILON: Money = Money::new(Decimal::from_parts(1, 0, 0, false, 2));

/// Identifier of one allocation within a plan.
///
/// Random per allocation; never reused within a session, so removal by a
/// stale id is a harmless miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationId(Uuid);

impl AllocationId {
    /// Generate a fresh allocation id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for AllocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AllocationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for AllocationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// One payment method's share of the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    pub id: AllocationId,
    pub kind: PaymentKind,
    pub amount: Money,
}

impl PaymentAllocation {
    fn new(kind: PaymentKind, amount: Money) -> Self {
        Self {
            id: AllocationId::generate(),
            kind,
            amount,
        }
    }

    /// Human-readable method label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }
}

/// Errors from plan mutations.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanError {
    /// Removing this allocation would leave the plan empty.
    #[error("at least one payment method must remain")]
    LastMethod,
    /// No allocation with the given id exists.
    #[error("payment method not found")]
    UnknownMethod,
}

/// The set of payment allocations for one checkout session.
///
/// Invariants maintained by the mutation methods:
/// - at most one allocation per [`PaymentKind`]
/// - never less than one allocation once one exists
/// - `debito` allocations always equal the order total passed to the most
///   recent mutation that touched them
///
/// The plan does not store the order total; callers pass the current total
/// to each operation that needs it, because the total lives in the order
/// draft and changes underneath the plan (freight, coupons).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPlan {
    allocations: Vec<PaymentAllocation>,
    cash_discount_rate: Decimal,
}

impl Default for PaymentPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentPlan {
    /// Empty plan with the default 5% cash discount rate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allocations: Vec::new(),
            cash_discount_rate: DEFAULT_CASH_DISCOUNT_RATE,
        }
    }

    /// Empty plan with a custom cash discount rate.
    #[must_use]
    pub const fn with_cash_discount_rate(rate: Decimal) -> Self {
        Self {
            allocations: Vec::new(),
            cash_discount_rate: rate,
        }
    }

    /// The allocations in insertion order.
    #[must_use]
    pub fn allocations(&self) -> &[PaymentAllocation] {
        &self.allocations
    }

    /// The configured cash discount rate.
    #[must_use]
    pub const fn cash_discount_rate(&self) -> Decimal {
        self.cash_discount_rate
    }

    /// Sum of all allocated amounts.
    #[must_use]
    pub fn allocated_total(&self) -> Money {
        self.allocations.iter().map(|a| a.amount).sum()
    }

    /// Look up an allocation by id.
    #[must_use]
    pub fn allocation(&self, id: AllocationId) -> Option<&PaymentAllocation> {
        self.allocations.iter().find(|a| a.id == id)
    }

    /// Add a method of the given kind.
    ///
    /// Returns `None` without changing anything when the kind is already
    /// present. A fresh method starts at zero, except `debito`, which
    /// immediately takes the full current order total.
    pub fn add_method(&mut self, kind: PaymentKind, order_total: Money) -> Option<AllocationId> {
        if self.allocations.iter().any(|a| a.kind == kind) {
            return None;
        }

        let amount = if kind == PaymentKind::Debito {
            order_total
        } else {
            Money::ZERO
        };

        let allocation = PaymentAllocation::new(kind, amount);
        let id = allocation.id;
        self.allocations.push(allocation);
        Some(id)
    }

    /// Remove an allocation.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::LastMethod`] when the plan holds a single
    /// allocation; at least one method must always remain. Removing an id
    /// that is not present is a no-op.
    pub fn remove_method(&mut self, id: AllocationId) -> Result<(), PlanError> {
        if self.allocations.len() <= 1 {
            return Err(PlanError::LastMethod);
        }
        self.allocations.retain(|a| a.id != id);
        Ok(())
    }

    /// Set an allocation's amount.
    ///
    /// Negative amounts clamp to zero. For `debito` the requested amount is
    /// ignored and the allocation is set back to the full order total; the
    /// method is not user-adjustable.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownMethod`] when no allocation has the id.
    pub fn update_amount(
        &mut self,
        id: AllocationId,
        amount: Money,
        order_total: Money,
    ) -> Result<(), PlanError> {
        let allocation = self
            .allocations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(PlanError::UnknownMethod)?;

        allocation.amount = if allocation.kind == PaymentKind::Debito {
            order_total
        } else {
            amount.max_zero()
        };
        Ok(())
    }

    /// Spread the unallocated remainder over the methods already in use.
    ///
    /// `remaining = max(0, order_total - allocated_total)`. When no method
    /// has a positive amount, the first method takes the entire total and
    /// every other method is zeroed. Otherwise `remaining` is divided evenly
    /// across the methods whose amount is already positive and added to
    /// each; the last of those absorbs the sub-centavo residue so the sum
    /// lands exactly on the total.
    pub fn distribute_remaining(&mut self, order_total: Money) {
        let remaining = (order_total - self.allocated_total()).max_zero();

        let positive: Vec<usize> = self
            .allocations
            .iter()
            .enumerate()
            .filter(|(_, a)| a.amount.is_positive())
            .map(|(i, _)| i)
            .collect();

        if positive.is_empty() {
            // Nothing allocated yet: everything goes to the first method.
            let mut iter = self.allocations.iter_mut();
            if let Some(first) = iter.next() {
                first.amount = order_total;
            }
            for rest in iter {
                rest.amount = Money::ZERO;
            }
            return;
        }

        if remaining.is_zero() {
            return;
        }

        let count = u32::try_from(positive.len()).unwrap_or(u32::MAX);
        let share = remaining
            .split(count)
            .unwrap_or(Money::ZERO)
            .round_centavos();

        let mut handed_out = Money::ZERO;
        let last = positive.len() - 1;
        for (pos, index) in positive.into_iter().enumerate() {
            if let Some(allocation) = self.allocations.get_mut(index) {
                let add = if pos == last {
                    remaining - handed_out
                } else {
                    handed_out += share;
                    share
                };
                allocation.amount += add;
            }
        }
    }

    /// Replace an allocation's amount with `amount * (1 - rate)`.
    ///
    /// One-way per call; applying it again compounds the discount. Returns
    /// the new amount.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::UnknownMethod`] when no allocation has the id.
    pub fn apply_cash_discount(&mut self, id: AllocationId) -> Result<Money, PlanError> {
        let rate = self.cash_discount_rate;
        let allocation = self
            .allocations
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(PlanError::UnknownMethod)?;

        allocation.amount = allocation
            .amount
            .scale(Decimal::ONE - rate)
            .round_centavos();
        Ok(allocation.amount)
    }

    /// Whether the order can be submitted.
    ///
    /// True iff an address is selected, at least one method has a positive
    /// amount, and the allocated sum matches the order total within
    /// [`BALANCE_EPSILON`].
    #[must_use]
    pub fn can_submit(&self, address_selected: bool, order_total: Money) -> bool {
        if !address_selected {
            return false;
        }
        if !self.allocations.iter().any(|a| a.amount.is_positive()) {
            return false;
        }
        (self.allocated_total() - order_total).abs() <= BALANCE_EPSILON
    }

    /// React to an order-total change (freight recalculated, coupon
    /// applied): `pix` and `debito` allocations reset to the new total,
    /// every other kind is left untouched.
    ///
    /// The resulting sum may no longer balance; that transient state is
    /// legal and user-visible, to be resolved by manual edits or
    /// [`Self::distribute_remaining`].
    pub fn rebalance_for_total(&mut self, new_total: Money) {
        for allocation in &mut self.allocations {
            if matches!(allocation.kind, PaymentKind::Pix | PaymentKind::Debito) {
                allocation.amount = new_total;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reais(value: i64) -> Money {
        Money::from_reais(value)
    }

    fn centavos(value: i64) -> Money {
        Money::from_centavos(value)
    }

    #[test]
    fn test_add_method_starts_at_zero() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, Money::ZERO);
    }

    #[test]
    fn test_add_method_duplicate_kind_is_noop() {
        let mut plan = PaymentPlan::new();
        plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        assert!(plan.add_method(PaymentKind::Pix, reais(150)).is_none());
        assert_eq!(plan.allocations().len(), 1);
    }

    #[test]
    fn test_add_debito_takes_full_total() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Debito, reais(150)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, reais(150));
    }

    #[test]
    fn test_remove_method_keeps_at_least_one() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        assert_eq!(plan.remove_method(pix), Err(PlanError::LastMethod));

        let boleto = plan.add_method(PaymentKind::Boleto, reais(100)).unwrap();
        plan.remove_method(pix).unwrap();
        assert_eq!(plan.allocations().len(), 1);
        assert_eq!(plan.allocations()[0].id, boleto);

        // Back down to one: refuse again, even for an unknown id.
        assert_eq!(
            plan.remove_method(AllocationId::generate()),
            Err(PlanError::LastMethod)
        );
    }

    #[test]
    fn test_remove_unknown_id_with_multiple_methods_is_noop() {
        let mut plan = PaymentPlan::new();
        plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        plan.add_method(PaymentKind::Boleto, reais(100)).unwrap();
        plan.remove_method(AllocationId::generate()).unwrap();
        assert_eq!(plan.allocations().len(), 2);
    }

    #[test]
    fn test_update_amount_clamps_negative() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Cartao, reais(100)).unwrap();
        plan.update_amount(id, reais(-30), reais(100)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, Money::ZERO);
    }

    #[test]
    fn test_update_amount_debito_always_full_total() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Debito, reais(150)).unwrap();

        plan.update_amount(id, reais(10), reais(150)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, reais(150));

        plan.update_amount(id, reais(999), reais(150)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, reais(150));

        plan.update_amount(id, Money::ZERO, reais(150)).unwrap();
        assert_eq!(plan.allocation(id).unwrap().amount, reais(150));
    }

    #[test]
    fn test_update_amount_unknown_id() {
        let mut plan = PaymentPlan::new();
        plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        assert_eq!(
            plan.update_amount(AllocationId::generate(), reais(10), reais(100)),
            Err(PlanError::UnknownMethod)
        );
    }

    #[test]
    fn test_distribute_remaining_no_positive_gives_all_to_first() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        let cartao = plan.add_method(PaymentKind::Cartao, reais(150)).unwrap();

        plan.distribute_remaining(reais(150));

        assert_eq!(plan.allocation(pix).unwrap().amount, reais(150));
        assert_eq!(plan.allocation(cartao).unwrap().amount, Money::ZERO);
        assert_eq!(plan.allocated_total(), reais(150));
    }

    #[test]
    fn test_distribute_remaining_splits_over_positive_methods() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        let cartao = plan.add_method(PaymentKind::Cartao, reais(150)).unwrap();
        let boleto = plan.add_method(PaymentKind::Boleto, reais(150)).unwrap();

        plan.update_amount(pix, reais(40), reais(150)).unwrap();
        plan.update_amount(cartao, reais(40), reais(150)).unwrap();
        // boleto stays at zero and must not receive a share

        plan.distribute_remaining(reais(150));

        assert_eq!(plan.allocation(pix).unwrap().amount, reais(75));
        assert_eq!(plan.allocation(cartao).unwrap().amount, reais(75));
        assert_eq!(plan.allocation(boleto).unwrap().amount, Money::ZERO);
        assert_eq!(plan.allocated_total(), reais(150));
    }

    #[test]
    fn test_distribute_remaining_residue_lands_on_last_positive() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, centavos(10_000)).unwrap();
        let cartao = plan
            .add_method(PaymentKind::Cartao, centavos(10_000))
            .unwrap();
        let boleto = plan
            .add_method(PaymentKind::Boleto, centavos(10_000))
            .unwrap();

        for id in [pix, cartao, boleto] {
            plan.update_amount(id, centavos(1), centavos(10_000)).unwrap();
        }

        // remaining = 99.97, split 3 ways = 33.323... -> 33.32 / 33.32 / 33.33
        plan.distribute_remaining(centavos(10_000));

        assert_eq!(plan.allocation(pix).unwrap().amount, centavos(3_333));
        assert_eq!(plan.allocation(cartao).unwrap().amount, centavos(3_333));
        assert_eq!(plan.allocation(boleto).unwrap().amount, centavos(3_334));
        assert_eq!(plan.allocated_total(), centavos(10_000));
    }

    #[test]
    fn test_distribute_remaining_sum_invariant() {
        // Property: whenever a positive method exists beforehand, the sum
        // lands exactly on the order total.
        let totals = [centavos(15_000), centavos(9_999), centavos(10_001)];
        let seeds = [centavos(1), centavos(4_000), centavos(7_777)];

        for total in totals {
            for seed in seeds {
                let mut plan = PaymentPlan::new();
                let pix = plan.add_method(PaymentKind::Pix, total).unwrap();
                plan.add_method(PaymentKind::Cartao, total).unwrap();
                plan.update_amount(pix, seed, total).unwrap();

                plan.distribute_remaining(total);
                assert_eq!(plan.allocated_total(), total, "total={total:?} seed={seed:?}");
            }
        }
    }

    #[test]
    fn test_distribute_remaining_overallocated_adds_nothing() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        plan.update_amount(pix, reais(120), reais(100)).unwrap();

        plan.distribute_remaining(reais(100));

        // remaining clamps to zero; the plan stays over-allocated
        assert_eq!(plan.allocation(pix).unwrap().amount, reais(120));
    }

    #[test]
    fn test_cash_discount_applies_rate() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        plan.update_amount(id, reais(100), reais(100)).unwrap();

        let after = plan.apply_cash_discount(id).unwrap();
        assert_eq!(after, reais(95));
    }

    #[test]
    fn test_cash_discount_compounds_on_reapply() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        plan.update_amount(id, reais(100), reais(100)).unwrap();

        plan.apply_cash_discount(id).unwrap();
        let after_second = plan.apply_cash_discount(id).unwrap();
        // 100 * 0.95 * 0.95 = 90.25
        assert_eq!(after_second, centavos(9_025));
    }

    #[test]
    fn test_cash_discount_rounds_to_centavos() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(100)).unwrap();
        plan.update_amount(id, centavos(3_333), reais(100)).unwrap();

        // 33.33 * 0.95 = 31.6635 -> 31.66
        let after = plan.apply_cash_discount(id).unwrap();
        assert_eq!(after, centavos(3_166));
    }

    #[test]
    fn test_can_submit_requires_address() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        plan.update_amount(id, reais(150), reais(150)).unwrap();

        assert!(!plan.can_submit(false, reais(150)));
        assert!(plan.can_submit(true, reais(150)));
    }

    #[test]
    fn test_can_submit_requires_positive_method() {
        let mut plan = PaymentPlan::new();
        plan.add_method(PaymentKind::Pix, Money::ZERO).unwrap();
        // Sum (0) equals total (0), but no method is positive.
        assert!(!plan.can_submit(true, Money::ZERO));
    }

    #[test]
    fn test_can_submit_epsilon_boundary() {
        let mut plan = PaymentPlan::new();
        let id = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();

        plan.update_amount(id, centavos(14_999), reais(150)).unwrap();
        assert!(plan.can_submit(true, reais(150)), "one centavo under");

        plan.update_amount(id, centavos(15_001), reais(150)).unwrap();
        assert!(plan.can_submit(true, reais(150)), "one centavo over");

        plan.update_amount(id, centavos(14_998), reais(150)).unwrap();
        assert!(!plan.can_submit(true, reais(150)), "two centavos under");
    }

    #[test]
    fn test_rebalance_resets_pix_and_debito_only() {
        let mut plan = PaymentPlan::new();
        let pix = plan.add_method(PaymentKind::Pix, reais(150)).unwrap();
        let cartao = plan.add_method(PaymentKind::Cartao, reais(150)).unwrap();
        let debito = plan.add_method(PaymentKind::Debito, reais(150)).unwrap();

        plan.update_amount(pix, reais(50), reais(150)).unwrap();
        plan.update_amount(cartao, reais(100), reais(150)).unwrap();

        // Freight changed: total is now 170.
        plan.rebalance_for_total(reais(170));

        assert_eq!(plan.allocation(pix).unwrap().amount, reais(170));
        assert_eq!(plan.allocation(debito).unwrap().amount, reais(170));
        assert_eq!(plan.allocation(cartao).unwrap().amount, reais(100));

        // Transient imbalance is legal; submission is gated, not the state.
        assert!(!plan.can_submit(true, reais(170)));
    }
}
