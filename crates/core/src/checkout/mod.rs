//! Checkout arithmetic: payment allocation, installments, order drafts.
//!
//! Everything here is pure state plus arithmetic. The API crate owns the
//! sessions that hold these values and decides when each operation runs;
//! this module only guarantees the bookkeeping rules:
//!
//! - one allocation per payment kind, at least one allocation at all times
//! - `debito` always covers the full order total
//! - submission requires the allocations to balance the total within one
//!   centavo
//!
//! See [`plan::PaymentPlan`] for the allocation rules, [`installments`] for
//! the credit-card installment table, and [`draft::OrderDraft`] for the
//! subtotal/freight/discount/total arithmetic.

pub mod draft;
pub mod installments;
pub mod plan;

pub use draft::{DraftItem, OrderDraft};
pub use installments::{InstallmentPlan, MAX_INSTALLMENTS, MIN_INSTALLMENTS, installment_plans};
pub use plan::{
    AllocationId, BALANCE_EPSILON, DEFAULT_CASH_DISCOUNT_RATE, PaymentAllocation, PaymentPlan,
    PlanError,
};
