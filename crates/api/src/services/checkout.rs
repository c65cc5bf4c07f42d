//! Server-side checkout sessions.
//!
//! One session per client holds the order draft, the payment split plan,
//! the selected address, and the freight quote state. Freight fetches are
//! guarded by a per-session generation counter: every address change bumps
//! the counter, and a quote that lands after another address change is
//! thrown away instead of overwriting newer state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use helpnet_core::{
    AllocationId, ClientId, CouponId, DraftItem, Money, OrderDraft, PaymentAllocation,
    PaymentKind, PaymentPlan, PlanError, ProductId,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::db::addresses::Address;
use crate::services::freight::{FreightClient, FreightError, FreightOption, cheapest_index};

/// A coupon already validated against the database and applied to the draft.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedCoupon {
    pub id: CouponId,
    pub code: String,
    /// Whole percent, e.g. 15 means 15% off the subtotal
    pub discount_percent: Decimal,
}

/// Where the freight quote for the selected address stands.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FreightState {
    /// No address selected yet
    NotRequested,
    /// Quote in flight
    Pending,
    /// Quote arrived; `selected` indexes the cheapest option
    Resolved {
        options: Vec<FreightOption>,
        selected: usize,
    },
    /// Quote failed; checkout stays usable with freight zero
    Failed { message: String },
}

/// One client's in-progress checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub draft: OrderDraft,
    pub plan: PaymentPlan,
    pub address: Option<Address>,
    pub coupon: Option<AppliedCoupon>,
    pub freight: FreightState,
    freight_generation: u64,
}

impl CheckoutSession {
    fn new() -> Self {
        Self {
            draft: OrderDraft::new(),
            plan: PaymentPlan::new(),
            address: None,
            coupon: None,
            freight: FreightState::NotRequested,
            freight_generation: 0,
        }
    }

    /// Current freight generation, for pairing with a later quote result.
    #[must_use]
    pub const fn freight_generation(&self) -> u64 {
        self.freight_generation
    }
}

/// Why a submission was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("no delivery address selected")]
    NoAddress,

    #[error("payment allocations do not cover the order total")]
    Unbalanced,
}

/// Everything the order writer needs, cloned out of the session.
#[derive(Debug, Clone)]
pub struct SubmissionData {
    pub draft: OrderDraft,
    pub allocations: Vec<PaymentAllocation>,
    pub address: Address,
    pub coupon: Option<AppliedCoupon>,
    /// Name of the freight option the totals were computed with
    pub freight_service: Option<String>,
}

/// Shared store of checkout sessions, cloneable into spawned tasks.
#[derive(Clone)]
pub struct CheckoutService {
    sessions: Arc<Mutex<HashMap<ClientId, CheckoutSession>>>,
    freight: FreightClient,
}

impl CheckoutService {
    #[must_use]
    pub fn new(freight: FreightClient) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            freight,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, CheckoutSession>> {
        // Session data is plain state, a poisoned lock is still usable
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_session<R>(
        &self,
        client_id: ClientId,
        f: impl FnOnce(&mut CheckoutSession) -> R,
    ) -> R {
        let mut map = self.lock();
        let session = map.entry(client_id).or_insert_with(CheckoutSession::new);
        f(session)
    }

    /// Current session state, creating an empty session on first touch.
    #[must_use]
    pub fn snapshot(&self, client_id: ClientId) -> CheckoutSession {
        self.with_session(client_id, |session| session.clone())
    }

    /// Replace the draft items. Totals recompute; the payment plan keeps its
    /// amounts until the client redistributes.
    pub fn set_items(&self, client_id: ClientId, items: Vec<DraftItem>) -> CheckoutSession {
        self.with_session(client_id, |session| {
            session.draft.set_items(items);
            session.clone()
        })
    }

    /// Select the delivery address. Marks the freight quote pending and bumps
    /// the generation; the caller spawns [`Self::fetch_and_apply_freight`]
    /// with the returned generation.
    pub fn set_address(&self, client_id: ClientId, address: Address) -> (CheckoutSession, u64) {
        self.with_session(client_id, |session| {
            session.address = Some(address);
            session.freight_generation += 1;
            session.freight = FreightState::Pending;
            (session.clone(), session.freight_generation)
        })
    }

    /// Apply or clear a coupon. Totals recompute; the plan keeps its amounts.
    pub fn set_coupon(
        &self,
        client_id: ClientId,
        coupon: Option<AppliedCoupon>,
    ) -> CheckoutSession {
        self.with_session(client_id, |session| {
            session
                .draft
                .set_coupon_percent(coupon.as_ref().map(|c| c.discount_percent));
            session.coupon = coupon;
            session.clone()
        })
    }

    /// Add a payment method. Duplicates are silently ignored.
    pub fn add_method(
        &self,
        client_id: ClientId,
        kind: PaymentKind,
    ) -> (Option<AllocationId>, CheckoutSession) {
        self.with_session(client_id, |session| {
            let total = session.draft.total();
            let id = session.plan.add_method(kind, total);
            (id, session.clone())
        })
    }

    /// Set one allocation's amount.
    pub fn update_amount(
        &self,
        client_id: ClientId,
        id: AllocationId,
        amount: Money,
    ) -> Result<CheckoutSession, PlanError> {
        self.with_session(client_id, |session| {
            let total = session.draft.total();
            session.plan.update_amount(id, amount, total)?;
            Ok(session.clone())
        })
    }

    /// Remove a payment method. The last one cannot be removed.
    pub fn remove_method(
        &self,
        client_id: ClientId,
        id: AllocationId,
    ) -> Result<CheckoutSession, PlanError> {
        self.with_session(client_id, |session| {
            session.plan.remove_method(id)?;
            Ok(session.clone())
        })
    }

    /// Spread the unallocated remainder across the positive allocations.
    pub fn distribute(&self, client_id: ClientId) -> CheckoutSession {
        self.with_session(client_id, |session| {
            let total = session.draft.total();
            session.plan.distribute_remaining(total);
            session.clone()
        })
    }

    /// Apply the one-way cash discount to one allocation.
    pub fn apply_cash_discount(
        &self,
        client_id: ClientId,
        id: AllocationId,
    ) -> Result<CheckoutSession, PlanError> {
        self.with_session(client_id, |session| {
            session.plan.apply_cash_discount(id)?;
            Ok(session.clone())
        })
    }

    /// Fetch a freight quote for the session as it stood at `generation` and
    /// apply the outcome. Runs in a spawned task.
    pub async fn fetch_and_apply_freight(&self, client_id: ClientId, generation: u64) {
        let Some((cep, items)) = self.with_session(client_id, |session| {
            if session.freight_generation != generation {
                return None;
            }
            let address = session.address.as_ref()?;
            let items: Vec<(ProductId, u32)> = session
                .draft
                .items()
                .iter()
                .map(|item| (item.product_id, item.quantity))
                .collect();
            Some((address.cep.clone(), items))
        }) else {
            return;
        };

        let result = self.freight.quote(&cep, &items).await;
        self.apply_freight_result(client_id, generation, result);
    }

    /// Apply a quote outcome, unless the session has moved on to a newer
    /// generation in the meantime.
    pub fn apply_freight_result(
        &self,
        client_id: ClientId,
        generation: u64,
        result: Result<Vec<FreightOption>, FreightError>,
    ) {
        let mut map = self.lock();
        let Some(session) = map.get_mut(&client_id) else {
            return;
        };
        if session.freight_generation != generation {
            tracing::debug!(%client_id, generation, "discarding stale freight quote");
            return;
        }

        match result {
            Ok(options) => {
                let selected = cheapest_index(&options);
                let price = options.get(selected).map_or(Money::ZERO, |o| o.price);
                session.draft.set_freight(price);
                session.freight = FreightState::Resolved { options, selected };
            }
            Err(e) => {
                tracing::warn!(%client_id, error = %e, "freight quote failed");
                session.draft.set_freight(Money::ZERO);
                session.freight = FreightState::Failed {
                    message: "Não foi possível calcular o frete. Tente novamente.".to_string(),
                };
            }
        }

        // Freight changed the total, so PIX and debit re-cover it
        let total = session.draft.total();
        session.plan.rebalance_for_total(total);
    }

    /// Validate the session and clone out everything submission needs.
    /// The session itself stays untouched until [`Self::clear`].
    pub fn prepare_submission(&self, client_id: ClientId) -> Result<SubmissionData, SubmitError> {
        self.with_session(client_id, |session| {
            if session.draft.is_empty() {
                return Err(SubmitError::EmptyCart);
            }
            let Some(address) = session.address.clone() else {
                return Err(SubmitError::NoAddress);
            };
            if !session.plan.can_submit(true, session.draft.total()) {
                return Err(SubmitError::Unbalanced);
            }

            let freight_service = match &session.freight {
                FreightState::Resolved { options, selected } => {
                    options.get(*selected).map(|o| o.service.clone())
                }
                _ => None,
            };

            Ok(SubmissionData {
                draft: session.draft.clone(),
                allocations: session.plan.allocations().to_vec(),
                address,
                coupon: session.coupon.clone(),
                freight_service,
            })
        })
    }

    /// Drop a session. Called after a successful submission or an explicit
    /// abandon. Unknown clients are a no-op.
    pub fn clear(&self, client_id: ClientId) {
        self.lock().remove(&client_id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use helpnet_core::{AddressId, Cep, VendorId};

    fn service() -> CheckoutService {
        // Quotes in tests are applied manually, the URL is never contacted
        CheckoutService::new(FreightClient::new("http://127.0.0.1:9"))
    }

    fn client() -> ClientId {
        ClientId::new(1)
    }

    fn address() -> Address {
        Address {
            id: AddressId::new(10),
            client_id: client(),
            label: "Casa".to_string(),
            cep: Cep::parse("01310-100").unwrap(),
            street: "Avenida Paulista".to_string(),
            number: "1578".to_string(),
            complement: None,
            district: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            is_default: true,
        }
    }

    fn item(product: i32, quantity: u32, reais: i64) -> DraftItem {
        DraftItem {
            product_id: ProductId::new(product),
            vendor_id: VendorId::new(1),
            quantity,
            unit_price: Money::from_reais(reais),
        }
    }

    fn freight_option(service: &str, reais: i64) -> FreightOption {
        FreightOption {
            service: service.to_string(),
            price: Money::from_reais(reais),
            deadline_days: 4,
        }
    }

    #[test]
    fn test_snapshot_creates_empty_session() {
        let checkout = service();
        let session = checkout.snapshot(client());
        assert!(session.draft.is_empty());
        assert!(session.plan.allocations().is_empty());
        assert!(session.address.is_none());
        assert!(matches!(session.freight, FreightState::NotRequested));
    }

    #[test]
    fn test_set_address_bumps_generation_and_marks_pending() {
        let checkout = service();
        let (first, gen_one) = checkout.set_address(client(), address());
        assert_eq!(gen_one, 1);
        assert!(matches!(first.freight, FreightState::Pending));

        let (_, gen_two) = checkout.set_address(client(), address());
        assert_eq!(gen_two, 2);
    }

    #[test]
    fn test_stale_freight_result_is_discarded() {
        let checkout = service();
        checkout.set_items(client(), vec![item(1, 1, 100)]);
        let (_, old_gen) = checkout.set_address(client(), address());
        let (_, new_gen) = checkout.set_address(client(), address());

        checkout.apply_freight_result(client(), old_gen, Ok(vec![freight_option("PAC", 99)]));
        let session = checkout.snapshot(client());
        // Still pending, the late quote belonged to the previous address
        assert!(matches!(session.freight, FreightState::Pending));
        assert_eq!(session.draft.freight(), Money::ZERO);

        checkout.apply_freight_result(client(), new_gen, Ok(vec![freight_option("PAC", 20)]));
        let session = checkout.snapshot(client());
        assert_eq!(session.draft.freight(), Money::from_reais(20));
    }

    #[test]
    fn test_freight_resolution_picks_cheapest_and_rebalances_pix() {
        let checkout = service();
        checkout.set_items(client(), vec![item(1, 1, 100)]);
        checkout.add_method(client(), PaymentKind::Pix);
        checkout.distribute(client());

        let (_, generation) = checkout.set_address(client(), address());
        checkout.apply_freight_result(
            client(),
            generation,
            Ok(vec![freight_option("Sedex", 40), freight_option("PAC", 15)]),
        );

        let session = checkout.snapshot(client());
        let FreightState::Resolved { options, selected } = &session.freight else {
            panic!("freight should be resolved");
        };
        assert_eq!(options.get(*selected).unwrap().service, "PAC");
        assert_eq!(session.draft.total(), Money::from_reais(115));

        // PIX covers the new total without a manual redistribute
        let pix = session.plan.allocations().first().unwrap();
        assert_eq!(pix.amount, Money::from_reais(115));
    }

    #[test]
    fn test_freight_failure_keeps_checkout_usable() {
        let checkout = service();
        checkout.set_items(client(), vec![item(1, 2, 50)]);
        let (_, generation) = checkout.set_address(client(), address());

        checkout.apply_freight_result(client(), generation, Err(FreightError::NoOptions));

        let session = checkout.snapshot(client());
        assert!(matches!(session.freight, FreightState::Failed { .. }));
        assert_eq!(session.draft.freight(), Money::ZERO);
        assert_eq!(session.draft.total(), Money::from_reais(100));
    }

    #[test]
    fn test_prepare_submission_gates() {
        let checkout = service();
        assert_eq!(
            checkout.prepare_submission(client()).unwrap_err(),
            SubmitError::EmptyCart
        );

        checkout.set_items(client(), vec![item(1, 1, 100)]);
        assert_eq!(
            checkout.prepare_submission(client()).unwrap_err(),
            SubmitError::NoAddress
        );

        let (_, generation) = checkout.set_address(client(), address());
        checkout.apply_freight_result(client(), generation, Err(FreightError::NoOptions));
        assert_eq!(
            checkout.prepare_submission(client()).unwrap_err(),
            SubmitError::Unbalanced
        );

        checkout.add_method(client(), PaymentKind::Boleto);
        checkout.distribute(client());
        let data = checkout.prepare_submission(client()).unwrap();
        assert_eq!(data.draft.total(), Money::from_reais(100));
        assert_eq!(data.allocations.len(), 1);
        assert!(data.freight_service.is_none());

        // Preparing does not consume the session
        assert!(checkout.prepare_submission(client()).is_ok());
    }

    #[test]
    fn test_clear_forgets_the_session() {
        let checkout = service();
        checkout.set_items(client(), vec![item(1, 1, 10)]);
        checkout.clear(client());
        assert!(checkout.snapshot(client()).draft.is_empty());
        // Clearing an unknown client is a no-op
        checkout.clear(ClientId::new(999));
    }

    #[test]
    fn test_coupon_changes_totals_but_not_allocations() {
        let checkout = service();
        checkout.set_items(client(), vec![item(1, 1, 200)]);
        checkout.add_method(client(), PaymentKind::Cartao);
        checkout.distribute(client());

        let session = checkout.set_coupon(
            client(),
            Some(AppliedCoupon {
                id: CouponId::new(5),
                code: "DEZ".to_string(),
                discount_percent: Decimal::new(10, 0),
            }),
        );

        assert_eq!(session.draft.total(), Money::from_reais(180));
        // The card allocation still holds the old total until redistribution
        let card = session.plan.allocations().first().unwrap();
        assert_eq!(card.amount, Money::from_reais(200));
        assert!(!session.plan.can_submit(true, session.draft.total()));
    }

    #[test]
    fn test_freight_state_wire_format() {
        // The front end switches on the `status` tag
        let pending = serde_json::to_value(FreightState::Pending).unwrap();
        assert_eq!(pending["status"], "pending");

        let resolved = serde_json::to_value(FreightState::Resolved {
            options: vec![freight_option("PAC", 20)],
            selected: 0,
        })
        .unwrap();
        assert_eq!(resolved["status"], "resolved");
        assert_eq!(resolved["options"][0]["service"], "PAC");
        assert_eq!(resolved["options"][0]["price"], "20");

        let failed = serde_json::to_value(FreightState::Failed {
            message: "sem cobertura".to_string(),
        })
        .unwrap();
        assert_eq!(failed["status"], "failed");
        assert_eq!(failed["message"], "sem cobertura");
    }
}
