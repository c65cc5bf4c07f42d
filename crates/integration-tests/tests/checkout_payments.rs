//! Payment split, installment, and receipt behavior.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, NaiveDate, Utc};
use helpnet_api::db::addresses::Address;
use helpnet_api::services::checkout::CheckoutService;
use helpnet_api::services::freight::{FreightClient, FreightOption};
use helpnet_api::services::receipts;
use helpnet_core::{
    AddressId, Cep, ClientId, DraftItem, MAX_INSTALLMENTS, MIN_INSTALLMENTS, Money, PaymentKind,
    PaymentPlan, ProductId, VendorId, installment_plans,
};

fn service() -> CheckoutService {
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

fn item(product: i32, quantity: u32, unit_centavos: i64) -> DraftItem {
    DraftItem {
        product_id: ProductId::new(product),
        vendor_id: VendorId::new(1),
        quantity,
        unit_price: Money::from_centavos(unit_centavos),
    }
}

fn fixed_now() -> DateTime<Utc> {
    "2026-08-01T12:00:00Z".parse().unwrap()
}

#[test]
fn test_installment_table_covers_all_offered_counts() {
    let plans: Vec<_> = installment_plans(Money::from_centavos(89_550)).collect();

    let counts: Vec<u32> = plans.iter().map(|p| p.count).collect();
    let expected: Vec<u32> = (MIN_INSTALLMENTS..=MAX_INSTALLMENTS).collect();
    assert_eq!(counts, expected);

    // Each row's total drifts from the financed amount by at most half a
    // centavo per installment of rounding.
    for plan in &plans {
        let drift = (plan.total - Money::from_centavos(89_550)).abs();
        assert!(
            drift <= Money::from_centavos(i64::from(plan.count)),
            "count {} drifted {drift}",
            plan.count
        );
    }
}

#[test]
fn test_only_credit_card_offers_installments() {
    assert!(PaymentKind::Cartao.supports_installments());
    for kind in [PaymentKind::Pix, PaymentKind::Debito, PaymentKind::Boleto] {
        assert!(!kind.supports_installments());
    }
}

#[test]
fn test_receipts_populate_only_their_kind_fields() {
    let pix = receipts::generate(PaymentKind::Pix, fixed_now());
    assert!(pix.pix_code.is_some());
    assert!(pix.boleto_line.is_none());
    assert!(pix.boleto_due_date.is_none());
    assert!(pix.card_authorization.is_none());

    let boleto = receipts::generate(PaymentKind::Boleto, fixed_now());
    assert!(boleto.boleto_line.is_some());
    assert_eq!(
        boleto.boleto_due_date,
        Some("2026-08-04".parse::<NaiveDate>().unwrap())
    );
    assert!(boleto.pix_code.is_none());

    for kind in [PaymentKind::Cartao, PaymentKind::Debito] {
        let card = receipts::generate(kind, fixed_now());
        assert!(card.card_authorization.is_some());
        assert!(card.pix_code.is_none());
        assert!(card.boleto_line.is_none());
    }
}

#[test]
fn test_debito_always_pins_to_the_current_total() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 2, 4_000), item(2, 1, 5_000)]);

    let (debito, session) = checkout.add_method(client(), PaymentKind::Debito);
    let debito = debito.unwrap();
    // Debit takes the full total the moment it is added.
    assert_eq!(session.plan.allocated_total(), Money::from_reais(130));

    // A manual amount is ignored for debit.
    let session = checkout
        .update_amount(client(), debito, Money::from_reais(10))
        .unwrap();
    assert_eq!(
        session.plan.allocation(debito).unwrap().amount,
        Money::from_reais(130)
    );

    // Freight moves the total; debit follows.
    let (_, generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(
        client(),
        generation,
        Ok(vec![FreightOption {
            service: "PAC".to_string(),
            price: Money::from_reais(20),
            deadline_days: 8,
        }]),
    );
    let session = checkout.snapshot(client());
    assert_eq!(
        session.plan.allocation(debito).unwrap().amount,
        Money::from_reais(150)
    );
    assert!(checkout.prepare_submission(client()).is_ok());
}

#[test]
fn test_zero_amount_method_does_not_block_submission() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 1, 10_000)]);
    let (_, generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(
        client(),
        generation,
        Ok(vec![FreightOption {
            service: "PAC".to_string(),
            price: Money::from_reais(20),
            deadline_days: 8,
        }]),
    );

    let (pix, _) = checkout.add_method(client(), PaymentKind::Pix);
    checkout.add_method(client(), PaymentKind::Cartao);
    checkout
        .update_amount(client(), pix.unwrap(), Money::from_reais(120))
        .unwrap();

    // The card method sits at zero; the plan still balances and submits.
    let data = checkout.prepare_submission(client()).unwrap();
    assert_eq!(data.allocations.len(), 2);
    let zeroed = data
        .allocations
        .iter()
        .filter(|a| !a.amount.is_positive())
        .count();
    assert_eq!(zeroed, 1);
}

#[test]
fn test_allocation_wire_shape() {
    let mut plan = PaymentPlan::new();
    let id = plan
        .add_method(PaymentKind::Pix, Money::from_reais(150))
        .unwrap();
    plan.update_amount(id, Money::from_centavos(15_000), Money::from_reais(150))
        .unwrap();

    // The front end reads amounts as decimal strings and kinds lowercase.
    let json = serde_json::to_value(plan.allocations().first().unwrap()).unwrap();
    assert_eq!(json["kind"], "pix");
    assert_eq!(json["amount"], "150.00");
    assert_eq!(json["id"], id.to_string());
}

#[test]
fn test_duplicate_method_kind_is_rejected_quietly() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 1, 10_000)]);

    let (first, _) = checkout.add_method(client(), PaymentKind::Pix);
    assert!(first.is_some());
    let (second, session) = checkout.add_method(client(), PaymentKind::Pix);
    assert!(second.is_none());
    assert_eq!(session.plan.allocations().len(), 1);
}
