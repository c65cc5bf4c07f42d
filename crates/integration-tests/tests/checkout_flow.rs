//! Full checkout walks through the checkout service.
//!
//! These tests drive `CheckoutService` the same way the HTTP handlers do:
//! items in, address selected, freight quote applied, payment split
//! balanced, submission prepared. No database or network is touched;
//! freight quote outcomes are applied directly.

#![allow(clippy::unwrap_used)]

use helpnet_api::db::addresses::Address;
use helpnet_api::services::checkout::{AppliedCoupon, CheckoutService, FreightState, SubmitError};
use helpnet_api::services::freight::{FreightClient, FreightError, FreightOption};
use helpnet_core::{
    AddressId, Cep, ClientId, CouponId, DraftItem, Money, PaymentKind, ProductId, VendorId,
};
use rust_decimal::Decimal;

fn service() -> CheckoutService {
    // The URL is never contacted; quote outcomes are applied directly.
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

fn freight_option(service: &str, reais: i64, deadline_days: u32) -> FreightOption {
    FreightOption {
        service: service.to_string(),
        price: Money::from_reais(reais),
        deadline_days,
    }
}

#[test]
fn test_cart_to_submission_with_pix() {
    let checkout = service();

    // 2 x 40.00 + 1 x 50.00 = 130.00
    checkout.set_items(client(), vec![item(1, 2, 4_000), item(2, 1, 5_000)]);
    checkout.add_method(client(), PaymentKind::Pix);
    checkout.distribute(client());

    let session = checkout.snapshot(client());
    assert_eq!(session.draft.subtotal(), Money::from_reais(130));
    assert_eq!(session.plan.allocated_total(), Money::from_reais(130));

    // Selecting an address marks the quote pending; the cheapest option
    // wins once it arrives.
    let (session, generation) = checkout.set_address(client(), address());
    assert!(matches!(session.freight, FreightState::Pending));
    checkout.apply_freight_result(
        client(),
        generation,
        Ok(vec![
            freight_option("Sedex", 35, 3),
            freight_option("PAC", 20, 8),
        ]),
    );

    let session = checkout.snapshot(client());
    assert_eq!(session.draft.freight(), Money::from_reais(20));
    assert_eq!(session.draft.total(), Money::from_reais(150));
    // PIX re-covered the new total without a manual redistribute.
    assert_eq!(session.plan.allocated_total(), Money::from_reais(150));

    let data = checkout.prepare_submission(client()).unwrap();
    assert_eq!(data.freight_service.as_deref(), Some("PAC"));
    assert_eq!(data.draft.total(), Money::from_reais(150));
    assert_eq!(data.address.cep.as_str(), "01310100");
    let allocated: Money = data.allocations.iter().map(|a| a.amount).sum();
    assert_eq!(allocated, Money::from_reais(150));
}

#[test]
fn test_three_method_split_balances_exactly() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 2, 4_000), item(2, 1, 5_000)]);

    let (_, generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(client(), generation, Ok(vec![freight_option("PAC", 20, 8)]));

    let (pix, _) = checkout.add_method(client(), PaymentKind::Pix);
    let (cartao, _) = checkout.add_method(client(), PaymentKind::Cartao);
    let (boleto, _) = checkout.add_method(client(), PaymentKind::Boleto);

    // Manual split: 50.00 + 80.01 + 19.99 = 150.00
    checkout
        .update_amount(client(), pix.unwrap(), Money::from_reais(50))
        .unwrap();
    checkout
        .update_amount(client(), cartao.unwrap(), Money::from_centavos(8_001))
        .unwrap();
    checkout
        .update_amount(client(), boleto.unwrap(), Money::from_centavos(1_999))
        .unwrap();

    let data = checkout.prepare_submission(client()).unwrap();
    assert_eq!(data.allocations.len(), 3);
    let allocated: Money = data.allocations.iter().map(|a| a.amount).sum();
    assert_eq!(allocated, Money::from_reais(150));

    // Two centavos short is outside the balance tolerance.
    checkout
        .update_amount(client(), boleto.unwrap(), Money::from_centavos(1_997))
        .unwrap();
    assert_eq!(
        checkout.prepare_submission(client()).unwrap_err(),
        SubmitError::Unbalanced
    );
}

#[test]
fn test_coupon_discounts_subtotal_and_survives_freight() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 1, 20_000)]);

    let session = checkout.set_coupon(
        client(),
        Some(AppliedCoupon {
            id: CouponId::new(5),
            code: "BEMVINDO10".to_string(),
            discount_percent: Decimal::from(10),
        }),
    );
    assert_eq!(session.draft.discount(), Money::from_reais(20));
    assert_eq!(session.draft.total(), Money::from_reais(180));

    // Freight applies on top of the discounted subtotal.
    let (_, generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(client(), generation, Ok(vec![freight_option("PAC", 20, 8)]));

    let session = checkout.snapshot(client());
    assert_eq!(session.draft.discount(), Money::from_reais(20));
    assert_eq!(session.draft.total(), Money::from_reais(200));

    let (cartao, _) = checkout.add_method(client(), PaymentKind::Cartao);
    checkout
        .update_amount(client(), cartao.unwrap(), Money::from_reais(200))
        .unwrap();

    let data = checkout.prepare_submission(client()).unwrap();
    assert_eq!(data.coupon.unwrap().code, "BEMVINDO10");
}

#[test]
fn test_address_change_requotes_and_discards_the_old_quote() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 1, 10_000)]);
    checkout.add_method(client(), PaymentKind::Pix);
    checkout.distribute(client());

    let (_, first_generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(
        client(),
        first_generation,
        Ok(vec![freight_option("PAC", 20, 8)]),
    );
    assert_eq!(
        checkout.snapshot(client()).draft.total(),
        Money::from_reais(120)
    );

    // New address: back to pending, and the first address's late second
    // quote must not land.
    let (session, second_generation) = checkout.set_address(client(), address());
    assert!(matches!(session.freight, FreightState::Pending));
    checkout.apply_freight_result(
        client(),
        first_generation,
        Ok(vec![freight_option("Sedex", 99, 1)]),
    );
    assert!(matches!(
        checkout.snapshot(client()).freight,
        FreightState::Pending
    ));

    checkout.apply_freight_result(
        client(),
        second_generation,
        Ok(vec![freight_option("Sedex", 35, 3)]),
    );
    let session = checkout.snapshot(client());
    assert_eq!(session.draft.total(), Money::from_reais(135));
    assert_eq!(session.plan.allocated_total(), Money::from_reais(135));
}

#[test]
fn test_cash_discount_unbalances_until_redistributed() {
    let checkout = service();
    checkout.set_items(client(), vec![item(1, 3, 5_000)]);
    let (_, generation) = checkout.set_address(client(), address());
    checkout.apply_freight_result(client(), generation, Err(FreightError::NoOptions));

    let (pix, _) = checkout.add_method(client(), PaymentKind::Pix);
    let (cartao, _) = checkout.add_method(client(), PaymentKind::Cartao);
    checkout
        .update_amount(client(), pix.unwrap(), Money::from_reais(100))
        .unwrap();
    checkout
        .update_amount(client(), cartao.unwrap(), Money::from_reais(50))
        .unwrap();
    assert!(checkout.prepare_submission(client()).is_ok());

    // 5% off the PIX share: 100.00 -> 95.00, the plan no longer balances.
    checkout.apply_cash_discount(client(), pix.unwrap()).unwrap();
    assert_eq!(
        checkout.prepare_submission(client()).unwrap_err(),
        SubmitError::Unbalanced
    );

    // Redistribution spreads the missing 5.00 over both methods.
    checkout.distribute(client());
    let session = checkout.snapshot(client());
    assert_eq!(session.plan.allocated_total(), Money::from_reais(150));
    assert!(checkout.prepare_submission(client()).is_ok());
}

#[test]
fn test_sessions_are_isolated_per_client() {
    let checkout = service();
    let other = ClientId::new(2);

    checkout.set_items(client(), vec![item(1, 1, 10_000)]);
    checkout.set_items(other, vec![item(2, 5, 1_000)]);

    assert_eq!(
        checkout.snapshot(client()).draft.subtotal(),
        Money::from_reais(100)
    );
    assert_eq!(
        checkout.snapshot(other).draft.subtotal(),
        Money::from_reais(50)
    );

    checkout.clear(client());
    assert!(checkout.snapshot(client()).draft.is_empty());
    assert!(!checkout.snapshot(other).draft.is_empty());
}
