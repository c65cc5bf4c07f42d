//! Simulated payment receipt generation.
//!
//! No payment processor is contacted. Each payment split gets plausible
//! receipt data for its kind: a PIX copy-paste code, a boleto digit line
//! with a due date, or a card authorization code.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use helpnet_core::PaymentKind;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Boletos fall due this many days after emission.
const BOLETO_DUE_DAYS: i64 = 3;

/// Kind-specific receipt fields. At most one group is populated.
#[derive(Debug, Clone, Default)]
pub struct Receipt {
    pub pix_code: Option<String>,
    pub boleto_line: Option<String>,
    pub boleto_due_date: Option<NaiveDate>,
    pub card_authorization: Option<String>,
}

/// Generate receipt data for one payment split.
#[must_use]
pub fn generate(kind: PaymentKind, now: DateTime<Utc>) -> Receipt {
    generate_with_rng(kind, now, &mut rand::rng())
}

/// Deterministic variant for tests.
pub fn generate_with_rng<R: Rng + ?Sized>(
    kind: PaymentKind,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Receipt {
    match kind {
        PaymentKind::Pix => Receipt {
            pix_code: Some(pix_code(rng)),
            ..Receipt::default()
        },
        PaymentKind::Boleto => Receipt {
            boleto_line: Some(boleto_line(rng)),
            boleto_due_date: Some(now.date_naive() + TimeDelta::days(BOLETO_DUE_DAYS)),
            ..Receipt::default()
        },
        PaymentKind::Cartao | PaymentKind::Debito => Receipt {
            card_authorization: Some(card_authorization(rng)),
            ..Receipt::default()
        },
    }
}

/// A "copia e cola" style PIX code: fixed EMV-ish prefix, random key,
/// four trailing check digits.
fn pix_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let key: String = std::iter::repeat_with(|| rng.sample(Alphanumeric))
        .take(32)
        .map(char::from)
        .collect();
    let check: u16 = rng.random_range(0..10_000);
    format!("00020126580014br.gov.bcb.pix0136{key}6304{check:04}")
}

/// A 47-digit boleto digit line in the usual grouped layout.
fn boleto_line<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits = (0..47).map(|_| char::from(rng.random_range(b'0'..=b'9')));
    let mut take = |n: usize| -> String { digits.by_ref().take(n).collect() };
    format!(
        "{}.{} {}.{} {}.{} {} {}",
        take(5),
        take(5),
        take(5),
        take(6),
        take(5),
        take(6),
        take(1),
        take(14),
    )
}

/// A six-digit card authorization code.
fn card_authorization<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("AUT{:06}", rng.random_range(0..1_000_000))
}
