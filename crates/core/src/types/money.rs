//! Monetary amounts in BRL using decimal arithmetic.
//!
//! All marketplace prices, freight values, and payment allocations are BRL,
//! so `Money` carries no currency code. Amounts are exact decimals; binary
//! floating point never touches a price.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A BRL amount backed by [`rust_decimal::Decimal`].
///
/// Construction never rounds; callers that need centavo precision round
/// explicitly via [`Money::round_centavos`]. Comparison and arithmetic are
/// exact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` from a raw decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a `Money` from an integer number of centavos.
    #[must_use]
    pub const fn from_centavos(centavos: i64) -> Self {
        let magnitude = centavos.unsigned_abs();
        Self(Decimal::from_parts(
            (magnitude & 0xFFFF_FFFF) as u32,
            (magnitude >> 32) as u32,
            0,
            centavos < 0,
            2,
        ))
    }

    /// Create a `Money` from a whole number of reais.
    #[must_use]
    pub const fn from_reais(reais: i64) -> Self {
        let magnitude = reais.unsigned_abs();
        Self(Decimal::from_parts(
            (magnitude & 0xFFFF_FFFF) as u32,
            (magnitude >> 32) as u32,
            0,
            reais < 0,
            0,
        ))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Round to centavo precision, midpoints away from zero.
    #[must_use]
    pub fn round_centavos(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// True when strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// True when exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Clamp negative amounts to zero.
    #[must_use]
    pub fn max_zero(self) -> Self {
        if self.0 < Decimal::ZERO {
            Self::ZERO
        } else {
            self
        }
    }

    /// Absolute value.
    #[must_use]
    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Multiply by a scalar factor (discount rates, installment counts).
    #[must_use]
    pub fn scale(self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }

    /// Divide into `parts` equal shares, unrounded.
    ///
    /// Returns `None` when `parts` is zero.
    #[must_use]
    pub fn split(self, parts: u32) -> Option<Self> {
        if parts == 0 {
            return None;
        }
        Some(Self(self.0 / Decimal::from(parts)))
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl fmt::Display for Money {
    /// Formats as `R$ 1234,56` (Brazilian decimal comma, no grouping).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "R$ {}", format!("{rounded:.2}").replace('.', ","))
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centavos() {
        assert_eq!(Money::from_centavos(15_000), Money::from_reais(150));
        assert_eq!(Money::from_centavos(1), Money::new(Decimal::new(1, 2)));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_reais(130);
        let b = Money::from_reais(20);
        assert_eq!(a + b, Money::from_reais(150));
        assert_eq!(a - b, Money::from_reais(110));

        let mut c = a;
        c += b;
        assert_eq!(c, Money::from_reais(150));
    }

    #[test]
    fn test_sum() {
        let total: Money = [Money::from_reais(50), Money::from_reais(100)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_reais(150));
    }

    #[test]
    fn test_max_zero_clamps_negatives() {
        assert_eq!(Money::from_reais(-5).max_zero(), Money::ZERO);
        assert_eq!(Money::from_reais(5).max_zero(), Money::from_reais(5));
        assert_eq!(Money::ZERO.max_zero(), Money::ZERO);
    }

    #[test]
    fn test_round_centavos() {
        // 100 / 3 = 33.333... rounds to 33.33
        let third = Money::from_reais(100).split(3).unwrap();
        assert_eq!(third.round_centavos(), Money::from_centavos(3_333));

        // Midpoint rounds away from zero: 0.125 -> 0.13
        let midpoint = Money::new(Decimal::new(125, 3));
        assert_eq!(midpoint.round_centavos(), Money::from_centavos(13));
    }

    #[test]
    fn test_split_zero_parts() {
        assert!(Money::from_reais(100).split(0).is_none());
    }

    #[test]
    fn test_scale() {
        let amount = Money::from_reais(100);
        let discounted = amount.scale(Decimal::new(95, 2));
        assert_eq!(discounted, Money::from_reais(95));
    }

    #[test]
    fn test_display_uses_decimal_comma() {
        assert_eq!(Money::from_centavos(15_000).to_string(), "R$ 150,00");
        assert_eq!(Money::from_centavos(123_456).to_string(), "R$ 1234,56");
        assert_eq!(Money::ZERO.to_string(), "R$ 0,00");
    }

    #[test]
    fn test_serde_transparent() {
        let money = Money::from_centavos(9_990);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"99.90\"");

        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, money);
    }
}
