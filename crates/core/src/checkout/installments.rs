//! Credit-card installment table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Smallest offered installment count.
pub const MIN_INSTALLMENTS: u32 = 2;
/// Largest offered installment count.
pub const MAX_INSTALLMENTS: u32 = 12;

/// One row of the installment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    /// Number of installments.
    pub count: u32,
    /// Value of each installment, rounded to centavos.
    pub per_installment: Money,
    /// `per_installment * count`; differs from the financed amount by at
    /// most the accumulated rounding.
    pub total: Money,
}

/// Lazily yield the installment options for an amount, from
/// [`MIN_INSTALLMENTS`] up to [`MAX_INSTALLMENTS`] inclusive.
///
/// Pure function of the amount: the returned iterator can be re-created at
/// will and never observes later plan mutations. No interest is charged;
/// the marketplace simulates payments.
pub fn installment_plans(amount: Money) -> impl Iterator<Item = InstallmentPlan> {
    (MIN_INSTALLMENTS..=MAX_INSTALLMENTS).map(move |count| {
        let per_installment = amount
            .split(count)
            .unwrap_or(Money::ZERO)
            .round_centavos();
        InstallmentPlan {
            count,
            per_installment,
            total: per_installment.scale(Decimal::from(count)),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_table_for_1200() {
        let plans: Vec<InstallmentPlan> = installment_plans(Money::from_reais(1200)).collect();

        assert_eq!(plans.len(), 11);

        let first = plans.first().unwrap();
        assert_eq!(first.count, 2);
        assert_eq!(first.per_installment, Money::from_reais(600));
        assert_eq!(first.total, Money::from_reais(1200));

        let last = plans.last().unwrap();
        assert_eq!(last.count, 12);
        assert_eq!(last.per_installment, Money::from_reais(100));
        assert_eq!(last.total, Money::from_reais(1200));
    }

    #[test]
    fn test_uneven_division_rounds_per_installment() {
        let plans: Vec<InstallmentPlan> = installment_plans(Money::from_reais(1200)).collect();

        // 1200 / 7 = 171.428... -> 171.43 each, total 1200.01
        let seven = plans.iter().find(|p| p.count == 7).unwrap();
        assert_eq!(seven.per_installment, Money::from_centavos(17_143));
        assert_eq!(seven.total, Money::from_centavos(120_001));
    }

    #[test]
    fn test_restartable_and_pure() {
        let amount = Money::from_centavos(99_990);
        let once: Vec<InstallmentPlan> = installment_plans(amount).collect();
        let again: Vec<InstallmentPlan> = installment_plans(amount).collect();
        assert_eq!(once, again);
    }

    #[test]
    fn test_zero_amount() {
        let plans: Vec<InstallmentPlan> = installment_plans(Money::ZERO).collect();
        assert_eq!(plans.len(), 11);
        assert!(plans.iter().all(|p| p.per_installment == Money::ZERO));
    }
}
