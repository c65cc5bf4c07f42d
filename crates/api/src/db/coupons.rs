//! Discount coupon repository.

use chrono::{DateTime, Utc};
use helpnet_core::{CouponId, VendorId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult, conflict_on_unique};

/// A percentage discount coupon owned by a vendor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Coupon {
    pub id: CouponId,
    pub vendor_id: VendorId,
    pub code: String,
    /// Whole percent off the subtotal, e.g. 15 means 15%
    pub discount_percent: Decimal,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
}

impl Coupon {
    /// A coupon is redeemable when active, unexpired, and under its use cap.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.expires_at.is_none_or(|at| at > now)
            && self
                .max_uses
                .is_none_or(|max| self.used_count < max)
    }
}

/// New coupon data for insertion or update.
#[derive(Debug, Clone)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: Decimal,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

const COUPON_COLUMNS: &str =
    "id, vendor_id, code, discount_percent, active, expires_at, max_uses, used_count";

/// Repository for coupon operations.
#[derive(Clone)]
pub struct CouponRepository {
    pool: PgPool,
}

impl CouponRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a vendor's coupons, newest first.
    pub async fn list_for_vendor(&self, vendor_id: VendorId) -> RepositoryResult<Vec<Coupon>> {
        let coupons = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE vendor_id = $1 ORDER BY id DESC",
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(coupons)
    }

    /// Create a coupon. The code is globally unique.
    pub async fn create(&self, vendor_id: VendorId, new: &NewCoupon) -> RepositoryResult<Coupon> {
        sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupons (vendor_id, code, discount_percent, active, expires_at, max_uses)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COUPON_COLUMNS}",
        ))
        .bind(vendor_id)
        .bind(&new.code)
        .bind(new.discount_percent)
        .bind(new.active)
        .bind(new.expires_at)
        .bind(new.max_uses)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Cupom com este código já existe"))
    }

    /// Update a coupon. Scoped to the owning vendor.
    pub async fn update(
        &self,
        id: CouponId,
        vendor_id: VendorId,
        new: &NewCoupon,
    ) -> RepositoryResult<Coupon> {
        sqlx::query_as::<_, Coupon>(&format!(
            "UPDATE coupons
             SET code = $3, discount_percent = $4, active = $5, expires_at = $6, max_uses = $7
             WHERE id = $1 AND vendor_id = $2
             RETURNING {COUPON_COLUMNS}",
        ))
        .bind(id)
        .bind(vendor_id)
        .bind(&new.code)
        .bind(new.discount_percent)
        .bind(new.active)
        .bind(new.expires_at)
        .bind(new.max_uses)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Cupom com este código já existe"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a coupon. Scoped to the owning vendor.
    pub async fn delete(&self, id: CouponId, vendor_id: VendorId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1 AND vendor_id = $2")
            .bind(id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Look up a coupon by code, whatever its state. Redeemability is the
    /// caller's decision via [`Coupon::is_redeemable`].
    pub async fn find_by_code(&self, code: &str) -> RepositoryResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1",
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(coupon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn coupon(active: bool, expires_at: Option<DateTime<Utc>>, max_uses: Option<i32>) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            vendor_id: VendorId::new(1),
            code: "DEZOFF".to_string(),
            discount_percent: Decimal::new(10, 0),
            active,
            expires_at,
            max_uses,
            used_count: 3,
        }
    }

    #[test]
    fn test_redeemable_when_active_and_open_ended() {
        let now = Utc::now();
        assert!(coupon(true, None, None).is_redeemable(now));
    }

    #[test]
    fn test_not_redeemable_when_inactive() {
        let now = Utc::now();
        assert!(!coupon(false, None, None).is_redeemable(now));
    }

    #[test]
    fn test_not_redeemable_when_expired() {
        let now = Utc::now();
        let past = now - TimeDelta::hours(1);
        let future = now + TimeDelta::hours(1);
        assert!(!coupon(true, Some(past), None).is_redeemable(now));
        assert!(coupon(true, Some(future), None).is_redeemable(now));
    }

    #[test]
    fn test_not_redeemable_when_uses_exhausted() {
        let now = Utc::now();
        // used_count is 3 in the fixture
        assert!(!coupon(true, None, Some(3)).is_redeemable(now));
        assert!(coupon(true, None, Some(4)).is_redeemable(now));
    }
}
