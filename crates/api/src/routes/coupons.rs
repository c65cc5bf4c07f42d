//! Coupon handlers: vendor CRUD plus the public validity check used by the
//! checkout form.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use helpnet_core::CouponId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::db::coupons::{Coupon, NewCoupon};
use crate::error::{ApiError, Result};
use crate::middleware::{ClientAuth, VendorAuth};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CouponRequest {
    pub code: String,
    /// Whole percent, e.g. 15 means 15% off
    pub discount_percent: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
}

const fn default_active() -> bool {
    true
}

impl CouponRequest {
    fn validated(&self) -> Result<NewCoupon> {
        let code = self.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ApiError::Validation("Código do cupom é obrigatório".to_string()));
        }
        if self.discount_percent <= Decimal::ZERO || self.discount_percent > Decimal::ONE_HUNDRED {
            return Err(ApiError::Validation(
                "Desconto deve estar entre 1% e 100%".to_string(),
            ));
        }
        if matches!(self.max_uses, Some(max) if max <= 0) {
            return Err(ApiError::Validation(
                "Limite de usos deve ser positivo".to_string(),
            ));
        }

        Ok(NewCoupon {
            code,
            discount_percent: self.discount_percent,
            active: self.active,
            expires_at: self.expires_at,
            max_uses: self.max_uses,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CouponView {
    pub id: CouponId,
    pub code: String,
    pub discount_percent: Decimal,
    pub active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
}

impl From<Coupon> for CouponView {
    fn from(coupon: Coupon) -> Self {
        Self {
            id: coupon.id,
            code: coupon.code,
            discount_percent: coupon.discount_percent,
            active: coupon.active,
            expires_at: coupon.expires_at,
            max_uses: coupon.max_uses,
            used_count: coupon.used_count,
        }
    }
}

/// Outcome of a dry validity check.
#[derive(Debug, Serialize)]
pub struct CouponValidation {
    pub valid: bool,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// GET /api/coupons
pub async fn index(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
) -> Result<Json<Vec<CouponView>>> {
    let coupons = state.coupons().list_for_vendor(vendor_id).await?;
    Ok(Json(coupons.into_iter().map(CouponView::from).collect()))
}

/// POST /api/coupons
pub async fn create(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Json(req): Json<CouponRequest>,
) -> Result<impl IntoResponse> {
    let new = req.validated()?;
    let coupon = state.coupons().create(vendor_id, &new).await?;
    Ok((StatusCode::CREATED, Json(CouponView::from(coupon))))
}

/// PUT /api/coupons/{id}
pub async fn update(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Path(id): Path<CouponId>,
    Json(req): Json<CouponRequest>,
) -> Result<Json<CouponView>> {
    let new = req.validated()?;
    let coupon = state.coupons().update(id, vendor_id, &new).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Cupom"),
        other => other.into(),
    })?;
    Ok(Json(CouponView::from(coupon)))
}

/// DELETE /api/coupons/{id}
pub async fn destroy(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Path(id): Path<CouponId>,
) -> Result<StatusCode> {
    state.coupons().delete(id, vendor_id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Cupom"),
        other => other.into(),
    })?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/coupons/validate/{code}
///
/// Always 200; the body says whether the code is redeemable and why not.
pub async fn validate(
    State(state): State<AppState>,
    ClientAuth(_client_id): ClientAuth,
    Path(code): Path<String>,
) -> Result<Json<CouponValidation>> {
    let code = code.trim().to_uppercase();
    let found = state.coupons().find_by_code(&code).await?;

    let validation = match found {
        Some(coupon) if coupon.is_redeemable(Utc::now()) => CouponValidation {
            valid: true,
            code,
            discount_percent: Some(coupon.discount_percent),
            message: None,
        },
        Some(_) => CouponValidation {
            valid: false,
            code,
            discount_percent: None,
            message: Some("Cupom expirado ou esgotado".to_string()),
        },
        None => CouponValidation {
            valid: false,
            code,
            discount_percent: None,
            message: Some("Cupom não encontrado".to_string()),
        },
    };
    Ok(Json(validation))
}
