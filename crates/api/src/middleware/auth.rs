//! Bearer-token extractors for route handlers.
//!
//! Each extractor verifies the `Authorization: Bearer` token against the
//! configured secret and checks the account kind, so a vendor token can
//! never reach a client-scoped handler.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use helpnet_core::{AdminRole, AdminUserId, ClientId, VendorId};

use crate::error::ApiError;
use crate::services::auth::TokenRole;
use crate::services::notifications::Recipient;
use crate::state::AppState;

/// Authenticated shopper.
#[derive(Debug, Clone, Copy)]
pub struct ClientAuth(pub ClientId);

/// Authenticated vendor.
#[derive(Debug, Clone, Copy)]
pub struct VendorAuth(pub VendorId);

/// Authenticated admin with its permission level.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth {
    pub id: AdminUserId,
    pub role: AdminRole,
}

impl AdminAuth {
    /// Viewers are read-only; everything else may write.
    pub fn require_write(&self) -> Result<(), ApiError> {
        if self.role == AdminRole::Viewer {
            return Err(ApiError::Forbidden);
        }
        Ok(())
    }
}

/// Any authenticated principal, as a notification recipient. Used by the
/// endpoints every account kind shares.
#[derive(Debug, Clone, Copy)]
pub struct AnyAuth(pub Recipient);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(ApiError::Unauthorized)
}

fn verified_claims(
    parts: &Parts,
    state: &AppState,
) -> Result<crate::services::auth::Claims, ApiError> {
    let token = bearer_token(parts)?;
    state
        .tokens()
        .verify(token)
        .map_err(|_| ApiError::Unauthorized)
}

impl FromRequestParts<AppState> for ClientAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        if claims.role != TokenRole::Client {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(ClientId::new(claims.sub)))
    }
}

impl FromRequestParts<AppState> for VendorAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        if claims.role != TokenRole::Vendor {
            return Err(ApiError::Forbidden);
        }
        Ok(Self(VendorId::new(claims.sub)))
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        if claims.role != TokenRole::Admin {
            return Err(ApiError::Forbidden);
        }
        let role = claims.admin_role.ok_or(ApiError::Unauthorized)?;
        Ok(Self {
            id: AdminUserId::new(claims.sub),
            role,
        })
    }
}

impl FromRequestParts<AppState> for AnyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = verified_claims(parts, state)?;
        let recipient = match claims.role {
            TokenRole::Client => Recipient::Client(ClientId::new(claims.sub)),
            TokenRole::Vendor => Recipient::Vendor(VendorId::new(claims.sub)),
            TokenRole::Admin => Recipient::Admin(AdminUserId::new(claims.sub)),
        };
        Ok(Self(recipient))
    }
}
