//! Registration and login handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use helpnet_core::{AdminRole, AdminUserId, ClientId, VendorId};
use serde::{Deserialize, Serialize};

use crate::db::admin_users::AdminUser;
use crate::db::clients::Client;
use crate::db::vendors::Vendor;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterClientRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub cpf: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterVendorRequest {
    pub email: String,
    pub password: String,
    pub store_name: String,
    pub cnpj: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a client account.
#[derive(Debug, Serialize)]
pub struct ClientView {
    pub id: ClientId,
    pub email: String,
    pub name: String,
    pub cpf: Option<String>,
}

impl From<Client> for ClientView {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            email: client.email.to_string(),
            name: client.name,
            cpf: client.cpf,
        }
    }
}

/// Public view of a vendor account.
#[derive(Debug, Serialize)]
pub struct VendorView {
    pub id: VendorId,
    pub email: String,
    pub store_name: String,
    pub cnpj: Option<String>,
    pub active: bool,
}

impl From<Vendor> for VendorView {
    fn from(vendor: Vendor) -> Self {
        Self {
            id: vendor.id,
            email: vendor.email.to_string(),
            store_name: vendor.store_name,
            cnpj: vendor.cnpj,
            active: vendor.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminView {
    pub id: AdminUserId,
    pub email: String,
    pub name: String,
    pub role: AdminRole,
}

impl From<AdminUser> for AdminView {
    fn from(admin: AdminUser) -> Self {
        Self {
            id: admin.id,
            email: admin.email.to_string(),
            name: admin.name,
            role: admin.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientAuthResponse {
    pub token: String,
    pub client: ClientView,
}

#[derive(Debug, Serialize)]
pub struct VendorAuthResponse {
    pub token: String,
    pub vendor: VendorView,
}

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub admin: AdminView,
}

/// POST /api/auth/clients/register
pub async fn register_client(
    State(state): State<AppState>,
    Json(req): Json<RegisterClientRequest>,
) -> Result<impl IntoResponse> {
    let (client, token) = state
        .auth()
        .register_client(&req.email, &req.password, &req.name, req.cpf.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ClientAuthResponse {
            token,
            client: client.into(),
        }),
    ))
}

/// POST /api/auth/clients/login
pub async fn login_client(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ClientAuthResponse>> {
    let (client, token) = state.auth().login_client(&req.email, &req.password).await?;
    Ok(Json(ClientAuthResponse {
        token,
        client: client.into(),
    }))
}

/// POST /api/auth/vendors/register
pub async fn register_vendor(
    State(state): State<AppState>,
    Json(req): Json<RegisterVendorRequest>,
) -> Result<impl IntoResponse> {
    let (vendor, token) = state
        .auth()
        .register_vendor(
            &req.email,
            &req.password,
            &req.store_name,
            req.cnpj.as_deref(),
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(VendorAuthResponse {
            token,
            vendor: vendor.into(),
        }),
    ))
}

/// POST /api/auth/vendors/login
pub async fn login_vendor(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<VendorAuthResponse>> {
    let (vendor, token) = state.auth().login_vendor(&req.email, &req.password).await?;
    Ok(Json(VendorAuthResponse {
        token,
        vendor: vendor.into(),
    }))
}

/// POST /api/auth/admin/login
pub async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AdminAuthResponse>> {
    let (admin, token) = state.auth().login_admin(&req.email, &req.password).await?;
    Ok(Json(AdminAuthResponse {
        token,
        admin: admin.into(),
    }))
}
