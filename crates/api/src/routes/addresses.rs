//! Client address book handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use helpnet_core::{AddressId, Cep};
use serde::{Deserialize, Serialize};

use crate::db::addresses::{Address, NewAddress};
use crate::error::{ApiError, Result};
use crate::middleware::ClientAuth;
use crate::state::AppState;

/// Brazilian state abbreviations.
const UF_CODES: &[&str] = &[
    "AC", "AL", "AP", "AM", "BA", "CE", "DF", "ES", "GO", "MA", "MT", "MS", "MG", "PA", "PB",
    "PR", "PE", "PI", "RJ", "RN", "RS", "RO", "RR", "SC", "SP", "SE", "TO",
];

#[derive(Debug, Deserialize)]
pub struct AddressRequest {
    pub label: String,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
}

impl AddressRequest {
    fn validated(&self) -> Result<NewAddress> {
        let cep = Cep::parse(&self.cep)
            .map_err(|_| ApiError::Validation("CEP inválido".to_string()))?;

        for (value, message) in [
            (&self.label, "Identificação do endereço é obrigatória"),
            (&self.street, "Rua é obrigatória"),
            (&self.number, "Número é obrigatório"),
            (&self.district, "Bairro é obrigatório"),
            (&self.city, "Cidade é obrigatória"),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(message.to_string()));
            }
        }

        let state = self.state.trim().to_uppercase();
        if !UF_CODES.contains(&state.as_str()) {
            return Err(ApiError::Validation("UF inválida".to_string()));
        }

        Ok(NewAddress {
            label: self.label.trim().to_string(),
            cep,
            street: self.street.trim().to_string(),
            number: self.number.trim().to_string(),
            complement: self
                .complement
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(ToString::to_string),
            district: self.district.trim().to_string(),
            city: self.city.trim().to_string(),
            state,
        })
    }
}

/// Wire view of an address. CEP is rendered in its hyphenated form.
#[derive(Debug, Serialize)]
pub struct AddressView {
    pub id: AddressId,
    pub label: String,
    pub cep: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub district: String,
    pub city: String,
    pub state: String,
    pub is_default: bool,
}

impl From<Address> for AddressView {
    fn from(address: Address) -> Self {
        Self {
            id: address.id,
            label: address.label,
            cep: address.cep.to_string(),
            street: address.street,
            number: address.number,
            complement: address.complement,
            district: address.district,
            city: address.city,
            state: address.state,
            is_default: address.is_default,
        }
    }
}

/// GET /api/addresses
pub async fn index(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
) -> Result<Json<Vec<AddressView>>> {
    let addresses = state.addresses().list_for_client(client_id).await?;
    Ok(Json(addresses.into_iter().map(AddressView::from).collect()))
}

/// POST /api/addresses
pub async fn create(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Json(req): Json<AddressRequest>,
) -> Result<impl IntoResponse> {
    let new = req.validated()?;
    let address = state.addresses().create(client_id, &new).await?;
    Ok((StatusCode::CREATED, Json(AddressView::from(address))))
}

/// PUT /api/addresses/{id}
pub async fn update(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AddressId>,
    Json(req): Json<AddressRequest>,
) -> Result<Json<AddressView>> {
    let new = req.validated()?;
    let address = state.addresses().update(id, client_id, &new).await.map_err(map_not_found)?;
    Ok(Json(AddressView::from(address)))
}

/// DELETE /api/addresses/{id}
pub async fn destroy(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    state.addresses().delete(id, client_id).await.map_err(map_not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/addresses/{id}/default
pub async fn set_default(
    State(state): State<AppState>,
    ClientAuth(client_id): ClientAuth,
    Path(id): Path<AddressId>,
) -> Result<StatusCode> {
    state.addresses().set_default(id, client_id).await.map_err(map_not_found)?;
    Ok(StatusCode::NO_CONTENT)
}

fn map_not_found(e: crate::db::RepositoryError) -> ApiError {
    match e {
        crate::db::RepositoryError::NotFound => ApiError::NotFound("Endereço"),
        other => other.into(),
    }
}
