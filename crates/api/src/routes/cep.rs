//! CEP lookup passthrough.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::{ApiError, Result};
use crate::services::cep::CepInfo;
use crate::state::AppState;

/// GET /api/cep/{cep}
///
/// Accepts `01310100` or `01310-100`. Unknown CEPs and upstream failures
/// both come back as 404; the address form keeps whatever the user typed.
pub async fn show(
    State(state): State<AppState>,
    Path(cep): Path<String>,
) -> Result<Json<CepInfo>> {
    let cep = helpnet_core::Cep::parse(&cep)
        .map_err(|_| ApiError::Validation("CEP inválido".to_string()))?;

    match state.cep().lookup(&cep).await {
        Some(info) => Ok(Json(info)),
        None => Err(ApiError::NotFound("CEP")),
    }
}
