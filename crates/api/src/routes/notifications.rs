//! Notification handlers. Any authenticated account kind may call these;
//! the bearer token decides whose list is touched.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use crate::middleware::AnyAuth;
use crate::services::notifications::Notification;
use crate::state::AppState;

/// GET /api/notifications
pub async fn index(
    State(state): State<AppState>,
    AnyAuth(recipient): AnyAuth,
) -> Json<Vec<Notification>> {
    Json(state.notifications().list(recipient))
}

/// DELETE /api/notifications/{id}
///
/// Dismissing an id that already expired is fine; 204 either way.
pub async fn dismiss(
    State(state): State<AppState>,
    AnyAuth(recipient): AnyAuth,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.notifications().remove(recipient, id);
    StatusCode::NO_CONTENT
}

/// DELETE /api/notifications
pub async fn clear(State(state): State<AppState>, AnyAuth(recipient): AnyAuth) -> StatusCode {
    state.notifications().clear_all(recipient);
    StatusCode::NO_CONTENT
}
