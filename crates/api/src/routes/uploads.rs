//! Product image uploads.
//!
//! Files land in the configured upload directory under a fresh UUID name
//! and are served statically from `/uploads`. The stored-name shape is the
//! only thing DELETE accepts, which rules out path traversal.

use std::path::PathBuf;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::middleware::VendorAuth;
use crate::state::AppState;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Public URLs of the files stored by this request
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// POST /api/uploads
///
/// Accepts several files in one multipart request. Stops at the first
/// rejected file; the files already stored stay stored and are reported.
pub async fn create(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let dir = PathBuf::from(&state.config().upload_dir);
    tokio::fs::create_dir_all(&dir).await?;

    let mut images = Vec::new();
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::BadRequest(format!("Falha ao ler o arquivo enviado: {e}"))
        })?;
        let Some(field) = field else { break };
        let Some(file_name) = field.file_name().map(ToOwned::to_owned) else {
            continue;
        };

        let Some(ext) = extension_of(&file_name) else {
            return Ok(Json(UploadResponse {
                success: false,
                images,
                error: Some(format!(
                    "Formato não suportado: {file_name}. Use JPG, PNG, WEBP ou GIF."
                )),
            }));
        };

        let data = field.bytes().await.map_err(|e| {
            ApiError::BadRequest(format!("Falha ao ler o arquivo enviado: {e}"))
        })?;
        if data.is_empty() {
            return Ok(Json(UploadResponse {
                success: false,
                images,
                error: Some(format!("Arquivo vazio: {file_name}")),
            }));
        }

        let stored_name = format!("{}.{ext}", Uuid::new_v4());
        tokio::fs::write(dir.join(&stored_name), &data).await?;
        tracing::info!(%vendor_id, file = %stored_name, bytes = data.len(), "image stored");
        images.push(state.config().upload_url(&stored_name));
    }

    if images.is_empty() {
        return Ok(Json(UploadResponse {
            success: false,
            images,
            error: Some("Nenhum arquivo enviado".to_string()),
        }));
    }
    Ok(Json(UploadResponse {
        success: true,
        images,
        error: None,
    }))
}

/// DELETE /api/uploads/{filename}
pub async fn destroy(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Path(filename): Path<String>,
) -> Result<StatusCode> {
    // Only names this server generated: "<uuid>.<allowed ext>"
    let valid = filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            Uuid::parse_str(stem).is_ok() && ALLOWED_EXTENSIONS.contains(&ext)
        });
    if !valid {
        return Err(ApiError::BadRequest("Nome de arquivo inválido".to_string()));
    }

    let path = PathBuf::from(&state.config().upload_dir).join(&filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(%vendor_id, file = %filename, "image removed");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ApiError::NotFound("Imagem")),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_allowlist() {
        assert_eq!(extension_of("foto.jpg").as_deref(), Some("jpg"));
        assert_eq!(extension_of("FOTO.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("a.b.webp").as_deref(), Some("webp"));
        assert!(extension_of("script.php").is_none());
        assert!(extension_of("semextensao").is_none());
    }
}
