//! Category handlers: public listing, admin-managed writes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use helpnet_core::CategoryId;
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::db::categories::Category;
use crate::error::{ApiError, Result};
use crate::middleware::AdminAuth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
    /// URL-safe identifier; derived from the name when omitted
    pub slug: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

/// Lowercase the name, map spaces to hyphens, drop everything else outside
/// `[a-z0-9-]`. Accented characters common in Portuguese names are reduced
/// to their base letter.
fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            ' ' => '-',
            other => other,
        })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

impl CategoryRequest {
    fn validated(&self) -> Result<(String, String)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("Nome da categoria é obrigatório".to_string()));
        }
        let slug = match self.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => slugify(name),
        };
        Ok((name.to_string(), slug))
    }
}

/// GET /api/categories
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<CategoryView>>> {
    let categories = state.categories().list().await?;
    Ok(Json(categories.into_iter().map(CategoryView::from).collect()))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    admin: AdminAuth,
    Json(req): Json<CategoryRequest>,
) -> Result<impl IntoResponse> {
    admin.require_write()?;
    let (name, slug) = req.validated()?;
    let category = state.categories().create(&name, &slug).await?;
    Ok((StatusCode::CREATED, Json(CategoryView::from(category))))
}

/// PUT /api/categories/{id}
pub async fn update(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<CategoryId>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<CategoryView>> {
    admin.require_write()?;
    let (name, slug) = req.validated()?;
    let category = state.categories().update(id, &name, &slug).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Categoria"),
        other => other.into(),
    })?;
    Ok(Json(CategoryView::from(category)))
}

/// DELETE /api/categories/{id}
pub async fn destroy(
    State(state): State<AppState>,
    admin: AdminAuth,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    admin.require_write()?;
    state.categories().delete(id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Categoria"),
        other => other.into(),
    })?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_handles_accents_and_spaces() {
        assert_eq!(slugify("Instrumentos Musicais"), "instrumentos-musicais");
        assert_eq!(slugify("Eletrônicos"), "eletronicos");
        assert_eq!(slugify("Moda & Acessórios"), "moda--acessorios");
        assert_eq!(slugify("Çalçados"), "calcados");
    }
}
