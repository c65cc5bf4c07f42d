//! Product catalog handlers: public listing and vendor CRUD.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use helpnet_core::{CategoryId, Money, ProductId, VendorId};
use serde::{Deserialize, Serialize};

use crate::db::RepositoryError;
use crate::db::products::{CatalogPage, NewProduct, Product, ProductFilter};
use crate::error::{ApiError, Result};
use crate::middleware::VendorAuth;
use crate::state::AppState;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<CategoryId>,
    pub vendor: Option<VendorId>,
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CatalogQuery {
    fn into_filter(self) -> ProductFilter {
        let defaults = ProductFilter::default();
        ProductFilter {
            category: self.category,
            vendor: self.vendor,
            q: self.q.filter(|q| !q.trim().is_empty()),
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}

/// Wire view of a product.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub vendor_id: VendorId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub images: Vec<String>,
    pub active: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            vendor_id: product.vendor_id,
            category_id: product.category_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            images: product.images.clone(),
            active: product.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub products: Vec<ProductView>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

impl CatalogResponse {
    fn new(page: &CatalogPage, filter: &ProductFilter) -> Self {
        Self {
            products: page.products.iter().map(ProductView::from).collect(),
            total: page.total,
            page: filter.page,
            per_page: filter.per_page,
        }
    }
}

/// Product create/update payload.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    /// Decimal string, e.g. "129.90"
    pub price: Money,
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl ProductRequest {
    async fn validate(&self, state: &AppState) -> Result<NewProduct> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("Nome do produto é obrigatório".to_string()));
        }
        if !self.price.is_positive() {
            return Err(ApiError::Validation("Preço deve ser maior que zero".to_string()));
        }
        if self.stock < 0 {
            return Err(ApiError::Validation("Estoque não pode ser negativo".to_string()));
        }
        state.categories().find(self.category_id).await.map_err(|e| match e {
            RepositoryError::NotFound => ApiError::Validation("Categoria inválida".to_string()),
            other => other.into(),
        })?;

        Ok(NewProduct {
            category_id: self.category_id,
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price: self.price.round_centavos(),
            stock: self.stock,
            images: self.images.clone(),
        })
    }
}

/// GET /api/products
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogResponse>> {
    let filter = query.into_filter();
    let key = filter.cache_key();

    if let Some(page) = state.catalog_cache().get(&key).await {
        return Ok(Json(CatalogResponse::new(&page, &filter)));
    }

    let page = Arc::new(state.products().list(&filter).await?);
    state.catalog_cache().insert(key, Arc::clone(&page)).await;
    Ok(Json(CatalogResponse::new(&page, &filter)))
}

/// GET /api/products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    let product = state.products().find_active(id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Produto"),
        other => other.into(),
    })?;
    Ok(Json(ProductView::from(&product)))
}

/// GET /api/products/mine
pub async fn vendor_index(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
) -> Result<Json<Vec<ProductView>>> {
    let products = state.products().list_for_vendor(vendor_id).await?;
    Ok(Json(products.iter().map(ProductView::from).collect()))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Json(req): Json<ProductRequest>,
) -> Result<impl IntoResponse> {
    let new = req.validate(&state).await?;
    let product = state.products().create(vendor_id, &new).await?;
    state.catalog_cache().invalidate_all();
    tracing::info!(product_id = %product.id, %vendor_id, "product created");
    Ok((StatusCode::CREATED, Json(ProductView::from(&product))))
}

/// PUT /api/products/{id}
pub async fn update(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Path(id): Path<ProductId>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<ProductView>> {
    let new = req.validate(&state).await?;
    let product = state
        .products()
        .update(id, vendor_id, &new, req.active)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ApiError::NotFound("Produto"),
            other => other.into(),
        })?;
    state.catalog_cache().invalidate_all();
    Ok(Json(ProductView::from(&product)))
}

/// DELETE /api/products/{id}
pub async fn destroy(
    State(state): State<AppState>,
    VendorAuth(vendor_id): VendorAuth,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.products().delete(id, vendor_id).await.map_err(|e| match e {
        RepositoryError::NotFound => ApiError::NotFound("Produto"),
        other => other.into(),
    })?;
    state.catalog_cache().invalidate_all();
    tracing::info!(product_id = %id, %vendor_id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
