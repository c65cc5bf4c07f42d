//! Product catalog repository.

use chrono::{DateTime, Utc};
use helpnet_core::{CategoryId, Money, ProductId, VendorId};
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult};

/// A product listed by a vendor.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub vendor_id: VendorId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    /// Public URLs of uploaded images
    pub images: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filters for the public catalog listing.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub category: Option<CategoryId>,
    pub vendor: Option<VendorId>,
    /// Free-text search over name and description
    pub q: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub per_page: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: None,
            vendor: None,
            q: None,
            page: 1,
            per_page: 20,
        }
    }
}

impl ProductFilter {
    const MAX_PER_PAGE: u32 = 100;

    fn limit(&self) -> i64 {
        i64::from(self.per_page.clamp(1, Self::MAX_PER_PAGE))
    }

    fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }

    /// Cache key for the catalog read path.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!(
            "c={:?}&v={:?}&q={:?}&p={}&n={}",
            self.category.map(|c| c.as_i32()),
            self.vendor.map(|v| v.as_i32()),
            self.q,
            self.page.max(1),
            self.per_page.clamp(1, Self::MAX_PER_PAGE),
        )
    }
}

/// One page of the public catalog with the total match count.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    pub total: i64,
}

/// New product data for insertion.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub stock: i32,
    pub images: Vec<String>,
}

const PRODUCT_COLUMNS: &str = "id, vendor_id, category_id, name, description, price, stock, \
                               images, active, created_at, updated_at";

/// Repository for product operations.
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching the filter, newest first, with the
    /// total count of matching rows for pagination.
    pub async fn list(&self, filter: &ProductFilter) -> RepositoryResult<CatalogPage> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE active
               AND ($1::INT4 IS NULL OR category_id = $1)
               AND ($2::INT4 IS NULL OR vendor_id = $2)
               AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%'
                    OR description ILIKE '%' || $3 || '%')
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5",
        ))
        .bind(filter.category)
        .bind(filter.vendor)
        .bind(filter.q.as_deref())
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM products
             WHERE active
               AND ($1::INT4 IS NULL OR category_id = $1)
               AND ($2::INT4 IS NULL OR vendor_id = $2)
               AND ($3::TEXT IS NULL OR name ILIKE '%' || $3 || '%'
                    OR description ILIKE '%' || $3 || '%')",
        )
        .bind(filter.category)
        .bind(filter.vendor)
        .bind(filter.q.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogPage { products, total })
    }

    /// List all products of one vendor, including inactive ones.
    pub async fn list_for_vendor(&self, vendor_id: VendorId) -> RepositoryResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE vendor_id = $1 ORDER BY created_at DESC",
        ))
        .bind(vendor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Find an active product by id (public detail page).
    pub async fn find_active(&self, id: ProductId) -> RepositoryResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND active",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Find a product owned by a vendor, regardless of active flag.
    pub async fn find_for_vendor(
        &self,
        id: ProductId,
        vendor_id: VendorId,
    ) -> RepositoryResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND vendor_id = $2",
        ))
        .bind(id)
        .bind(vendor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Fetch several active products at once (checkout validation).
    pub async fn list_by_ids(&self, ids: &[ProductId]) -> RepositoryResult<Vec<Product>> {
        let raw_ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1) AND active",
        ))
        .bind(raw_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Create a product for a vendor.
    pub async fn create(
        &self,
        vendor_id: VendorId,
        new: &NewProduct,
    ) -> RepositoryResult<Product> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (vendor_id, category_id, name, description, price, stock, images)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PRODUCT_COLUMNS}",
        ))
        .bind(vendor_id)
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.images)
        .fetch_one(&self.pool)
        .await?;
        Ok(product)
    }

    /// Update a product. Scoped to the owning vendor.
    pub async fn update(
        &self,
        id: ProductId,
        vendor_id: VendorId,
        new: &NewProduct,
        active: bool,
    ) -> RepositoryResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products
             SET category_id = $3, name = $4, description = $5, price = $6,
                 stock = $7, images = $8, active = $9, updated_at = NOW()
             WHERE id = $1 AND vendor_id = $2
             RETURNING {PRODUCT_COLUMNS}",
        ))
        .bind(id)
        .bind(vendor_id)
        .bind(new.category_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(&new.images)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a product. Scoped to the owning vendor.
    pub async fn delete(&self, id: ProductId, vendor_id: VendorId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND vendor_id = $2")
            .bind(id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
