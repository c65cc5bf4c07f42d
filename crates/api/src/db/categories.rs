//! Category repository.

use helpnet_core::CategoryId;
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult, conflict_on_foreign_key, conflict_on_unique};

/// A product category, managed by admins.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Repository for category operations.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List all categories ordered by name.
    pub async fn list(&self) -> RepositoryResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, slug FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Find a category by id.
    pub async fn find(&self, id: CategoryId) -> RepositoryResult<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name, slug FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a new category. The slug must be unique.
    pub async fn create(&self, name: &str, slug: &str) -> RepositoryResult<Category> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, slug) VALUES ($1, $2) RETURNING id, name, slug",
        )
        .bind(name)
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Categoria com este slug já existe"))
    }

    /// Update a category's name and slug.
    pub async fn update(&self, id: CategoryId, name: &str, slug: &str) -> RepositoryResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2, slug = $3 WHERE id = $1 RETURNING id, name, slug",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Categoria com este slug já existe"))?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category. Fails with a conflict while products still use it.
    pub async fn delete(&self, id: CategoryId) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_on_foreign_key(e, "Categoria em uso por produtos"))?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
