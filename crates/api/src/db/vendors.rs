//! Vendor (store) account repository.

use chrono::{DateTime, Utc};
use helpnet_core::{Email, VendorId};
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult, conflict_on_unique};

/// A registered store that sells products on the marketplace.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Vendor {
    pub id: VendorId,
    pub email: Email,
    /// Argon2 password hash, never exposed over the wire
    pub password_hash: String,
    pub store_name: String,
    pub cnpj: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for vendor account operations.
#[derive(Clone)]
pub struct VendorRepository {
    pool: PgPool,
}

impl VendorRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a vendor account. Email must be unique.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        store_name: &str,
        cnpj: Option<&str>,
    ) -> RepositoryResult<Vendor> {
        sqlx::query_as::<_, Vendor>(
            "INSERT INTO vendors (email, password_hash, store_name, cnpj)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, store_name, cnpj, active, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .bind(store_name)
        .bind(cnpj)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "E-mail já cadastrado"))
    }

    /// Find a vendor by email (login path).
    pub async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<Vendor>> {
        let vendor = sqlx::query_as::<_, Vendor>(
            "SELECT id, email, password_hash, store_name, cnpj, active, created_at
             FROM vendors WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(vendor)
    }

    /// Find a vendor by id.
    pub async fn find(&self, id: VendorId) -> RepositoryResult<Vendor> {
        sqlx::query_as::<_, Vendor>(
            "SELECT id, email, password_hash, store_name, cnpj, active, created_at
             FROM vendors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
