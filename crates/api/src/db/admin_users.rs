//! Admin user repository.
//!
//! Admin accounts are never self-registered. The CLI creates them.

use chrono::{DateTime, Utc};
use helpnet_core::{AdminRole, AdminUserId, Email};
use sqlx::PgPool;

use super::{RepositoryResult, conflict_on_unique};

/// An administrative user of the marketplace.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: Email,
    pub name: String,
    pub role: AdminRole,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Repository for admin user operations.
#[derive(Clone)]
pub struct AdminUserRepository {
    pool: PgPool,
}

impl AdminUserRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an admin user. Email must be unique.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        role: AdminRole,
        password_hash: &str,
    ) -> RepositoryResult<AdminUser> {
        sqlx::query_as::<_, AdminUser>(
            "INSERT INTO admin_users (email, name, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, name, role, password_hash, created_at",
        )
        .bind(email)
        .bind(name)
        .bind(role)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "E-mail já cadastrado"))
    }

    /// Find an admin by email (login path).
    pub async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<AdminUser>> {
        let admin = sqlx::query_as::<_, AdminUser>(
            "SELECT id, email, name, role, password_hash, created_at
             FROM admin_users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }
}
