//! Client (shopper) account repository.

use chrono::{DateTime, Utc};
use helpnet_core::{ClientId, Email};
use sqlx::PgPool;

use super::{RepositoryError, RepositoryResult, conflict_on_unique};

/// A registered shopper account.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub id: ClientId,
    pub email: Email,
    /// Argon2 password hash, never exposed over the wire
    pub password_hash: String,
    pub name: String,
    pub cpf: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Repository for client account operations.
#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a client account. Email must be unique.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        name: &str,
        cpf: Option<&str>,
    ) -> RepositoryResult<Client> {
        sqlx::query_as::<_, Client>(
            "INSERT INTO clients (email, password_hash, name, cpf)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, name, cpf, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(cpf)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "E-mail já cadastrado"))
    }

    /// Find a client by email (login path).
    pub async fn find_by_email(&self, email: &Email) -> RepositoryResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, email, password_hash, name, cpf, created_at
             FROM clients WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(client)
    }

    /// Find a client by id.
    pub async fn find(&self, id: ClientId) -> RepositoryResult<Client> {
        sqlx::query_as::<_, Client>(
            "SELECT id, email, password_hash, name, cpf, created_at
             FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }
}
