//! Database access layer.
//!
//! One repository per aggregate, each a thin struct over [`sqlx::PgPool`].
//! Repositories return [`RepositoryError`]; routes translate that into HTTP
//! responses via [`crate::error::ApiError`].

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod addresses;
pub mod admin_users;
pub mod categories;
pub mod clients;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod vendors;

pub use addresses::AddressRepository;
pub use admin_users::AdminUserRepository;
pub use categories::CategoryRepository;
pub use clients::ClientRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use vendors::VendorRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database connection or query error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row exists but contains data the domain types reject
    #[error("Data corruption: {0}")]
    DataCorruption(String),

    /// Entity not found
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Convenience alias for repository results.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation onto [`RepositoryError::Conflict`].
///
/// All other database errors pass through as [`RepositoryError::Database`].
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_string());
    }
    RepositoryError::Database(e)
}

/// Map a foreign-key violation onto [`RepositoryError::Conflict`].
pub(crate) fn conflict_on_foreign_key(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_foreign_key_violation()
    {
        return RepositoryError::Conflict(message.to_string());
    }
    RepositoryError::Database(e)
}
