//! Authentication service: registration, login, password hashing.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use helpnet_core::Email;

use crate::db::clients::Client;
use crate::db::vendors::Vendor;
use crate::db::{AdminUserRepository, ClientRepository, RepositoryError, VendorRepository};
use crate::db::admin_users::AdminUser;

mod error;
mod token;

pub use error::AuthError;
pub use token::{Claims, TokenRole, TokenService};

/// Minimum password length for registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a password with Argon2id and a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::Hashing)
}

/// Verify a password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::Hashing)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn check_password_length(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(())
}

fn map_conflict(e: RepositoryError) -> AuthError {
    match e {
        RepositoryError::Conflict(_) => AuthError::EmailTaken,
        other => AuthError::Repository(other),
    }
}

/// Registration and login over the account repositories.
#[derive(Clone)]
pub struct AuthService {
    clients: ClientRepository,
    vendors: VendorRepository,
    admins: AdminUserRepository,
    tokens: TokenService,
}

impl AuthService {
    #[must_use]
    pub const fn new(
        clients: ClientRepository,
        vendors: VendorRepository,
        admins: AdminUserRepository,
        tokens: TokenService,
    ) -> Self {
        Self {
            clients,
            vendors,
            admins,
            tokens,
        }
    }

    /// Register a shopper account and log it in.
    pub async fn register_client(
        &self,
        email: &str,
        password: &str,
        name: &str,
        cpf: Option<&str>,
    ) -> Result<(Client, String), AuthError> {
        let email = Email::parse(email)?;
        check_password_length(password)?;
        let hash = hash_password(password)?;

        let client = self
            .clients
            .create(&email, &hash, name, cpf)
            .await
            .map_err(map_conflict)?;
        let token = self.tokens.issue(client.id.as_i32(), TokenRole::Client)?;
        tracing::info!(client_id = %client.id, "client registered");
        Ok((client, token))
    }

    /// Log a shopper in. Every failure mode collapses into
    /// [`AuthError::InvalidCredentials`].
    pub async fn login_client(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Client, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let client = self
            .clients
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &client.password_hash)?;

        let token = self.tokens.issue(client.id.as_i32(), TokenRole::Client)?;
        Ok((client, token))
    }

    /// Register a store account and log it in.
    pub async fn register_vendor(
        &self,
        email: &str,
        password: &str,
        store_name: &str,
        cnpj: Option<&str>,
    ) -> Result<(Vendor, String), AuthError> {
        let email = Email::parse(email)?;
        check_password_length(password)?;
        let hash = hash_password(password)?;

        let vendor = self
            .vendors
            .create(&email, &hash, store_name, cnpj)
            .await
            .map_err(map_conflict)?;
        let token = self.tokens.issue(vendor.id.as_i32(), TokenRole::Vendor)?;
        tracing::info!(vendor_id = %vendor.id, "vendor registered");
        Ok((vendor, token))
    }

    /// Log a store in.
    pub async fn login_vendor(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Vendor, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let vendor = self
            .vendors
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &vendor.password_hash)?;

        let token = self.tokens.issue(vendor.id.as_i32(), TokenRole::Vendor)?;
        Ok((vendor, token))
    }

    /// Log an admin in. Admin accounts are created by the CLI only.
    pub async fn login_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(AdminUser, String), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;
        let admin = self
            .admins
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, &admin.password_hash)?;

        let token = self.tokens.issue_admin(admin.id.as_i32(), admin.role)?;
        Ok((admin, token))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("correct horse battery").unwrap();
        let err = verify_password("wrong password", &hash).unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_password_length_boundary() {
        assert!(check_password_length("1234567").is_err());
        assert!(check_password_length("12345678").is_ok());
    }
}
