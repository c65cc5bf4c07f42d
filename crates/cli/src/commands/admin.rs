//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! hn-cli admin create -e admin@helpnet.app.br -n "Admin" -r super_admin
//! ```
//!
//! The password is generated here and printed exactly once; only the Argon2
//! hash is stored.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use helpnet_core::AdminRole;
use rand::Rng;
use rand::distr::Alphanumeric;

use super::{CommandError, connect};

const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Create a new admin user.
///
/// # Arguments
///
/// * `email` - Admin's email address
/// * `name` - Admin's display name
/// * `role` - Admin's role (`super_admin`, `admin`, or `viewer`)
///
/// # Returns
///
/// The ID of the created admin user.
pub async fn create_user(email: &str, name: &str, role: &str) -> Result<i32, CommandError> {
    // Parse and validate role
    let role: AdminRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;

    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(CommandError::InvalidEmail(email.to_owned()));
    }

    let pool = connect().await?;

    tracing::info!("Creating admin user: {} ({})", email, role);

    // Check if user already exists
    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM admin_users WHERE email = $1")
        .bind(email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(CommandError::UserExists(email.to_owned()));
    }

    let password = generate_password();
    let password_hash = hash_password(&password)?;

    // Create the user
    let user_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO admin_users (email, name, role, password_hash)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(email)
    .bind(name)
    .bind(role)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}, Role: {}",
        user_id,
        email,
        role
    );
    tracing::info!("Generated password (shown once, store it now): {}", password);

    Ok(user_id)
}

fn generate_password() -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| char::from(rng.sample(Alphanumeric)))
        .take(GENERATED_PASSWORD_LENGTH)
        .collect()
}

pub(crate) fn hash_password(password: &str) -> Result<String, CommandError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| CommandError::Hashing)
}
