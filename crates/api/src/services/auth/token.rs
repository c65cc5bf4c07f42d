//! Bearer-token issue and verification.

use chrono::{TimeDelta, Utc};
use helpnet_core::AdminRole;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::AuthError;

/// Tokens expire one day after issue.
const TOKEN_TTL_HOURS: i64 = 24;

/// Which kind of account a token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenRole {
    Client,
    Vendor,
    Admin,
}

/// JWT claims carried by every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id within its role's table
    pub sub: i32,
    pub role: TokenRole,
    /// Permission level, present on admin tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_role: Option<AdminRole>,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Issued at, seconds since epoch
    pub iat: i64,
}

/// HS256 signer/verifier over the configured secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a signed token for a client or vendor account.
    pub fn issue(&self, sub: i32, role: TokenRole) -> Result<String, AuthError> {
        self.issue_claims(sub, role, None)
    }

    /// Issue a signed token for an admin, carrying its permission level.
    pub fn issue_admin(&self, sub: i32, admin_role: AdminRole) -> Result<String, AuthError> {
        self.issue_claims(sub, TokenRole::Admin, Some(admin_role))
    }

    fn issue_claims(
        &self,
        sub: i32,
        role: TokenRole,
        admin_role: Option<AdminRole>,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub,
            role,
            admin_role,
            exp: (now + TimeDelta::hours(TOKEN_TTL_HOURS)).timestamp(),
            iat: now.timestamp(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::Token)
    }

    /// Verify a token's signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Token)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from(
            "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6dE8",
        ))
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let tokens = service();
        let token = tokens.issue(42, TokenRole::Client).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, TokenRole::Client);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_admin_token_carries_permission_level() {
        let tokens = service();
        let token = tokens.issue_admin(7, AdminRole::Viewer).unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.role, TokenRole::Admin);
        assert_eq!(claims.admin_role, Some(AdminRole::Viewer));

        // Client tokens have no permission level
        let token = tokens.issue(7, TokenRole::Client).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().admin_role, None);
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let tokens = service();
        let mut token = tokens.issue(42, TokenRole::Vendor).unwrap();
        token.push('x');
        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_other_secret() {
        let token = service().issue(1, TokenRole::Admin).unwrap();
        let other = TokenService::new(&SecretString::from(
            "zZ9#wV7!tR5@qP3$nM1&kJ8*hG6^fD42",
        ));
        assert!(other.verify(&token).is_err());
    }
}
