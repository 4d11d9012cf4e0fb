//! Caller verification for protected endpoints

use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{
    error::{AppError, AppResult},
    models::user::{Principal, UserClaims},
};

const INVALID_TOKEN: &str = "Invalid or expired token";

/// Turns a bearer token into the caller it identifies
#[cfg_attr(test, mockall::automock)]
pub trait CallerVerifier: Send + Sync {
    fn verify_caller(&self, token: &str) -> AppResult<Principal>;
}

/// HS256 JWT verification against a shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl CallerVerifier for JwtVerifier {
    fn verify_caller(&self, token: &str) -> AppResult<Principal> {
        let data = decode::<UserClaims>(token, &self.key, &Validation::default()).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Authentication(INVALID_TOKEN.to_string())
        })?;
        Ok(data.claims.into())
    }
}
