//! User model and caller identity

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Short user representation for loan listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub id: i32,
    pub name: String,
}

/// JWT claims carried by librarian tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub id: i32,
    pub email: String,
    pub exp: i64,
}

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i32,
    pub email: String,
}

impl From<UserClaims> for Principal {
    fn from(claims: UserClaims) -> Self {
        Self {
            user_id: claims.id,
            email: claims.email,
        }
    }
}
