/// JWT Claims structures
///
/// Access tokens identify the user by id and username; refresh tokens
/// carry only the id. Both include the standard `iat`, `exp` and `iss`
/// claims (RFC 7519).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// User ID
    pub id: Uuid,
    /// Username, or email when the account has no username
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl AccessClaims {
    pub fn new(id: Uuid, username: String, issued_at: i64, expiry_seconds: i64, issuer: String) -> Self {
        Self {
            id,
            username,
            iat: issued_at,
            exp: issued_at + expiry_seconds,
            iss: issuer,
        }
    }
}

/// Claims for refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    /// User ID
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

impl RefreshClaims {
    pub fn new(id: Uuid, issued_at: i64, expiry_seconds: i64, issuer: String) -> Self {
        Self {
            id,
            iat: issued_at,
            exp: issued_at + expiry_seconds,
            iss: issuer,
        }
    }
}

/// Identity attached to a request by the auth gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
}

impl From<AccessClaims> for AuthenticatedUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
        }
    }
}
