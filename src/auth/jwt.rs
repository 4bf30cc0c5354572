/// JWT Token Issuance and Validation
///
/// Access and refresh tokens are HS256-signed with two different secrets,
/// so a token of one kind never verifies as the other.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::domain::User;
use crate::error::{AppError, AuthError, ConfigError};

/// Freshly minted access/refresh token pair
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issue a new token pair for `user`, valid from now.
///
/// # Errors
/// `AppError::Config` if either signing secret is missing.
pub fn issue_tokens(user: &User, config: &JwtSettings) -> Result<TokenPair, AppError> {
    issue_tokens_at(user, config, Utc::now())
}

/// Issue a token pair as if it were `issued_at`.
pub fn issue_tokens_at(
    user: &User,
    config: &JwtSettings,
    issued_at: DateTime<Utc>,
) -> Result<TokenPair, AppError> {
    let now = issued_at.timestamp();

    let access_claims = AccessClaims::new(
        user.id,
        user.display_name().to_string(),
        now,
        config.access_token_expiry,
        config.issuer.clone(),
    );
    let refresh_claims = RefreshClaims::new(
        user.id,
        now,
        config.refresh_token_expiry,
        config.issuer.clone(),
    );

    Ok(TokenPair {
        access_token: sign(&access_claims, &config.access_secret, "jwt.access_secret")?,
        refresh_token: sign(&refresh_claims, &config.refresh_secret, "jwt.refresh_secret")?,
    })
}

fn sign<T: serde::Serialize>(claims: &T, secret: &str, key: &str) -> Result<String, AppError> {
    if secret.is_empty() {
        tracing::error!(setting = key, "Refusing to sign token without a secret");
        return Err(ConfigError::MissingRequired(key.to_string()).into());
    }

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and extract its claims
///
/// # Errors
/// `AuthError::InvalidAccessToken` with the verifier's message if the token
/// is malformed, expired, tampered with or from another issuer.
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<AccessClaims, AppError> {
    verify::<AccessClaims>(token, &config.access_secret, &config.issuer)
        .map_err(|e| AuthError::InvalidAccessToken(e).into())
}

/// Validate a refresh token and extract its claims
pub fn validate_refresh_token(token: &str, config: &JwtSettings) -> Result<RefreshClaims, AppError> {
    verify::<RefreshClaims>(token, &config.refresh_secret, &config.issuer)
        .map_err(|e| AuthError::InvalidRefreshToken(e).into())
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, String> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            e.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_secret: "test-access-secret-at-least-32-characters".to_string(),
            refresh_secret: "test-refresh-secret-at-least-32-characters".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            name: "Alice".to_string(),
            email: Some("alice@example.com".to_string()),
            password_hash: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_issue_and_validate_tokens() {
        let config = get_test_config();
        let user = test_user();

        let pair = issue_tokens(&user, &config).expect("Failed to issue tokens");

        let access = validate_access_token(&pair.access_token, &config).expect("Invalid access token");
        assert_eq!(access.id, user.id);
        assert_eq!(access.username, "alice");
        assert_eq!(access.exp - access.iat, 900);

        let refresh = validate_refresh_token(&pair.refresh_token, &config).expect("Invalid refresh token");
        assert_eq!(refresh.id, user.id);
        assert_eq!(refresh.exp - refresh.iat, 604800);
    }

    #[test]
    fn test_tokens_are_not_interchangeable() {
        let config = get_test_config();
        let pair = issue_tokens(&test_user(), &config).unwrap();

        assert!(validate_access_token(&pair.refresh_token, &config).is_err());
        assert!(validate_refresh_token(&pair.access_token, &config).is_err());
    }

    #[test]
    fn test_access_token_expires_after_fifteen_minutes() {
        let config = get_test_config();
        let issued = Utc::now() - Duration::minutes(16);
        let pair = issue_tokens_at(&test_user(), &config, issued).unwrap();

        let err = validate_access_token(&pair.access_token, &config).unwrap_err();
        match err {
            AppError::Auth(AuthError::InvalidAccessToken(msg)) => {
                assert!(msg.contains("ExpiredSignature"), "unexpected message: {}", msg)
            }
            other => panic!("Expected InvalidAccessToken, got {:?}", other),
        }

        // The refresh token from the same pair is still valid
        assert!(validate_refresh_token(&pair.refresh_token, &config).is_ok());
    }

    #[test]
    fn test_tampered_token() {
        let config = get_test_config();
        let pair = issue_tokens(&test_user(), &config).unwrap();

        let tampered = format!("{}X", pair.access_token);
        assert!(validate_access_token(&tampered, &config).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let mut config = get_test_config();
        let pair = issue_tokens(&test_user(), &config).unwrap();

        config.issuer = "wrong-issuer".to_string();
        assert!(validate_access_token(&pair.access_token, &config).is_err());
    }

    #[test]
    fn test_missing_secret_refuses_to_sign() {
        let mut config = get_test_config();
        config.access_secret.clear();

        let err = issue_tokens(&test_user(), &config).unwrap_err();
        assert!(matches!(err, AppError::Config(ConfigError::MissingRequired(_))));
    }

    #[test]
    fn test_garbage_token() {
        let config = get_test_config();
        assert!(validate_access_token("invalid.token.here", &config).is_err());
    }
}
