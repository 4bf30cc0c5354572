/// Password Hashing and Verification
///
/// bcrypt at cost 10. Hashing is CPU-bound, so both operations run on the
/// blocking thread pool and are awaited by the handlers.

use bcrypt::{hash, verify};

use crate::error::AppError;

pub const BCRYPT_COST: u32 = 10;

/// Hash a password using bcrypt
///
/// Length rules are enforced by `validators::validate_registration`.
///
/// # Errors
/// Returns error if bcrypt hashing fails or the blocking task is lost
pub async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash(password, BCRYPT_COST))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// # Errors
/// Returns error if the stored hash is malformed
pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_password() {
        let password = "password123";
        let hash = hash_password(password.to_string()).await.expect("Failed to hash password");

        assert_ne!(password, hash);
        // bcrypt identifier and cost
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$10$"));
    }

    #[tokio::test]
    async fn test_verify_password() {
        let hash = hash_password("password123".to_string()).await.unwrap();

        let is_valid = verify_password("password123".to_string(), hash.clone()).await.unwrap();
        assert!(is_valid);

        let is_valid = verify_password("password124".to_string(), hash).await.unwrap();
        assert!(!is_valid);
    }

    #[tokio::test]
    async fn test_malformed_hash() {
        let result = verify_password("password123".to_string(), "not-a-hash".to_string()).await;
        assert!(result.is_err());
    }
}
