/**
 * Password Hashing
 *
 * bcrypt is CPU-bound, so hashing and verification run on the blocking
 * thread pool instead of stalling the async runtime.
 */

use crate::backend::error::BackendError;

/// Hash a password with the given bcrypt cost
pub async fn hash_password(password: &str, cost: u32) -> Result<String, BackendError> {
    let password = password.to_string();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Check a password against a stored hash; a malformed hash never matches
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, BackendError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    match matches {
        Ok(matches) => Ok(matches),
        Err(e) => {
            tracing::error!("Stored password hash is unreadable: {:?}", e);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_password("correct horse", 4).await.unwrap();
        assert!(verify_password("correct horse", &hash).await.unwrap());
        assert!(!verify_password("wrong horse", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_malformed_hash_never_matches() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
    }
}
