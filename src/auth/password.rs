use sqlx::SqlitePool;
use thiserror::Error;

use super::Identity;
use crate::db::queries::users::get_user_by_email;

/// Matches the cost the stored hashes were created with.
pub const HASH_COST: u32 = 10;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error("credential verification task failed")]
    Verification(#[source] tokio::task::JoinError),
}

pub fn hash_password(plaintext: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, HASH_COST)
}

pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Verifies email+password against the stored salted hash and returns the
/// user's identity. A rejected login is always an `Err(InvalidCredentials)`,
/// never a panic or a distinguishable "no such user" answer.
pub async fn authenticate(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<Identity, AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let user = get_user_by_email(pool, email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    // bcrypt is deliberately slow; keep it off the async runtime.
    let password = password.to_owned();
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(AuthError::Verification)?;

    if !matches {
        tracing::info!(email, "rejected login");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{create_test_db, insert_test_user};

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("password1").unwrap();
        assert!(verify_password("password1", &hash));
        assert!(!verify_password("password2", &hash));
    }

    #[test]
    fn verify_against_garbage_hash_is_false() {
        assert!(!verify_password("password1", "not-a-bcrypt-hash"));
    }

    #[tokio::test]
    async fn valid_credentials_return_identity() {
        let pool = create_test_db().await.unwrap();
        insert_test_user(&pool, "Ada", "Lovelace", "a@b.com", "password1")
            .await
            .unwrap();

        let identity = authenticate(&pool, "a@b.com", "password1").await.unwrap();
        assert_eq!(identity.email, "a@b.com");
        assert_eq!(identity.name, "Ada");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_are_indistinguishable() {
        let pool = create_test_db().await.unwrap();
        insert_test_user(&pool, "Ada", "Lovelace", "a@b.com", "password1")
            .await
            .unwrap();

        let wrong_password = authenticate(&pool, "a@b.com", "wrong").await.unwrap_err();
        let unknown_email = authenticate(&pool, "x@y.com", "password1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn single_character_mutation_is_rejected() {
        let pool = create_test_db().await.unwrap();
        insert_test_user(&pool, "Ada", "Lovelace", "a@b.com", "password1")
            .await
            .unwrap();

        for mutated in ["password2", "Password1", "password", "password11"] {
            let err = authenticate(&pool, "a@b.com", mutated).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn empty_password_is_rejected_without_lookup() {
        let pool = create_test_db().await.unwrap();
        let err = authenticate(&pool, "a@b.com", "").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
