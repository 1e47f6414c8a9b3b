use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::user::User;
use argon2::Argon2;
use chrono::Utc;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;
use uuid::Uuid;

/// A real Argon2 hash generated once, used as a timing decoy so that logins for unknown
/// emails cost the same as logins for existing accounts.
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

impl SqliteRepository {
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> Result<User, AppError> {
        if self.get_user_by_username(username).await?.is_some() {
            return Err(AppError::UserAlreadyExists("Username".to_string()));
        }
        if self.get_user_by_email(email).await?.is_some() {
            return Err(AppError::UserAlreadyExists("Email".to_string()));
        }

        let password_hash = password_hash(password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(email)
        .bind(&password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // lost a race against a concurrent registration
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::UserAlreadyExists("Username or email".to_string()),
            e => AppError::from(e),
        })?;

        Ok(user)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, email, password_hash, created_at FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Returns the user for a matching email and password. Unknown emails and wrong passwords
    /// both yield `InvalidCredentials`.
    pub async fn authenticate_user(&self, email: &str, password: &str) -> Result<User, AppError> {
        match self.get_user_by_email(email).await? {
            Some(user) => {
                self.verify_password(&user, password)?;
                Ok(user)
            }
            None => {
                Self::dummy_verify(password);
                Err(AppError::InvalidCredentials)
            }
        }
    }

    #[allow(clippy::result_large_err)]
    pub fn verify_password(&self, user: &User, password: &str) -> Result<(), AppError> {
        let password_hash = PasswordHash::new(&user.password_hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &password_hash)
            .map_err(|_| AppError::InvalidCredentials)?;

        Ok(())
    }

    pub fn dummy_verify(password: &str) {
        if let Some(Ok(hash)) = DUMMY_HASH.as_deref().map(PasswordHash::new) {
            let _ = Argon2::default().verify_password(password.as_bytes(), &hash);
        }
    }
}

#[allow(clippy::result_large_err)]
pub(crate) fn password_hash(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_repository;

    #[tokio::test]
    async fn register_then_authenticate() {
        let (repo, _dir) = test_repository().await;
        let user = repo.create_user("alice", "alice@x.com", "pw").await.unwrap();
        assert_ne!(user.password_hash, "pw");

        let authenticated = repo.authenticate_user("alice@x.com", "pw").await.unwrap();
        assert_eq!(authenticated.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_username_or_email_is_rejected() {
        let (repo, _dir) = test_repository().await;
        repo.create_user("alice", "alice@x.com", "pw").await.unwrap();

        let same_name = repo.create_user("alice", "other@x.com", "pw").await;
        assert!(matches!(same_name, Err(AppError::UserAlreadyExists(ref f)) if f == "Username"));

        let same_email = repo.create_user("alice2", "alice@x.com", "pw").await;
        assert!(matches!(same_email, Err(AppError::UserAlreadyExists(ref f)) if f == "Email"));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let (repo, _dir) = test_repository().await;
        repo.create_user("alice", "alice@x.com", "pw").await.unwrap();

        let wrong_password = repo.authenticate_user("alice@x.com", "nope").await;
        let unknown_email = repo.authenticate_user("nobody@x.com", "pw").await;

        assert!(matches!(wrong_password, Err(AppError::InvalidCredentials)));
        assert!(matches!(unknown_email, Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn password_hash_is_salted() {
        let first = password_hash("pw").unwrap();
        let second = password_hash("pw").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2"));
    }
}
