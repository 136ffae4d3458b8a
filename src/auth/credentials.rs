use std::sync::OnceLock;

use anyhow::anyhow;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{AppError, AppResult, appresult::is_unique_violation, db::User};

use super::TokenService;

#[derive(Debug, Clone)]
pub struct LoggedIn {
    pub token: String,
    pub user_id: Uuid,
    pub nickname: String,
}

/// User records and password checks.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    db_pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    pub async fn register(&self, email: &str, nickname: &str, password: &str) -> AppResult<Uuid> {
        if email.trim().is_empty() || nickname.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }

        let password_hash = hash_password(password.to_owned()).await?;
        let id = Uuid::now_v7();

        let inserted =
            sqlx::query("INSERT INTO users (id,email,nickname,password_hash) VALUES (?,?,?,?)")
                .bind(id)
                .bind(email)
                .bind(nickname)
                .bind(&password_hash)
                .execute(&self.db_pool)
                .await;

        match inserted {
            Ok(_) => {
                tracing::info!(user_id = %id, "registered user");
                Ok(id)
            }
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Conflict("Email or nickname already in use"))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn login(
        &self,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> AppResult<LoggedIn> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }

        let user: Option<User> =
            sqlx::query_as("SELECT id,email,nickname,password_hash FROM users WHERE email=?")
                .bind(email)
                .fetch_optional(&self.db_pool)
                .await?;

        let Some(user) = user else {
            // same hashing cost whether or not the email exists
            let dummy = tokio::task::spawn_blocking(dummy_hash).await??;
            verify_password(password.to_owned(), dummy.to_owned()).await?;
            return Err(AppError::InvalidCredentials("User not found"));
        };

        if !verify_password(password.to_owned(), user.password_hash).await? {
            return Err(AppError::InvalidCredentials("Incorrect password"));
        }

        tracing::info!(user_id = %user.id, "user logged in");
        Ok(LoggedIn {
            token: tokens.issue(user.id),
            user_id: user.id,
            nickname: user.nickname,
        })
    }

    pub async fn find_by_nickname(&self, nickname: &str) -> AppResult<Uuid> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE nickname=?")
            .bind(nickname)
            .fetch_optional(&self.db_pool)
            .await?;

        found
            .map(|(id,)| id)
            .ok_or(AppError::NotFound("User not found"))
    }

    pub async fn exists(&self, user_id: Uuid) -> AppResult<bool> {
        let found = sqlx::query("SELECT 1 FROM users WHERE id=?")
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(found.is_some())
    }
}

async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))
    })
    .await?
}

async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || -> AppResult<bool> {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AppError::Internal(anyhow!("stored password hash is unreadable: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await?
}

fn dummy_hash() -> AppResult<&'static str> {
    static DUMMY: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY.get() {
        return Ok(hash.as_str());
    }
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"not-a-real-password", &salt)
        .map_err(|e| AppError::Internal(anyhow!("password hashing failed: {e}")))?
        .to_string();
    Ok(DUMMY.get_or_init(|| hash).as_str())
}
