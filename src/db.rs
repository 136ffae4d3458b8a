use std::str::FromStr;

use anyhow::Context;
use serde::Serialize;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nickname: String,
    pub password_hash: String,

    // unique: id
    // unique: email
    // unique: nickname
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Lobby {
    pub id: Uuid,
    pub name: String,
    pub admin_id: Uuid,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LobbySummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct LobbyMessage {
    pub id: Uuid,
    pub lobby_id: Uuid,
    pub user_id: Uuid,
    pub message: String,
    pub created_at: i64,

    pub user_nickname: String,
    /// Whether the requester wrote this message. Never stored.
    #[sqlx(skip)]
    pub sender: bool,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct DirectMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub created_at: i64,

    /// Nickname of the other participant, resolved per read.
    #[serde(rename = "partnerNickname")]
    pub partner_nickname: String,
}

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        // in-memory databases vanish with their connection
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .context("failed to open database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    Ok(pool)
}

pub fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}
