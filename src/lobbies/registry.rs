use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    appresult::{is_unique_violation, unknown_caller},
    db::{Lobby, LobbySummary},
};

/// Lobbies, their admin and their member sets.
#[derive(Debug, Clone)]
pub struct MembershipRegistry {
    db_pool: SqlitePool,
}

impl MembershipRegistry {
    pub fn new(db_pool: SqlitePool) -> Self {
        Self { db_pool }
    }

    /// Creates the lobby with `owner_id` as admin and first member. Both rows
    /// are written in one transaction.
    pub async fn create_lobby(&self, name: &str, owner_id: Uuid) -> AppResult<Uuid> {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }

        let lobby_id = Uuid::now_v7();
        let mut tx = self.db_pool.begin().await?;

        sqlx::query("INSERT INTO lobbies (id,name,admin_id) VALUES (?,?,?)")
            .bind(lobby_id)
            .bind(name)
            .bind(owner_id)
            .execute(&mut *tx)
            .await
            .map_err(unknown_caller)?;

        sqlx::query("INSERT INTO lobby_members (lobby_id,user_id) VALUES (?,?)")
            .bind(lobby_id)
            .bind(owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%lobby_id, admin_id = %owner_id, "created lobby");
        Ok(lobby_id)
    }

    pub async fn join_lobby(&self, lobby_id: Uuid, user_id: Uuid) -> AppResult<()> {
        if self.find_lobby(lobby_id).await?.is_none() {
            return Err(AppError::NotFound("Lobby not found"));
        }

        // the unique constraint settles concurrent joins for the same pair
        let inserted =
            sqlx::query("INSERT INTO lobby_members (lobby_id,user_id) VALUES (?,?)")
                .bind(lobby_id)
                .bind(user_id)
                .execute(&self.db_pool)
                .await;

        match inserted {
            Ok(_) => {
                tracing::info!(%lobby_id, %user_id, "joined lobby");
                Ok(())
            }
            Err(err) if is_unique_violation(&err) => {
                Err(AppError::Conflict("You are already a member of this lobby"))
            }
            Err(err) => Err(unknown_caller(err)),
        }
    }

    pub async fn find_lobby(&self, lobby_id: Uuid) -> AppResult<Option<Lobby>> {
        Ok(sqlx::query_as("SELECT id,name,admin_id FROM lobbies WHERE id=?")
            .bind(lobby_id)
            .fetch_optional(&self.db_pool)
            .await?)
    }

    pub async fn is_member(&self, lobby_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let found = sqlx::query("SELECT 1 FROM lobby_members WHERE lobby_id=? AND user_id=?")
            .bind(lobby_id)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn is_admin(&self, lobby_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let found = sqlx::query("SELECT 1 FROM lobbies WHERE id=? AND admin_id=?")
            .bind(lobby_id)
            .bind(user_id)
            .fetch_optional(&self.db_pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn lobbies_of(&self, user_id: Uuid) -> AppResult<Vec<LobbySummary>> {
        Ok(sqlx::query_as(
            "SELECT lobbies.id,lobbies.name FROM lobbies \
             JOIN lobby_members ON lobbies.id=lobby_members.lobby_id \
             WHERE lobby_members.user_id=? ORDER BY lobbies.id",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?)
    }
}
