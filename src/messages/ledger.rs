use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    AppError, AppResult,
    appresult::unknown_caller,
    auth::{CredentialStore, ensure_admin, ensure_member},
    db::{self, DirectMessage, LobbyMessage},
    lobbies::MembershipRegistry,
};

#[derive(Serialize, Debug)]
pub struct LobbyTranscript {
    pub messages: Vec<LobbyMessage>,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Serialize, Debug, Default)]
pub struct DirectInbox {
    pub sent: Vec<DirectMessage>,
    pub received: Vec<DirectMessage>,
}

/// Lobby and direct messages. Every lobby operation goes through the
/// membership or admin check before reading or writing a row.
#[derive(Debug, Clone)]
pub struct MessageLedger {
    db_pool: SqlitePool,
    registry: MembershipRegistry,
    credentials: CredentialStore,
}

impl MessageLedger {
    pub fn new(
        db_pool: SqlitePool,
        registry: MembershipRegistry,
        credentials: CredentialStore,
    ) -> Self {
        Self {
            db_pool,
            registry,
            credentials,
        }
    }

    pub async fn list_lobby_messages(
        &self,
        lobby_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<LobbyTranscript> {
        let Some(lobby) = self.registry.find_lobby(lobby_id).await? else {
            return Err(AppError::NotFound("Lobby not found"));
        };
        ensure_member(&self.registry, lobby_id, requester_id).await?;

        let mut messages: Vec<LobbyMessage> = sqlx::query_as(
            "SELECT messages.id,messages.lobby_id,messages.user_id,messages.message,\
             messages.created_at,users.nickname AS user_nickname FROM messages \
             JOIN users ON users.id=messages.user_id \
             WHERE messages.lobby_id=? ORDER BY messages.created_at,messages.id",
        )
        .bind(lobby_id)
        .fetch_all(&self.db_pool)
        .await?;

        for message in &mut messages {
            message.sender = message.user_id == requester_id;
        }

        Ok(LobbyTranscript {
            messages,
            is_admin: lobby.admin_id == requester_id,
        })
    }

    pub async fn post_lobby_message(
        &self,
        lobby_id: Uuid,
        user_id: Uuid,
        body: &str,
    ) -> AppResult<Uuid> {
        if body.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }
        ensure_member(&self.registry, lobby_id, user_id).await?;

        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO messages (id,lobby_id,user_id,message,created_at) VALUES (?,?,?,?,?)",
        )
        .bind(id)
        .bind(lobby_id)
        .bind(user_id)
        .bind(body)
        .bind(db::now())
        .execute(&self.db_pool)
        .await?;

        tracing::debug!(message_id = %id, %lobby_id, %user_id, "posted message");
        Ok(id)
    }

    pub async fn edit_lobby_message(
        &self,
        message_id: Uuid,
        requester_id: Uuid,
        new_body: &str,
    ) -> AppResult<()> {
        if new_body.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }
        let lobby_id = self.lobby_of(message_id).await?;
        ensure_admin(&self.registry, lobby_id, requester_id).await?;

        // last write wins
        let updated = sqlx::query("UPDATE messages SET message=? WHERE id=?")
            .bind(new_body)
            .bind(message_id)
            .execute(&self.db_pool)
            .await?;

        // deleted after the admin check
        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound("Message not found"));
        }

        tracing::info!(%message_id, %lobby_id, admin_id = %requester_id, "edited message");
        Ok(())
    }

    pub async fn delete_lobby_message(
        &self,
        message_id: Uuid,
        requester_id: Uuid,
    ) -> AppResult<()> {
        let lobby_id = self.lobby_of(message_id).await?;
        ensure_admin(&self.registry, lobby_id, requester_id).await?;

        let deleted = sqlx::query("DELETE FROM messages WHERE id=?")
            .bind(message_id)
            .execute(&self.db_pool)
            .await?;

        // a concurrent delete may have won the race
        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Message not found"));
        }

        tracing::info!(%message_id, %lobby_id, admin_id = %requester_id, "deleted message");
        Ok(())
    }

    pub async fn send_direct_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        body: &str,
    ) -> AppResult<Uuid> {
        if body.trim().is_empty() {
            return Err(AppError::InvalidInput("Invalid request"));
        }
        if !self.credentials.exists(receiver_id).await? {
            return Err(AppError::NotFound("Recipient user not found"));
        }

        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO direct_messages (id,sender_id,receiver_id,message,created_at) \
             VALUES (?,?,?,?,?)",
        )
        .bind(id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(body)
        .bind(db::now())
        .execute(&self.db_pool)
        .await
        .map_err(unknown_caller)?;

        tracing::debug!(message_id = %id, %sender_id, %receiver_id, "sent direct message");
        Ok(id)
    }

    pub async fn list_direct_messages(&self, user_id: Uuid) -> AppResult<DirectInbox> {
        let sent = sqlx::query_as(
            "SELECT dm.id,dm.sender_id,dm.receiver_id,dm.message,dm.created_at,\
             u.nickname AS partner_nickname \
             FROM direct_messages dm JOIN users u ON u.id=dm.receiver_id \
             WHERE dm.sender_id=? ORDER BY dm.created_at,dm.id",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        let received = sqlx::query_as(
            "SELECT dm.id,dm.sender_id,dm.receiver_id,dm.message,dm.created_at,\
             u.nickname AS partner_nickname \
             FROM direct_messages dm JOIN users u ON u.id=dm.sender_id \
             WHERE dm.receiver_id=? ORDER BY dm.created_at,dm.id",
        )
        .bind(user_id)
        .fetch_all(&self.db_pool)
        .await?;

        Ok(DirectInbox { sent, received })
    }

    async fn lobby_of(&self, message_id: Uuid) -> AppResult<Uuid> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT lobby_id FROM messages WHERE id=?")
            .bind(message_id)
            .fetch_optional(&self.db_pool)
            .await?;

        found
            .map(|(lobby_id,)| lobby_id)
            .ok_or(AppError::NotFound("Message not found"))
    }
}
