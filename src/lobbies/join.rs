use axum::{Json, debug_handler, extract::State};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppPath, AppResult, AppState, auth::AuthUser};

use super::MembershipRegistry;

#[debug_handler(state = AppState)]
pub(crate) async fn join_lobby(
    AuthUser(user_id): AuthUser,
    AppPath(lobby_id): AppPath<Uuid>,
    State(registry): State<MembershipRegistry>,
) -> AppResult<Json<Value>> {
    registry.join_lobby(lobby_id, user_id).await?;

    Ok(Json(json!({ "info": "You have joined the lobby successfully" })))
}
