use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppJson, AppResult, AppState, appresult::required, auth::AuthUser};

use super::MembershipRegistry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewLobbyRequest {
    lobby_name: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn new_lobby(
    AuthUser(user_id): AuthUser,
    State(registry): State<MembershipRegistry>,

    AppJson(NewLobbyRequest { lobby_name }): AppJson<NewLobbyRequest>,
) -> AppResult<Json<Value>> {
    let name = required(lobby_name)?;
    let lobby_id = registry.create_lobby(&name, user_id).await?;

    Ok(Json(json!({ "info": "Lobby created successfully", "lobbyId": lobby_id })))
}
