use axum::{
    Json, debug_handler,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppJson, AppPath, AppResult, AppState,
    appresult::required,
    auth::AuthUser,
    messages::{LobbyTranscript, MessageLedger},
};

#[derive(Deserialize)]
pub(crate) struct PostMessageRequest {
    message: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lobby_messages(
    AuthUser(user_id): AuthUser,
    AppPath(lobby_id): AppPath<Uuid>,
    State(ledger): State<MessageLedger>,
) -> AppResult<Json<LobbyTranscript>> {
    Ok(Json(ledger.list_lobby_messages(lobby_id, user_id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn post_message(
    AuthUser(user_id): AuthUser,
    AppPath(lobby_id): AppPath<Uuid>,
    State(ledger): State<MessageLedger>,

    AppJson(PostMessageRequest { message }): AppJson<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let message = required(message)?;
    let id = ledger.post_lobby_message(lobby_id, user_id, &message).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "info": "Message sent successfully", "id": id })),
    ))
}
