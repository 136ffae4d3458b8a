use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppJson, AppPath, AppResult, AppState, appresult::required, auth::AuthUser};

use super::MessageLedger;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditMessageRequest {
    new_message: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn edit_message(
    AuthUser(user_id): AuthUser,
    AppPath(message_id): AppPath<Uuid>,
    State(ledger): State<MessageLedger>,

    AppJson(EditMessageRequest { new_message }): AppJson<EditMessageRequest>,
) -> AppResult<Json<Value>> {
    let new_message = required(new_message)?;
    ledger.edit_lobby_message(message_id, user_id, &new_message).await?;

    Ok(Json(json!({ "info": "Message updated" })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn delete_message(
    AuthUser(user_id): AuthUser,
    AppPath(message_id): AppPath<Uuid>,
    State(ledger): State<MessageLedger>,
) -> AppResult<Json<Value>> {
    ledger.delete_lobby_message(message_id, user_id).await?;

    Ok(Json(json!({ "info": "Message deleted successfully" })))
}
