use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    AppError, AppJson, AppPath, AppResult, AppState,
    appresult::required,
    auth::{AuthUser, CredentialStore},
};

use super::{DirectInbox, MessageLedger};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SendDirectMessageRequest {
    recipient_id: Option<Uuid>,
    message: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn find_user(
    AuthUser(_): AuthUser,
    AppPath(nickname): AppPath<String>,
    State(credentials): State<CredentialStore>,
) -> AppResult<Json<Value>> {
    let id = credentials.find_by_nickname(&nickname).await?;

    Ok(Json(json!({ "id": id })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn send_direct_message(
    AuthUser(user_id): AuthUser,
    State(ledger): State<MessageLedger>,

    AppJson(SendDirectMessageRequest { recipient_id, message }): AppJson<SendDirectMessageRequest>,
) -> AppResult<Json<Value>> {
    let recipient_id = recipient_id.ok_or(AppError::InvalidInput("Invalid request"))?;
    let message = required(message)?;

    ledger.send_direct_message(user_id, recipient_id, &message).await?;

    Ok(Json(json!({ "info": "Direct message sent successfully" })))
}

#[debug_handler(state = AppState)]
pub(crate) async fn direct_messages(
    AuthUser(user_id): AuthUser,
    State(ledger): State<MessageLedger>,
) -> AppResult<Json<DirectInbox>> {
    Ok(Json(ledger.list_direct_messages(user_id).await?))
}
