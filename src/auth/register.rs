use axum::{Json, debug_handler, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppJson, AppResult, appresult::required};

use super::CredentialStore;

#[derive(Deserialize)]
pub(crate) struct RegisterRequest {
    email: Option<String>,
    nickname: Option<String>,
    password: Option<String>,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn register(
    State(credentials): State<CredentialStore>,

    AppJson(RegisterRequest { email, nickname, password }): AppJson<RegisterRequest>,
) -> AppResult<Json<Value>> {
    let email = required(email)?;
    let nickname = required(nickname)?;
    let password = required(password)?;

    credentials.register(&email, &nickname, &password).await?;

    Ok(Json(json!({ "info": "User created successfully" })))
}
