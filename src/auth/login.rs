use axum::{Json, debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppJson, AppResult, appresult::required};

use super::{CredentialStore, TokenService};

#[derive(Deserialize)]
pub(crate) struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    access_token: String,
    id: Uuid,
    name: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn login(
    State(credentials): State<CredentialStore>,
    State(tokens): State<TokenService>,

    AppJson(LoginRequest { email, password }): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = required(email)?;
    let password = required(password)?;

    let logged_in = credentials.login(&tokens, &email, &password).await?;

    Ok(Json(LoginResponse {
        access_token: logged_in.token,
        id: logged_in.user_id,
        name: logged_in.nickname,
    }))
}
