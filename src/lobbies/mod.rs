mod join;
mod msg;
mod new;
mod registry;

use axum::{
    Json, Router, debug_handler,
    extract::State,
    routing::{get, post},
};

use crate::{AppResult, AppState, auth::AuthUser, db::LobbySummary};

pub use registry::MembershipRegistry;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/lobbies", get(my_lobbies))
        .route("/api/create-lobby", post(new::new_lobby))
        .route("/api/lobby/{lobby_id}/join", post(join::join_lobby))
        .route("/api/lobby/{lobby_id}/messages", get(msg::lobby_messages))
        .route("/api/lobby/{lobby_id}/post-message", post(msg::post_message))
}

#[debug_handler(state = AppState)]
async fn my_lobbies(
    AuthUser(user_id): AuthUser,
    State(registry): State<MembershipRegistry>,
) -> AppResult<Json<Vec<LobbySummary>>> {
    Ok(Json(registry.lobbies_of(user_id).await?))
}
