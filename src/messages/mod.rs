mod direct;
mod ledger;
mod moderate;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::AppState;

pub use ledger::{DirectInbox, LobbyTranscript, MessageLedger};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/message/{message_id}/edit", put(moderate::edit_message))
        .route("/api/message/{message_id}/delete", delete(moderate::delete_message))
        .route("/api/find-user/{nickname}", get(direct::find_user))
        .route("/api/send-direct-message", post(direct::send_direct_message))
        .route("/api/direct-messages", get(direct::direct_messages))
}
