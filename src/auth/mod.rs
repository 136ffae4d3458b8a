use axum::{Router, routing::post};

use crate::AppState;

mod credentials;
mod gate;
mod login;
mod register;
mod token;

pub use credentials::{CredentialStore, LoggedIn};
pub use gate::{AuthUser, ensure_admin, ensure_member};
pub use token::{TOKEN_TTL, TokenError, TokenService};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register::register))
        .route("/api/login", post(login::login))
}
