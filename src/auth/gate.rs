use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

use crate::{AppError, AppResult, lobbies::MembershipRegistry};

use super::{TokenError, TokenService};

/// The caller's identity, taken from a verified `Authorization: Bearer` token.
///
/// Adding this extractor to a handler is what makes the route authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

impl<S> FromRequestParts<S> for AuthUser
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let tokens = TokenService::from_ref(state);

        match tokens.verify(token) {
            Ok(user_id) => Ok(AuthUser(user_id)),
            Err(err) => {
                tracing::debug!(%err, "rejected bearer token");
                Err(err.into())
            }
        }
    }
}

/// Only an absent header counts as `Missing`; any header that is present but
/// not a usable bearer credential is `Invalid`.
fn bearer_token(parts: &Parts) -> Result<&str, TokenError> {
    let header = parts.headers.get(AUTHORIZATION).ok_or(TokenError::Missing)?;
    let header = header.to_str().map_err(|_| TokenError::Invalid)?;
    let (scheme, token) = header.split_once(' ').ok_or(TokenError::Invalid)?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Ok(token)
    } else {
        Err(TokenError::Invalid)
    }
}

pub async fn ensure_member(
    registry: &MembershipRegistry,
    lobby_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    if registry.is_member(lobby_id, user_id).await? {
        Ok(())
    } else {
        tracing::debug!(%lobby_id, %user_id, "denied: not a member");
        Err(AppError::Forbidden("You are not member of this lobby"))
    }
}

/// Admin-ship is the only grant for mutating a lobby's messages; authorship
/// plays no part.
pub async fn ensure_admin(
    registry: &MembershipRegistry,
    lobby_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    if registry.is_admin(lobby_id, user_id).await? {
        Ok(())
    } else {
        tracing::debug!(%lobby_id, %user_id, "denied: not the admin");
        Err(AppError::Forbidden("You do not have authorization to modify this message"))
    }
}
