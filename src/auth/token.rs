use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Missing bearer token")]
    Missing,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
}

/// Issues and verifies stateless bearer tokens.
///
/// A token is `payload.signature`, both base64url: the payload is the JSON
/// claims (`sub`, `exp`) and the signature is HMAC-SHA256 over the encoded
/// payload. Verification never touches storage, so a token stays valid until
/// it expires.
#[derive(Clone)]
pub struct TokenService {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> anyhow::Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_ref())
            .map_err(|_| anyhow::anyhow!("unusable token signing secret"))?;
        Ok(Self { mac })
    }

    pub fn issue(&self, user_id: Uuid) -> String {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> String {
        let claims = Claims {
            sub: user_id,
            exp: (now + TOKEN_TTL).unix_timestamp(),
        };
        // Claims only hold a uuid and an integer.
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
        let digest = self.mac(payload.as_bytes()).finalize().into_bytes();
        let signature = URL_SAFE_NO_PAD.encode(digest);

        format!("{payload}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<Uuid, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Invalid)?;

        self.mac(payload.as_bytes())
            .verify_slice(&signature)
            .map_err(|_| TokenError::Invalid)?;

        let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| TokenError::Invalid)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Invalid)?;

        if now.unix_timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.sub)
    }

    fn mac(&self, data: &[u8]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        mac.update(data);
        mac
    }
}
