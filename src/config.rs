use anyhow::{Context, bail};
use axum::http::{
    HeaderValue, Method,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use tower_http::cors::{AllowOrigin, CorsLayer};

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub token_secret: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> anyhow::Result<Config> {
        let database_url = dotenv::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let token_secret =
            dotenv::var("ACCESS_TOKEN_SECRET").context("ACCESS_TOKEN_SECRET must be set")?;
        if token_secret.trim().is_empty() {
            bail!("ACCESS_TOKEN_SECRET must not be empty");
        }

        let port = match dotenv::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("PORT {port:?} is not a port number"))?,
            Err(_) => DEFAULT_PORT,
        };

        let origins = dotenv::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ORIGINS.to_owned());
        let allowed_origins = parse_origins(&origins)?;

        Ok(Config {
            database_url,
            token_secret,
            port,
            allowed_origins,
        })
    }

    pub fn cors(&self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(self.allowed_origins.clone()))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION])
            .allow_credentials(true)
    }
}

fn parse_origins(origins: &str) -> anyhow::Result<Vec<HeaderValue>> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("bad origin {origin:?}"))
        })
        .collect()
}
