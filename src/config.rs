use std::net::SocketAddr;

use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_MEDIA_URL: &str = "/media/";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Prefix joined with a post's image name to build its public URL.
    pub media_url: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let port = match std::env::var("PORT") {
            Ok(port) => port
                .parse()
                .with_context(|| format!("invalid PORT: {}", port))?,
            Err(_) => DEFAULT_PORT,
        };
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let media_url = std::env::var("MEDIA_URL").unwrap_or_else(|_| DEFAULT_MEDIA_URL.into());

        Ok(Self {
            host,
            port,
            database_url,
            media_url,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}
