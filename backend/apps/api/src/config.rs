//! Application Configuration
//!
//! Reads the process environment (after `.env` is loaded) into one
//! [`AppConfig`], then derives the per-crate configs from it.

use std::net::SocketAddr;

use anyhow::{Context, bail};
use auth::AuthConfig;
use auth::application::config::DEV_ADMIN_PASSWORD;
use captcha::CaptchaConfig;
use platform::client::DEFAULT_TRUSTED_PROXY_HOPS;
use platform::crypto::from_base64;
use platform::password::{ClearTextPassword, HashedPassword};
use shield::ShieldConfig;
use shield::config::DEFAULT_ALLOWED_ORIGINS;

pub const DEFAULT_PORT: u16 = 5500;
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// `APP_ENV=production`
    pub production: bool,
    pub allowed_origins: Vec<String>,
    pub admin_password: HashedPassword,
    pub token_secret: [u8; 32],
    pub max_body_bytes: usize,
    /// Reverse proxies in front of the server; 0 ignores `X-Forwarded-For`
    pub trusted_proxy_hops: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let production = var("APP_ENV").is_some_and(|v| v.trim() == "production");

        let port = match var("PORT") {
            Some(p) => p.trim().parse().context("PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let max_body_bytes = match var("MAX_BODY_BYTES") {
            Some(n) => n
                .trim()
                .parse()
                .context("MAX_BODY_BYTES must be a byte count")?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let trusted_proxy_hops = match var("TRUSTED_PROXY_HOPS") {
            Some(n) => n
                .trim()
                .parse()
                .context("TRUSTED_PROXY_HOPS must be a proxy count")?,
            None => DEFAULT_TRUSTED_PROXY_HOPS,
        };

        let allowed_origins = match var("ALLOWED_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(str::to_owned)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        };

        let admin_password = match var("ADMIN_PASSWORD_HASH") {
            Some(phc) => HashedPassword::from_phc_string(phc.trim())
                .context("ADMIN_PASSWORD_HASH must be an Argon2 PHC string")?,
            None if production => bail!("ADMIN_PASSWORD_HASH must be set in production"),
            None => {
                tracing::warn!("ADMIN_PASSWORD_HASH not set, using the development password");
                ClearTextPassword::new(DEV_ADMIN_PASSWORD.to_owned())?.hash()?
            }
        };

        let token_secret = match var("JWT_SECRET") {
            Some(b64) => decode_secret(b64.trim())?,
            None if production => bail!("JWT_SECRET must be set in production"),
            None => {
                tracing::warn!("JWT_SECRET not set, tokens will not survive a restart");
                AuthConfig::random_secret()
            }
        };

        Ok(Self {
            port,
            production,
            allowed_origins,
            admin_password,
            token_secret,
            max_body_bytes,
            trusted_proxy_hops,
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn shield_config(&self) -> ShieldConfig {
        ShieldConfig {
            production: self.production,
            allowed_origins: self.allowed_origins.clone(),
            max_body_bytes: self.max_body_bytes,
            trusted_proxy_hops: self.trusted_proxy_hops,
            ..ShieldConfig::default()
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(self.token_secret, self.admin_password.clone())
    }

    pub fn captcha_config(&self) -> CaptchaConfig {
        CaptchaConfig::default()
    }
}

fn decode_secret(b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = from_base64(b64).context("JWT_SECRET must be base64")?;
    let secret: [u8; 32] = bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("JWT_SECRET must decode to 32 bytes, got {}", b.len()))?;
    Ok(secret)
}
