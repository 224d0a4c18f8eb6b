use std::{fmt::Display, str::FromStr};

use anyhow::Context;
use axum::http::HeaderValue;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Argon2 cost parameters. `cost` is the iteration count.
#[derive(Debug, Clone)]
pub struct PasswordConfig {
    pub cost: u32,
    pub memory_kib: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub db: DbConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub cors_origin: Option<HeaderValue>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let db = DbConfig {
            url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 5)?,
        };

        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let password = PasswordConfig {
            cost: env_or("PASSWORD_HASH_COST", 2)?,
            memory_kib: env_or("PASSWORD_HASH_MEMORY_KIB", 19 * 1024)?,
        };

        let cors_origin = match std::env::var("CORS_ORIGIN") {
            Ok(origin) => Some(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("invalid CORS_ORIGIN {origin:?}"))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_first(&["APP_PORT", "PORT"], 3000)?,
            db,
            jwt: JwtConfig { secret },
            password,
            cors_origin,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid {key}={raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

/// First of `keys` that is set wins.
fn env_first<T>(keys: &[&str], default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match keys.iter().find(|k| std::env::var(k).is_ok()) {
        Some(key) => env_or(key, default),
        None => Ok(default),
    }
}
