//! Process configuration, read from the environment at start-up.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use axum::http::HeaderName;

use staffdesk_infra::AuditPolicy;

const DEV_SECRET: &str = "staffdesk-dev-secret";

/// Token settings for the admin API.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub admin_secret_key: String,
    /// Token lifetime.
    pub admin_ttl: Duration,
    /// Request header the token is read from.
    pub admin_token_name: HeaderName,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt: JwtConfig,
    pub audit_policy: AuditPolicy,
}

impl AppConfig {
    /// Defaults suitable for tests: the given secret, 2h ttl, `token` header.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt: JwtConfig {
                admin_secret_key: secret.into(),
                admin_ttl: Duration::from_millis(7_200_000),
                admin_token_name: HeaderName::from_static("token"),
            },
            audit_policy: AuditPolicy::Lenient,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = match lookup("STAFFDESK_BIND") {
            Some(raw) => raw
                .parse::<SocketAddr>()
                .with_context(|| format!("STAFFDESK_BIND is not a socket address: {raw}"))?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let admin_secret_key = match lookup("STAFFDESK_ADMIN_SECRET_KEY") {
            Some(secret) if !secret.is_empty() => secret,
            Some(_) => bail!("STAFFDESK_ADMIN_SECRET_KEY must not be empty"),
            None => {
                tracing::warn!("STAFFDESK_ADMIN_SECRET_KEY not set; using insecure dev default");
                DEV_SECRET.to_string()
            }
        };

        let admin_ttl = match lookup("STAFFDESK_ADMIN_TTL_MS") {
            Some(raw) => {
                let ms = raw
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("STAFFDESK_ADMIN_TTL_MS is not a number: {raw}"))?;
                if ms == 0 {
                    bail!("STAFFDESK_ADMIN_TTL_MS must be greater than zero");
                }
                Duration::from_millis(ms)
            }
            None => Duration::from_millis(7_200_000),
        };

        let admin_token_name = match lookup("STAFFDESK_ADMIN_TOKEN_NAME") {
            Some(raw) => HeaderName::try_from(raw.trim().to_ascii_lowercase())
                .with_context(|| format!("STAFFDESK_ADMIN_TOKEN_NAME is not a header name: {raw}"))?,
            None => HeaderName::from_static("token"),
        };

        let audit_policy = match lookup("STAFFDESK_AUDIT_STRICT") {
            Some(raw) => {
                let strict = raw
                    .trim()
                    .parse::<bool>()
                    .with_context(|| format!("STAFFDESK_AUDIT_STRICT is not a bool: {raw}"))?;
                if strict {
                    AuditPolicy::Strict
                } else {
                    AuditPolicy::Lenient
                }
            }
            None => AuditPolicy::Lenient,
        };

        Ok(Self {
            bind_addr,
            jwt: JwtConfig {
                admin_secret_key,
                admin_ttl,
                admin_token_name,
            },
            audit_policy,
        })
    }
}
