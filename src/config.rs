use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Upper bound on `ACCESS_TOKEN_EXPIRE_MINUTES` (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProviderKind {
    Local,
    OpenAi,
}

impl FromStr for EmbeddingProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "openai" => Ok(Self::OpenAi),
            other => anyhow::bail!("unknown embedding provider: {other}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StylistConfig {
    pub api_key: String,
    pub api_base: String,
    pub chat_model: String,
    pub embedding_provider: EmbeddingProviderKind,
    pub embedding_model: String,
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub stylist: StylistConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let algorithm_name = lookup("ALGORITHM").unwrap_or_else(|| "HS256".into());
        let algorithm = Algorithm::from_str(algorithm_name.trim())
            .with_context(|| format!("unsupported ALGORITHM {algorithm_name}"))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            anyhow::bail!("ALGORITHM must be an HMAC algorithm, got {algorithm_name}");
        }

        let ttl_minutes: i64 = parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?;
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&ttl_minutes) {
            anyhow::bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {MAX_TOKEN_TTL_MINUTES}, got {ttl_minutes}"
            );
        }

        let top_n: usize = parse_or(&lookup, "STYLIST_TOP_N", 7)?;
        if top_n == 0 {
            anyhow::bail!("STYLIST_TOP_N must be at least 1");
        }

        let jwt = JwtConfig {
            secret: required("SECRET_KEY")?,
            algorithm,
            ttl_minutes,
        };

        let stylist = StylistConfig {
            api_key: required("OPENAI_API_KEY")?,
            api_base: lookup("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.into()),
            chat_model: lookup("STYLIST_CHAT_MODEL").unwrap_or_else(|| "gpt-4-turbo".into()),
            embedding_provider: lookup("EMBEDDING_PROVIDER")
                .map(|v| v.parse::<EmbeddingProviderKind>())
                .transpose()?
                .unwrap_or(EmbeddingProviderKind::Local),
            embedding_model: lookup("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-3-small".into()),
            top_n,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt,
            stylist,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
