use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

/// Signing and verification keys plus token lifetime.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub algorithm: Algorithm,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64).saturating_mul(60)),
        }
    }

    /// Sign a token for `username` expiring `ttl` from now.
    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        self.issue_at(username, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(&self, username: &str, now: OffsetDateTime) -> anyhow::Result<String> {
        let ttl = TimeDuration::seconds(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX));
        let exp = now
            .checked_add(ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            jti: Uuid::new_v4(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(username, jti = %claims.jti, "jwt signed");
        Ok(token)
    }

    /// Check signature, algorithm and expiry. Does not look the subject up.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(username = %data.claims.sub, jti = %data.claims.jti, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, algorithm: Algorithm) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            algorithm,
            ttl_minutes: 30,
        })
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", Algorithm::HS256);
        let token = keys.issue("alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret", Algorithm::HS256);
        let issued = OffsetDateTime::now_utc() - TimeDuration::minutes(31);
        let token = keys.issue_at("alice", issued).expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn token_still_valid_just_before_expiry() {
        let keys = make_keys("dev-secret", Algorithm::HS256);
        let issued = OffsetDateTime::now_utc() - TimeDuration::minutes(29);
        let token = keys.issue_at("alice", issued).expect("sign");
        assert_eq!(keys.verify(&token).expect("verify").sub, "alice");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = make_keys("secret-a", Algorithm::HS256).issue("alice").unwrap();
        assert!(make_keys("secret-b", Algorithm::HS256).verify(&token).is_err());
    }

    #[test]
    fn algorithm_mismatch_is_rejected() {
        let token = make_keys("same", Algorithm::HS512).issue("alice").unwrap();
        assert!(make_keys("same", Algorithm::HS256).verify(&token).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let keys = make_keys("dev-secret", Algorithm::HS256);
        let token = keys.issue("alice").unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let other = keys.issue("mallory").unwrap();
        parts[1] = other.split('.').nth(1).unwrap().to_string();
        assert!(keys.verify(&parts.join(".")).is_err());
    }

    #[test]
    fn huge_lifetime_does_not_overflow() {
        let keys = JwtKeys::from_config(&JwtConfig {
            secret: "dev-secret".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: i64::MAX,
        });
        assert_eq!(keys.ttl, Duration::from_secs(u64::MAX));
        assert!(keys.issue("alice").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let keys = make_keys("dev-secret", Algorithm::HS256);
        assert!(keys.verify("not.a.token").is_err());
        assert!(keys.verify("").is_err());
    }
}
