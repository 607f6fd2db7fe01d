use tracing::{info, warn};

use super::{jwt::JwtKeys, password, repo::CredentialStore, repo_types::User};
use crate::error::{AppError, AppResult};

const INVALID_CREDENTIALS: &str = "Incorrect username or password";
const INVALID_TOKEN: &str = "Could not validate credentials";

/// Create an account. A taken username is a `Conflict`.
pub async fn register(
    store: &dyn CredentialStore,
    username: &str,
    plain_password: &str,
) -> AppResult<User> {
    let hash = password::hash_password(plain_password)?;
    match store.create_user(username, &hash).await? {
        Some(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        None => {
            warn!(username, "username already registered");
            Err(AppError::Conflict("Username already registered".into()))
        }
    }
}

/// Check a username/password pair. Unknown user and bad password look the same
/// to the caller.
pub async fn authenticate(
    store: &dyn CredentialStore,
    username: &str,
    plain_password: &str,
) -> AppResult<User> {
    let Some(user) = store.find_by_username(username).await? else {
        warn!(username, "login unknown username");
        return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.into()));
    };

    if !password::verify_password(plain_password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::Unauthenticated(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = user.id, "user authenticated");
    Ok(user)
}

pub fn issue_token(keys: &JwtKeys, username: &str) -> AppResult<String> {
    Ok(keys.issue(username)?)
}

/// Resolve a bearer token to a live user.
pub async fn verify_token(
    store: &dyn CredentialStore,
    keys: &JwtKeys,
    token: &str,
) -> AppResult<User> {
    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::Unauthenticated(INVALID_TOKEN.into())
    })?;

    match store.find_by_username(&claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            warn!(username = %claims.sub, "token subject no longer exists");
            Err(AppError::Unauthenticated(INVALID_TOKEN.into()))
        }
    }
}
