use async_trait::async_trait;

use crate::auth::repo_types::User;
use crate::db::PgStore;

/// Persistence for user identities and their credential hashes.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by exact username.
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;

    /// Insert a new user. Returns `None` when the username is already taken.
    async fn create_user(&self, username: &str, password_hash: &str)
        -> anyhow::Result<Option<User>>;
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        // ON CONFLICT keeps the uniqueness check and the insert in one statement.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(self.pool())
        .await?;
        Ok(user)
    }
}
