use std::time::Duration;

use anyhow::Context;
use axum::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use tracing::info;

use super::repo_types::{NewUser, User, UserChanges};
use crate::config::DbConfig;

/// Persistence port for the `users` table. Every method is a single statement.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> anyhow::Result<User>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Returns `None` when no row has `id`.
    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>>;
    /// Returns the deleted row, or `None` when no row has `id`.
    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn close(&self);
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .context("connect to database")?;
        info!(max_connections = config.max_connections, "database pool ready");
        Ok(Self { pool })
    }
}

const COLUMNS: &str = "id, username, password, email";

/// Builds the UPDATE for `changes`. The password column only appears in
/// `SET` when a new hash is present; every value is a bind parameter.
pub(crate) fn update_query(id: i32, changes: UserChanges) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        set.push("username = ").push_bind_unseparated(changes.username);
        if let Some(hash) = changes.password_hash {
            set.push("password = ").push_bind_unseparated(hash);
        }
        set.push("email = ").push_bind_unseparated(changes.email);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING ").push(COLUMNS);
    qb
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, email)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, email
            "#,
        )
        .bind(user.username)
        .bind(user.password_hash)
        .bind(user.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT id, username, password, email FROM users")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, username, password, email FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, email
            FROM users
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let mut qb = update_query(id, changes);
        let row = qb
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "DELETE FROM users WHERE id = $1 RETURNING id, username, password, email",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_without_password_leaves_column_out() {
        let qb = update_query(
            7,
            UserChanges {
                username: Some("bob".into()),
                email: Some("b@x.com".into()),
                password_hash: None,
            },
        );
        assert_eq!(
            qb.sql(),
            "UPDATE users SET username = $1, email = $2 WHERE id = $3 \
             RETURNING id, username, password, email"
        );
    }

    #[test]
    fn update_with_password_binds_hash() {
        let qb = update_query(
            7,
            UserChanges {
                username: Some("bob".into()),
                email: None,
                password_hash: Some("$argon2id$...".into()),
            },
        );
        assert_eq!(
            qb.sql(),
            "UPDATE users SET username = $1, password = $2, email = $3 WHERE id = $4 \
             RETURNING id, username, password, email"
        );
    }

    #[test]
    fn update_never_inlines_values() {
        let qb = update_query(
            1,
            UserChanges {
                username: Some("x'; DROP TABLE users; --".into()),
                email: Some("e@x.com".into()),
                password_hash: Some("hash".into()),
            },
        );
        assert!(!qb.sql().contains("DROP"));
        assert!(!qb.sql().contains("e@x.com"));
    }
}
