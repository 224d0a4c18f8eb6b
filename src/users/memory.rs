use axum::async_trait;
use tokio::sync::Mutex;

use super::repo::UserStore;
use super::repo_types::{NewUser, User, UserChanges};

/// In-process store with the same statement semantics as `PgUserStore`.
#[derive(Default)]
pub struct InMemoryUserStore {
    rows: Mutex<Vec<User>>,
    next_id: Mutex<i32>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> anyhow::Result<User> {
        let mut next_id = self.next_id.lock().await;
        *next_id += 1;
        let row = User {
            id: *next_id,
            username: Some(user.username),
            password: user.password_hash,
            email: Some(user.email),
        };
        self.rows.lock().await.push(row.clone());
        Ok(row)
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.rows.lock().await.clone())
    }

    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.rows.lock().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().await;
        let Some(row) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        row.username = changes.username;
        row.email = changes.email;
        if let Some(hash) = changes.password_hash {
            row.password = hash;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>> {
        let mut rows = self.rows.lock().await;
        let pos = rows.iter().position(|u| u.id == id);
        Ok(pos.map(|i| rows.remove(i)))
    }

    async fn close(&self) {}
}

/// Store whose every call fails, for exercising the 500 path.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn insert(&self, _user: NewUser) -> anyhow::Result<User> {
        anyhow::bail!("connection refused")
    }
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        anyhow::bail!("connection refused")
    }
    async fn find_by_id(&self, _id: i32) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }
    async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }
    async fn update(&self, _id: i32, _changes: UserChanges) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }
    async fn delete(&self, _id: i32) -> anyhow::Result<Option<User>> {
        anyhow::bail!("connection refused")
    }
    async fn close(&self) {}
}
