use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the `users` table. `password` always holds a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: Option<String>,
    pub password: String,
    pub email: Option<String>,
}

/// Values for a new row; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
}

/// Column values written by an update. `username` and `email` are always
/// written (`None` becomes NULL); the password only when a new hash is given.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}
