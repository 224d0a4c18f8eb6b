use serde::{Deserialize, Serialize};

use super::repo_types::User;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Omitted `username`/`email` are written as NULL; an omitted or empty
/// `password` keeps the stored hash.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedUser {
    pub eliminado: User,
}
