use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use tracing::{debug, info, instrument};

use super::{
    dto::{CreateUserRequest, DeletedUser, UpdateUserRequest},
    repo_types::{NewUser, User, UserChanges},
};
use crate::{
    auth::middleware::{require_auth, AuthUser},
    error::ApiError,
    state::AppState,
};

pub fn user_routes(state: &AppState) -> Router<AppState> {
    let gate = middleware::from_fn_with_state(state.clone(), require_auth);
    Router::new()
        // route_layer only wraps methods registered before it: POST stays open.
        .route(
            "/usuarios",
            get(list_users).route_layer(gate.clone()).post(create_user),
        )
        .route(
            "/usuarios/:id",
            get(get_user)
                .put(update_user)
                .delete(delete_user)
                .route_layer(gate),
        )
}

/// Self-registration. Responds with the inserted row, hash included.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let password_hash = state
        .hasher
        .spawn_hash(payload.password)
        .await
        .map_err(ApiError::internal("error creating user"))?;

    let user = state
        .store
        .insert(NewUser {
            username: payload.username,
            password_hash,
            email: payload.email,
        })
        .await
        .map_err(ApiError::internal("error creating user"))?;

    info!(user_id = user.id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, caller))]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<User>>, ApiError> {
    debug!(caller = caller.id, "listing users");
    let users = state
        .store
        .list()
        .await
        .map_err(ApiError::internal("error listing users"))?;
    Ok(Json(users))
}

#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<User>, ApiError> {
    debug!(caller = caller.id, "fetching user");
    state
        .store
        .find_by_id(id)
        .await
        .map_err(ApiError::internal("error fetching user"))?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let password_hash = match payload.password.filter(|p| !p.is_empty()) {
        Some(plain) => Some(
            state
                .hasher
                .spawn_hash(plain)
                .await
                .map_err(ApiError::internal("error updating user"))?,
        ),
        None => None,
    };

    let changes = UserChanges {
        username: payload.username,
        email: payload.email,
        password_hash,
    };
    let password_changed = changes.password_hash.is_some();

    let user = state
        .store
        .update(id, changes)
        .await
        .map_err(ApiError::internal("error updating user"))?
        .ok_or(ApiError::NotFound)?;

    info!(caller = caller.id, user_id = user.id, password_changed, "user updated");
    Ok(Json(user))
}

#[instrument(skip(state, caller))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<Json<DeletedUser>, ApiError> {
    let user = state
        .store
        .delete(id)
        .await
        .map_err(ApiError::internal("error deleting user"))?
        .ok_or(ApiError::NotFound)?;

    info!(caller = caller.id, user_id = user.id, "user deleted");
    Ok(Json(DeletedUser { eliminado: user }))
}
