use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::dto::{LoginRequest, TokenResponse},
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .store
        .find_by_username(&payload.username)
        .await
        .map_err(ApiError::internal("error during login"))?;

    // Unknown user and wrong password answer identically.
    let Some(user) = user else {
        warn!(username = %payload.username, "login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = state
        .hasher
        .spawn_verify(payload.password, user.password.clone())
        .await
        .map_err(ApiError::internal("error during login"))?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .keys
        .sign(user.id)
        .map_err(ApiError::internal("error during login"))?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
