use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{CreateUserRequest, TokenRequest, TokenResponse, UpdateUserRequest, UserResponse},
    repo::UserChanges,
};
use crate::{
    auth::{
        password::{hash_password, verify_password},
        CurrentUser, JwtKeys,
    },
    error::{ApiError, ApiResult, StoreError},
    state::AppState,
};

const INVALID_CREDENTIALS: &str = "unable to authenticate with provided credentials";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(create_user))
        .route("/users/token", post(create_token))
        .route("/users/me", get(get_me).patch(update_me))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let Json(payload) = payload?;
    let new_user = payload.validate().map_err(|e| {
        warn!("registration rejected by validation");
        e
    })?;

    // Ensure email is not taken
    if state.users.find_by_email(&new_user.email).await?.is_some() {
        warn!(email = %new_user.email, "email already registered");
        return Err(StoreError::Conflict("email").into());
    }

    let hash = hash_password(&new_user.password)?;
    let user = state
        .users
        .create(&new_user.email, &new_user.name, &hash)
        .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn create_token(
    State(state): State<AppState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(payload) = payload?;
    let creds = payload.validate()?;

    let Some(user) = state.users.find_by_email(&creds.email).await? else {
        warn!(email = %creds.email, "token requested for unknown email");
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(&creds.password, &user.password_hash)? {
        warn!(user_id = %user.id, "token requested with invalid password");
        return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
    }

    let token = JwtKeys::from_ref(&state).sign(user.id)?;
    info!(user_id = %user.id, "token issued");
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip(user), fields(user_id = %user.id))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> ApiResult<Json<UserResponse>> {
    Ok(Json(user.into()))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<UserResponse>> {
    let Json(payload) = payload?;
    let update = payload.validate()?;

    let password_hash = match update.password.as_deref() {
        Some(plain) => Some(hash_password(plain)?),
        None => None,
    };
    let changes = UserChanges {
        email: update.email,
        name: update.name,
        password_hash,
    };

    let user_id = user.id;
    let user = state
        .users
        .update(user_id, changes)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("user not found".into()))?;

    info!(%user_id, "profile updated");
    Ok(Json(user.into()))
}
