use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{ItemRequest, ItemResponse},
    repo::RecipeStore,
};
use crate::{auth::CurrentUser, error::ApiResult, state::AppState};

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipe/tags", get(list_tags).post(create_tag))
        .route(
            "/recipe/ingredients",
            get(list_ingredients).post(create_ingredient),
        )
}

async fn list_items(store: &dyn RecipeStore, user_id: Uuid) -> ApiResult<Json<Vec<ItemResponse>>> {
    let rows = store.list_for_user(user_id).await?;
    Ok(Json(rows.into_iter().map(ItemResponse::from).collect()))
}

async fn create_item(
    store: &dyn RecipeStore,
    user_id: Uuid,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let Json(payload) = payload?;
    let name = payload.validate()?;
    let row = store.create(user_id, &name).await?;
    info!(kind = %store.kind(), id = row.id, %user_id, "recipe item created");
    Ok((StatusCode::CREATED, Json(row.into())))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ItemResponse>>> {
    list_items(state.tags.as_ref(), user.id).await
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    create_item(state.tags.as_ref(), user.id, payload).await
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<ItemResponse>>> {
    list_items(state.ingredients.as_ref(), user.id).await
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<ItemRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    create_item(state.ingredients.as_ref(), user.id, payload).await
}
