use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{AppResult, OptionExt},
    routes::parse_uuid,
    state::AppState,
    types::{Post, PostFilter, PublicUser},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/{id}", get(get_user))
        .route("/{id}/posts", get(list_user_posts))
}

pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<PublicUser>>> {
    let users = state.store.list_users().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<PublicUser>> {
    let id = parse_uuid(&id, "id")?;
    let user = state.store.find_user(id).await?.ok_or_not_found("el usuario")?;
    Ok(Json(user.into()))
}

pub async fn list_user_posts(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Vec<Post>>> {
    let id: Uuid = parse_uuid(&id, "id")?;
    state.store.find_user(id).await?.ok_or_not_found("el usuario")?;
    let filter = PostFilter { user_id: Some(id), ..Default::default() };
    Ok(Json(state.store.list_posts(&filter).await?))
}
