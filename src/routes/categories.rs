use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::{
    error::{AppError, AppResult, OptionExt},
    state::AppState,
    types::{Category, Post, PostFilter},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_categories)).route("/{id}/posts", get(list_category_posts))
}

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.store.list_categories().await?))
}

pub async fn list_category_posts(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Vec<Post>>> {
    let id: i32 = id.parse().map_err(|_| AppError::BadRequest(format!("Categoría inválida: {}", id)))?;
    state.store.find_category(id).await?.ok_or_not_found("la categoría")?;
    let filter = PostFilter { category_id: Some(id), ..Default::default() };
    Ok(Json(state.store.list_posts(&filter).await?))
}
