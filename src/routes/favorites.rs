use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{AppError, AppResult, OptionExt},
    middleware::AuthUser,
    routes::parse_uuid,
    state::AppState,
    types::{MessageResponse, Post},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/{post_id}", post(add_favorite).delete(remove_favorite))
}

pub async fn list_favorites(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.store.list_favorites(auth.id).await?))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let post_id = parse_uuid(&post_id, "post_id")?;
    state.store.find_post(post_id).await?.ok_or_not_found("la publicación")?;

    if !state.store.add_favorite(auth.id, post_id).await? {
        return Err(AppError::Conflict("La publicación ya está en favoritos".into()));
    }
    Ok((StatusCode::CREATED, Json(MessageResponse::new("Agregado a favoritos"))))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(post_id): Path<String>,
) -> AppResult<StatusCode> {
    let post_id = parse_uuid(&post_id, "post_id")?;
    if !state.store.remove_favorite(auth.id, post_id).await? {
        return Err(AppError::NotFound("La publicación no está en favoritos".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
