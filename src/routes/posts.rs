use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::AuthUser,
    routes::parse_uuid,
    state::AppState,
    types::{NewPost, Post, PostFilter, PostUpdate},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
}

pub async fn list_posts(
    State(state): State<AppState>,
    WithRejection(Query(filter), _): WithRejection<Query<PostFilter>, AppError>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.store.list_posts(&filter).await?))
}

pub async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Post>> {
    let id = parse_uuid(&id, "id")?;
    let post = state.store.find_post(id).await?.ok_or_not_found("la publicación")?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(req), _): WithRejection<Json<NewPost>, AppError>,
) -> AppResult<(StatusCode, Json<Post>)> {
    validation::validate_required(&req.title, "title")?;
    validation::validate_price(req.price)?;
    if let Some(category_id) = req.category_id {
        ensure_category(&state, category_id).await?;
    }

    let post = state.store.create_post(auth.id, req).await?;
    tracing::info!(post_id = %post.id, user_id = %auth.id, "Publicación creada");
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    WithRejection(Json(req), _): WithRejection<Json<PostUpdate>, AppError>,
) -> AppResult<Json<Post>> {
    let id = parse_uuid(&id, "id")?;
    // 403 for non-owners takes precedence over payload errors.
    owned_post(&state, id, auth).await?;
    if let Some(title) = &req.title {
        validation::validate_required(title, "title")?;
    }
    if let Some(price) = req.price {
        validation::validate_price(price)?;
    }
    if let Some(category_id) = req.category_id {
        ensure_category(&state, category_id).await?;
    }

    let post = state.store.update_post(id, req).await?.ok_or_not_found("la publicación")?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_uuid(&id, "id")?;
    owned_post(&state, id, auth).await?;

    if !state.store.delete_post(id).await? {
        return Err(AppError::NotFound("No se encontró la publicación".into()));
    }
    tracing::info!(post_id = %id, user_id = %auth.id, "Publicación eliminada");
    Ok(StatusCode::NO_CONTENT)
}

/// Loads the post and checks the caller owns it.
async fn owned_post(state: &AppState, id: Uuid, auth: AuthUser) -> AppResult<Post> {
    let post = state.store.find_post(id).await?.ok_or_not_found("la publicación")?;
    if post.user_id != auth.id {
        return Err(AppError::Forbidden("No tienes permiso para modificar esta publicación".into()));
    }
    Ok(post)
}

async fn ensure_category(state: &AppState, category_id: i32) -> AppResult<()> {
    if state.store.find_category(category_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("La categoría {} no existe", category_id)));
    }
    Ok(())
}
