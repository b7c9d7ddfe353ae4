use axum::{extract::State, routing::get, Json, Router};
use axum_extra::extract::WithRejection;

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::AuthUser,
    state::AppState,
    types::{ProfileUpdate, PublicUser},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

pub async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<PublicUser>> {
    let user = state.store.find_user(auth.id).await?.ok_or_not_found("el usuario")?;
    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(mut req), _): WithRejection<Json<ProfileUpdate>, AppError>,
) -> AppResult<Json<PublicUser>> {
    if let Some(name) = req.name.as_mut() {
        validation::validate_required(name, "name")?;
        *name = name.trim().to_string();
    }
    let user = state.store.update_profile(auth.id, req).await?.ok_or_not_found("el usuario")?;
    Ok(Json(user.into()))
}
