use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use axum_extra::extract::{CookieJar, WithRejection};

use crate::{
    error::{validation, AppError, AppResult, OptionExt},
    middleware::auth::{clear_auth_cookie, hash_password, issue_token, set_auth_cookie, verify_password, AuthUser},
    state::AppState,
    types::{AuthResponse, LoginRequest, MessageResponse, NewUser, PublicUser, RegisterRequest},
};

const BAD_CREDENTIALS: &str = "Credenciales inválidas";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthResponse>)> {
    validation::validate_required(&req.name, "name")?;
    validation::validate_email(&req.email)?;
    validation::validate_password(&req.password)?;

    let email = req.email.trim().to_lowercase();
    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("El correo ya está registrado".into()));
    }

    let password_hash = hash_password(req.password).await?;
    let user = state
        .store
        .create_user(NewUser { name: req.name.trim().to_string(), email, password_hash })
        .await?;
    tracing::info!(user_id = %user.id, "Usuario registrado");

    let token = issue_token(&state.config, user.id)?;
    let jar = set_auth_cookie(jar, &state.config, &token);
    Ok((StatusCode::CREATED, jar, Json(AuthResponse { token, user: user.into() })))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let email = req.email.trim().to_lowercase();
    // Same answer for unknown email and wrong password.
    let user = match state.store.find_user_by_email(&email).await? {
        Some(u) => u,
        None => return Err(AppError::Unauthorized(BAD_CREDENTIALS.into())),
    };
    if !verify_password(req.password, user.password_hash.clone()).await? {
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let token = issue_token(&state.config, user.id)?;
    let jar = set_auth_cookie(jar, &state.config, &token);
    Ok((jar, Json(AuthResponse { token, user: user.into() })))
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (clear_auth_cookie(jar, &state.config), Json(MessageResponse::new("Sesión cerrada")))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<PublicUser>> {
    let user = state.store.find_user(auth.id).await?.ok_or_not_found("el usuario")?;
    Ok(Json(user.into()))
}
