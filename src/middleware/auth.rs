use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Name of the HTTP-only cookie carrying the session token.
pub const AUTH_COOKIE: &str = "token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(cfg: &AppConfig, user_id: Uuid) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(cfg.auth.token_ttl_hours)).timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(cfg.auth.jwt_secret.as_bytes()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {}", e)))
}

pub fn verify_token(cfg: &AppConfig, token: &str) -> AppResult<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(cfg.auth.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

// bcrypt is CPU-bound; keep it off the request workers.
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(e.into()))
}

pub async fn verify_password(password: String, hash: String) -> AppResult<bool> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    // A malformed stored hash counts as a mismatch.
    Ok(verified.unwrap_or(false))
}

/// Session cookie attributes. Cross-site in production (Netlify frontend), so
/// `SameSite=None; Secure` there and `Lax` for local development.
fn session_cookie(cfg: &AppConfig, value: String, max_age: time::Duration) -> Cookie<'static> {
    let production = cfg.is_production();
    Cookie::build((AUTH_COOKIE, value))
        .path("/")
        .http_only(true)
        .max_age(max_age)
        .same_site(if production { SameSite::None } else { SameSite::Lax })
        .secure(production)
        .build()
}

pub fn set_auth_cookie(jar: CookieJar, cfg: &AppConfig, token: &str) -> CookieJar {
    jar.add(session_cookie(cfg, token.to_string(), time::Duration::hours(cfg.auth.token_ttl_hours)))
}

/// Always emits an expired, empty cookie with the same attributes as the one
/// set at login, whether or not the request carried it.
pub fn clear_auth_cookie(jar: CookieJar, cfg: &AppConfig) -> CookieJar {
    jar.add(session_cookie(cfg, String::new(), time::Duration::ZERO))
}

/// Authenticated caller, from `Authorization: Bearer` or the session cookie.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let bearer = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());
        let token = match bearer {
            Some(t) if !t.is_empty() => t,
            _ => CookieJar::from_headers(&parts.headers)
                .get(AUTH_COOKIE)
                .map(|c| c.value().to_string())
                .filter(|t| !t.is_empty())
                .ok_or_else(|| AppError::Unauthorized("Token no proporcionado".to_string()))?,
        };

        let claims = verify_token(&state.config, &token)?;
        Ok(AuthUser { id: claims.sub })
    }
}
