use axum::{
    extract::{
        multipart::MultipartError,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::error::Error;
use std::fmt;

/// Body returned for every unmatched route.
pub const NOT_FOUND_MESSAGE: &str = "Ruta no encontrada";
/// Body returned for every server-side failure. Internal detail never leaves the process.
pub const INTERNAL_ERROR_MESSAGE: &str = "Error interno del servidor";

/// The primary error type for the application.
///
/// Every failure a handler or middleware can raise ends up here, and
/// [`IntoResponse`] is the only place that turns it into a client-visible body.
/// Client errors carry their message through; server errors are logged with
/// full detail and replaced by [`INTERNAL_ERROR_MESSAGE`].
#[derive(Debug)]
pub enum AppError {
    /// Unexpected failures (hashing, token signing, bugs).
    Internal(anyhow::Error),
    /// For client errors due to invalid requests.
    BadRequest(String),
    /// For when a requested resource is not found.
    NotFound(String),
    /// For when a request conflicts with existing rows (duplicate email, favorite).
    Conflict(String),
    /// Missing, expired or invalid credentials.
    Unauthorized(String),
    /// Authenticated but not allowed to touch the resource.
    Forbidden(String),
    /// For when a specific field in a request fails validation.
    ValidationError {
        /// The name of the field that failed validation.
        field: String,
        /// A message describing the validation error.
        message: String,
    },
    /// Request body over the configured limit.
    PayloadTooLarge(String),
    /// The request carried an `Origin` outside the allow-list.
    CorsRejected(String),
    /// For errors related to database operations.
    Database(String),
    /// For errors related to I/O operations.
    IoError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(e) => write!(f, "Internal error: {}", e),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on field '{}': {}", field, message)
            }
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::CorsRejected(origin) => write!(f, "Origin not allowed by CORS: {}", origin),
            AppError::Database(msg) => write!(f, "Database error: {}", msg),
            AppError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Internal(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::CorsRejected(_) | AppError::Database(_) | AppError::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Internal(e) => {
                tracing::error!("Error interno: {:?}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::CorsRejected(origin) => {
                tracing::warn!(%origin, "Acceso no permitido por CORS");
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::Database(msg) => {
                tracing::error!("Error de base de datos: {}", msg);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::IoError(msg) => {
                tracing::error!("Error de E/S: {}", msg);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            AppError::ValidationError { field, message } => format!("{}: {}", field, message),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::PayloadTooLarge(msg) => msg,
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Fallback for every request no route matched.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": NOT_FOUND_MESSAGE }))).into_response()
}

/// Renders a caught panic like any other internal failure.
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Registro no encontrado".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    AppError::Conflict("El registro ya existe".to_string())
                } else if db_err.is_foreign_key_violation() {
                    AppError::BadRequest("Referencia inválida".to_string())
                } else {
                    AppError::Database(db_err.message().to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(format!("{}: {}", err.kind(), err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge("El cuerpo de la solicitud es demasiado grande".into()),
            _ => AppError::BadRequest(format!("JSON inválido: {}", rejection.body_text())),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(format!("Parámetros inválidos: {}", rejection.body_text()))
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err.status() {
            StatusCode::PAYLOAD_TOO_LARGE => AppError::PayloadTooLarge("El archivo es demasiado grande".into()),
            _ => AppError::BadRequest(format!("Formulario inválido: {}", err.body_text())),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(_: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized("Token inválido o expirado".to_string())
    }
}

/// A type alias for `Result<T, AppError>`, used throughout the application.
pub type AppResult<T> = Result<T, AppError>;

/// An extension trait for `Option` that provides a convenient way to convert
/// an `Option` to a `Result` with a `NotFound` error.
pub trait OptionExt<T> {
    /// Converts `None` into `AppError::NotFound("No se encontró <entity>")`.
    fn ok_or_not_found(self, entity: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::NotFound(format!("No se encontró {}", entity)))
    }
}

/// Field validators shared by the route modules.
pub mod validation {
    use super::*;

    pub fn validate_required(value: &str, field: &str) -> AppResult<()> {
        if value.trim().is_empty() {
            return Err(AppError::ValidationError {
                field: field.to_string(),
                message: "es obligatorio".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_email(email: &str) -> AppResult<()> {
        let email = email.trim();
        let valid = match email.split_once('@') {
            Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
            None => false,
        };
        if !valid {
            return Err(AppError::ValidationError {
                field: "email".to_string(),
                message: "no es un correo válido".to_string(),
            });
        }
        Ok(())
    }

    pub fn validate_password(password: &str) -> AppResult<()> {
        if password.chars().count() < 6 {
            return Err(AppError::ValidationError {
                field: "password".to_string(),
                message: "debe tener al menos 6 caracteres".to_string(),
            });
        }
        Ok(())
    }

    /// Prices are whole pesos; zero is allowed (giveaways).
    pub fn validate_price(price: i64) -> AppResult<()> {
        if price < 0 {
            return Err(AppError::ValidationError {
                field: "price".to_string(),
                message: format!("no puede ser negativo, se recibió {}", price),
            });
        }
        Ok(())
    }
}
