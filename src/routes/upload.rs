use std::path::Path;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    middleware::AuthUser,
    state::AppState,
    types::UploadResponse,
};

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "image";
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_image))
}

/// Lower-cased extension of `file_name` if it is an accepted image type.
pub fn allowed_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

pub async fn upload_image(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let original = field.file_name().unwrap_or_default().to_string();
        let ext = allowed_extension(&original).ok_or_else(|| {
            AppError::BadRequest(format!("Tipo de archivo no permitido. Usa: {}", ALLOWED_EXTENSIONS.join(", ")))
        })?;
        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("El archivo está vacío".into()));
        }

        let dir = &state.config.uploads_dir;
        tokio::fs::create_dir_all(dir).await?;
        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        tokio::fs::write(dir.join(&filename), &bytes).await?;
        tracing::info!(user_id = %auth.id, %filename, size = bytes.len(), "Archivo subido");

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse { url: format!("/uploads/{}", filename), filename }),
        ));
    }
    Err(AppError::BadRequest(format!("Falta el archivo en el campo '{}'", UPLOAD_FIELD)))
}
