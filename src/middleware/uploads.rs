//! Static serving of user uploads under `/uploads`.

use std::path::{Path, PathBuf};

use axum::{
    extract::Request,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use tower_http::services::ServeDir;

use crate::error;

/// One day.
pub const UPLOAD_CACHE_CONTROL: &str = "public, max-age=86400";

/// Suffix → forced `Content-Type`.
///
/// NOTE: `.png` is mapped to `image/jpeg` as well. That is how the frontend has
/// always been served; correcting it needs sign-off from product first.
pub const CONTENT_TYPE_OVERRIDES: &[(&str, &str)] = &[(".jpg", "image/jpeg"), (".png", "image/jpeg")];

pub fn content_type_override(path: &str) -> Option<&'static str> {
    CONTENT_TYPE_OVERRIDES.iter().find(|(suffix, _)| path.ends_with(suffix)).map(|(_, mime)| *mime)
}

/// Creates the uploads directory (with parents) if it is missing.
pub fn ensure_uploads_dir(dir: &Path) -> std::io::Result<PathBuf> {
    if !dir.is_dir() {
        std::fs::create_dir_all(dir)?;
        let shown = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        tracing::info!("Directorio 'uploads' creado en: {}", shown.display());
    }
    Ok(dir.to_path_buf())
}

/// Applies the cache lifetime and content-type override to served files and
/// turns misses into the standard JSON 404. Methods other than GET/HEAD are
/// misses too, like on any other path without a matching route.
pub async fn upload_headers(req: Request, next: Next) -> Response {
    let forced = content_type_override(req.uri().path());
    let mut res = next.run(req).await;

    if matches!(res.status(), StatusCode::NOT_FOUND | StatusCode::METHOD_NOT_ALLOWED) {
        return error::not_found().await;
    }
    if res.status().is_success() || res.status() == StatusCode::NOT_MODIFIED {
        let headers = res.headers_mut();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(UPLOAD_CACHE_CONTROL));
        if let Some(mime) = forced {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime));
        }
    }
    res
}

/// File service for the uploads directory; mounted behind [`upload_headers`].
pub fn serve_uploads(dir: &Path) -> ServeDir {
    ServeDir::new(dir).append_index_html_on_directories(false)
}
