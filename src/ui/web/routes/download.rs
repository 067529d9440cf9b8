use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::extract::{Path as AxumPath, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use tokio_util::io::ReaderStream;

use crate::download::models::AUDIO_MIME;
use crate::ui::web::state::AppState;

/// 浏览器下载用的 Content-Disposition，UTF-8 文件名走 RFC 5987 的 `filename*`。
fn make_content_disposition(filename: &str) -> Option<header::HeaderValue> {
    fn is_unreserved(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_')
    }

    let encoded: String = filename
        .bytes()
        .map(|b| {
            if is_unreserved(b) {
                char::from(b).to_string()
            } else {
                format!("%{b:02X}")
            }
        })
        .collect();

    let ascii_fallback: String = filename
        .chars()
        .map(|c| if c.is_ascii() && is_unreserved(c as u8) { c } else { '_' })
        .collect();

    header::HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii_fallback}\"; filename*=UTF-8''{encoded}"
    ))
    .ok()
}

/// 只提供保存目录里的 mp3。
pub(crate) async fn download_file(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
) -> Result<Response, StatusCode> {
    let target = resolve_target(state.library_root.as_ref(), &path)?;

    let meta = tokio::fs::metadata(&target)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    if !meta.is_file() {
        return Err(StatusCode::NOT_FOUND);
    }
    if !is_audio(&target) {
        return Err(StatusCode::FORBIDDEN);
    }

    let file = tokio::fs::File::open(&target)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let mut resp = Response::new(Body::from_stream(ReaderStream::new(file)));
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static(AUDIO_MIME),
    );
    resp.headers_mut()
        .insert(header::CONTENT_LENGTH, header::HeaderValue::from(meta.len()));
    if let Some(name) = target.file_name().and_then(|s| s.to_str())
        && let Some(hv) = make_content_disposition(name)
    {
        resp.headers_mut().insert(header::CONTENT_DISPOSITION, hv);
    }
    Ok(resp)
}

fn is_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
}

fn resolve_target(base: &Path, path: &str) -> Result<PathBuf, StatusCode> {
    if path.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }
    let base_canon = std::fs::canonicalize(base).unwrap_or_else(|_| base.to_path_buf());
    let target = std::fs::canonicalize(base.join(path)).map_err(|_| StatusCode::NOT_FOUND)?;
    if !target.starts_with(&base_canon) {
        return Err(StatusCode::FORBIDDEN);
    }
    Ok(target)
}
