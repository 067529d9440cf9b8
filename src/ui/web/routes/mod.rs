pub(crate) mod catalog;
pub(crate) mod download;
pub(crate) mod index;
pub(crate) mod jobs;
pub(crate) mod logs;
pub(crate) mod status;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::DownloadError;

/// JSON 错误体：`{"error": 类别, "message": 提示}`。
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub(crate) fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        let status = match &err {
            DownloadError::UnknownChapter(_) | DownloadError::UnknownReciter(_) => {
                StatusCode::NOT_FOUND
            }
            DownloadError::InvalidRange { .. } | DownloadError::NoSourceMapping { .. } => {
                StatusCode::BAD_REQUEST
            }
            DownloadError::AssemblerBusy { .. } => StatusCode::CONFLICT,
            DownloadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.kind(), err.user_message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({"error": self.kind, "message": self.message})),
        )
            .into_response()
    }
}
