//! 下载核心的错误类型。
//!
//! - `TransportError`：HTTP 传输层失败（只在 third_party 内部出现，向上之前必须被归类）
//! - `DownloadError`：对 UI 可见的下载失败分类

use thiserror::Error;

use crate::base_system::retry::Retryable;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("client build failed: {0}")]
    Build(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::Build(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid ayah range {start}-{end} (chapter has {ayah_count} ayahs)")]
    InvalidRange {
        start: u32,
        end: u32,
        ayah_count: u32,
    },
    #[error("no per-ayah source mapping for reciter '{reciter}'")]
    NoSourceMapping { reciter: String },
    #[error("per-ayah source '{source_key}' has no audio for {chapter_id:03}{ayah:03}")]
    SourceUnavailable {
        source_key: String,
        chapter_id: u32,
        ayah: u32,
    },
    #[error("ayah {chapter_id}:{ayah} not found on per-ayah host")]
    AyahNotFound { chapter_id: u32, ayah: u32 },
    #[error("Ayah {ayah} fetch failed: {message}")]
    AyahFetchFailed { ayah: u32, message: String },
    #[error("network error: {message}")]
    NetworkError { message: String },
    #[error("range assembler is busy (state: {state})")]
    AssemblerBusy { state: String },
    #[error("unknown chapter id {0}")]
    UnknownChapter(u32),
    #[error("unknown reciter id '{0}'")]
    UnknownReciter(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    pub fn network<S: Into<String>>(message: S) -> Self {
        DownloadError::NetworkError {
            message: message.into(),
        }
    }

    /// 同一次操作内是否值得重试。范围下载整体失败后只能由用户从头重试。
    pub fn is_retryable(&self) -> bool {
        matches!(self, DownloadError::AyahFetchFailed { .. })
    }

    /// 面向用户的提示文案（每一类错误一条）。
    pub fn user_message(&self) -> String {
        match self {
            DownloadError::InvalidRange { .. } => "يرجى اختيار نطاق آيات صحيح".to_string(),
            DownloadError::NoSourceMapping { .. } => {
                "عذراً، لا يمكن تحديد مصدر ملفات الآيات لهذا القارئ.".to_string()
            }
            DownloadError::SourceUnavailable { .. } => {
                "عذراً، خدمة تقسيم الآيات غير متوفرة لهذا القارئ حالياً (الملفات المصدرية غير موجودة)."
                    .to_string()
            }
            DownloadError::AyahNotFound { .. } => {
                "حدث خطأ أثناء تحميل بعض الآيات. المصدر غير مكتمل.".to_string()
            }
            DownloadError::AyahFetchFailed { .. } => {
                "فشل الاتصال بالخادم. يرجى التحقق من اتصال الإنترنت.".to_string()
            }
            DownloadError::NetworkError { .. } => "فشل التحميل، يرجى المحاولة لاحقاً".to_string(),
            other => format!("خطأ: {other}"),
        }
    }

    /// 稳定的错误类别名，供 Web API 与日志使用。
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::InvalidRange { .. } => "invalid_range",
            DownloadError::NoSourceMapping { .. } => "no_source_mapping",
            DownloadError::SourceUnavailable { .. } => "source_unavailable",
            DownloadError::AyahNotFound { .. } => "ayah_not_found",
            DownloadError::AyahFetchFailed { .. } => "ayah_fetch_failed",
            DownloadError::NetworkError { .. } => "network_error",
            DownloadError::AssemblerBusy { .. } => "assembler_busy",
            DownloadError::UnknownChapter(_) => "unknown_chapter",
            DownloadError::UnknownReciter(_) => "unknown_reciter",
            DownloadError::Io(_) => "io",
        }
    }
}

impl Retryable for DownloadError {
    fn is_retryable(&self) -> bool {
        DownloadError::is_retryable(self)
    }
}
