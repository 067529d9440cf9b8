//! 逐节音频源：存在性探测与带重试的下载。
//!
//! 地址格式 `{base}/{source_key}/{CCC}{AAA}.mp3`，章号与节号均补零到 3 位。

use std::sync::Arc;

use tracing::{debug, warn};

use super::http::{AudioTransport, is_success};
use crate::base_system::retry::{RetryPolicy, Retryable};
use crate::error::{DownloadError, TransportError};

pub fn ayah_url(base: &str, source_key: &str, chapter_id: u32, ayah: u32) -> String {
    format!(
        "{}/{}/{:03}{:03}.mp3",
        base.trim_end_matches('/'),
        source_key,
        chapter_id,
        ayah
    )
}

/// 探测单个失败的原因；只有传输层错误值得再探一次。
#[derive(Debug)]
enum ProbeMiss {
    Absent(u16),
    Transport(TransportError),
}

impl std::fmt::Display for ProbeMiss {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeMiss::Absent(status) => write!(f, "HTTP {status}"),
            ProbeMiss::Transport(err) => write!(f, "{err}"),
        }
    }
}

impl Retryable for ProbeMiss {
    fn is_retryable(&self) -> bool {
        matches!(self, ProbeMiss::Transport(_))
    }
}

pub struct AyahProbe {
    transport: Arc<dyn AudioTransport>,
    base_url: String,
    policy: RetryPolicy,
}

impl AyahProbe {
    pub fn new(transport: Arc<dyn AudioTransport>, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            policy,
        }
    }

    /// 该节音频是否存在。任何失败都视为不存在，不会返回错误。
    pub fn exists(&self, source_key: &str, chapter_id: u32, ayah: u32) -> bool {
        let url = ayah_url(&self.base_url, source_key, chapter_id, ayah);
        let res = self.policy.run(&format!("probe {url}"), |_| self.probe_once(&url));
        match res {
            Ok(()) => true,
            Err(miss) => {
                debug!(target: "probe", "{url} 不可用: {miss}");
                false
            }
        }
    }

    fn probe_once(&self, url: &str) -> Result<(), ProbeMiss> {
        match self.transport.head_status(url) {
            Ok(status) if is_success(status) => return Ok(()),
            // 部分主机不支持 HEAD
            Ok(405) | Ok(501) => {}
            Ok(status) => return Err(ProbeMiss::Absent(status)),
            Err(err) => debug!(target: "probe", "HEAD {url} 失败，改用 GET: {err}"),
        }
        match self.transport.get_status(url) {
            Ok(status) if is_success(status) => Ok(()),
            Ok(status) => Err(ProbeMiss::Absent(status)),
            Err(err) => Err(ProbeMiss::Transport(err)),
        }
    }
}

pub struct AyahFetcher {
    transport: Arc<dyn AudioTransport>,
    base_url: String,
    policy: RetryPolicy,
}

impl AyahFetcher {
    pub fn new(transport: Arc<dyn AudioTransport>, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            policy,
        }
    }

    /// 下载一节音频。404 立即返回 `AyahNotFound`；其它失败按策略重试，
    /// 用尽后返回携带最后一次错误信息的 `AyahFetchFailed`。
    pub fn fetch(
        &self,
        source_key: &str,
        chapter_id: u32,
        ayah: u32,
    ) -> Result<Vec<u8>, DownloadError> {
        let url = ayah_url(&self.base_url, source_key, chapter_id, ayah);
        self.policy
            .run(&format!("ayah {chapter_id}:{ayah}"), |attempt| {
                debug!(target: "fetch", "GET {url} (attempt {attempt})");
                match self.transport.get_body(&url) {
                    Ok((status, body)) if is_success(status) => Ok(body),
                    Ok((404, _)) => Err(DownloadError::AyahNotFound { chapter_id, ayah }),
                    Ok((status, _)) => Err(DownloadError::AyahFetchFailed {
                        ayah,
                        message: format!("HTTP error {status}"),
                    }),
                    Err(err) => Err(DownloadError::AyahFetchFailed {
                        ayah,
                        message: err.to_string(),
                    }),
                }
            })
            .inspect_err(|err| warn!(target: "fetch", "{url}: {err}"))
    }
}
