//! HTTP 传输层。
//!
//! 下载核心只依赖 `AudioTransport` 这三个原语，真实实现基于 `reqwest::blocking`，
//! 测试里换成脚本化的假实现。

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_ENCODING, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::base_system::context::Config;
use crate::error::TransportError;

pub trait AudioTransport: Send + Sync {
    /// 只取响应头，返回状态码。
    fn head_status(&self, url: &str) -> Result<u16, TransportError>;

    /// 发起 GET 但不读取响应体（拿到状态码后立即丢弃，连接随之中断）。
    fn get_status(&self, url: &str) -> Result<u16, TransportError>;

    /// GET 并读取完整响应体；非 2xx 时返回空 body。
    fn get_body(&self, url: &str) -> Result<(u16, Vec<u8>), TransportError>;
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(
        timeout: Option<Duration>,
        connect_timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        // 未启用 gzip 解码，要求服务端返回原始字节
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("identity"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "quran-audio-downloader/",
                env!("CARGO_PKG_VERSION")
            )),
        );

        let mut builder = Client::builder().default_headers(headers);
        // blocking 客户端默认 30s 超时；0 表示不限
        builder = builder.timeout(timeout);
        if let Some(connect) = connect_timeout {
            builder = builder.connect_timeout(connect);
        }
        let client = builder.build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(config.request_timeout(), config.connect_timeout())
    }
}

impl AudioTransport for ReqwestTransport {
    fn head_status(&self, url: &str) -> Result<u16, TransportError> {
        let resp = self.client.head(url).send()?;
        let status = resp.status().as_u16();
        debug!(target: "http", "HEAD {url} -> {status}");
        Ok(status)
    }

    fn get_status(&self, url: &str) -> Result<u16, TransportError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        drop(resp);
        debug!(target: "http", "GET(status) {url} -> {status}");
        Ok(status)
    }

    fn get_body(&self, url: &str) -> Result<(u16, Vec<u8>), TransportError> {
        let resp = self.client.get(url).send()?;
        let status = resp.status().as_u16();
        debug!(target: "http", "GET {url} -> {status}");
        if !is_success(status) {
            return Ok((status, Vec::new()));
        }
        let bytes = resp.bytes()?;
        Ok((status, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range_is_2xx_only() {
        assert!(is_success(200));
        assert!(is_success(206));
        assert!(!is_success(199));
        assert!(!is_success(301));
        assert!(!is_success(404));
    }

    #[test]
    fn client_builds_with_and_without_timeouts() {
        assert!(ReqwestTransport::new(None, None).is_ok());
        assert!(
            ReqwestTransport::new(Some(Duration::from_secs(5)), Some(Duration::from_secs(2)))
                .is_ok()
        );
    }
}
