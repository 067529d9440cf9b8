//! 第三方音频源与 HTTP 传输。

pub mod every_ayah;
#[cfg(test)]
pub mod fake;
pub mod http;
