//! 整章音频：直接从诵读版本的服务器取 `{CCC}.mp3`，不重试。

use tracing::{info, warn};

use super::models::{AudioBlob, DownloadOutcome};
use crate::catalog::chapters::Chapter;
use crate::catalog::reciters::ReciterVariant;
use crate::error::DownloadError;
use crate::third_party::http::{AudioTransport, is_success};

/// 整章音频地址，也用作在线播放地址。
pub fn chapter_url(variant: &ReciterVariant, chapter_id: u32) -> String {
    let base = variant.audio_base_url.trim_end_matches('/');
    format!("{base}/{chapter_id:03}.mp3")
}

pub fn suggested_filename(variant: &ReciterVariant, chapter: &Chapter) -> String {
    format!("Chapter_{}_{}.mp3", chapter.english_name, variant.name)
}

pub fn download(
    transport: &dyn AudioTransport,
    variant: &ReciterVariant,
    chapter: &Chapter,
) -> Result<Vec<u8>, DownloadError> {
    let url = chapter_url(variant, chapter.id);
    match transport.get_body(&url) {
        Ok((status, body)) if is_success(status) => {
            info!(target: "full", "{url} 下载完成，{} 字节", body.len());
            Ok(body)
        }
        Ok((status, _)) => {
            warn!(target: "full", "{url} -> HTTP {status}");
            Err(DownloadError::network(format!("HTTP error {status}")))
        }
        Err(err) => {
            warn!(target: "full", "{url}: {err}");
            Err(DownloadError::network(err.to_string()))
        }
    }
}

/// 与分段下载同形的结果，方便界面层统一保存。
pub fn download_outcome(
    transport: &dyn AudioTransport,
    variant: &ReciterVariant,
    chapter: &Chapter,
) -> DownloadOutcome {
    match download(transport, variant, chapter) {
        Ok(bytes) => DownloadOutcome::Success {
            blob: AudioBlob::single(bytes),
            suggested_filename: suggested_filename(variant, chapter),
        },
        Err(reason) => DownloadOutcome::Failure { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::chapters::chapter;
    use crate::third_party::fake::{FakeTransport, Method, Reply};

    fn variant() -> ReciterVariant {
        ReciterVariant {
            id: "1-1".into(),
            name: "سعد الغامدي".into(),
            letter: "س".into(),
            audio_base_url: "https://server8.mp3quran.net/s_gmd/".into(),
            available_chapter_ids: vec![36],
            total_chapter_count: 1,
            narration_name: "حفص عن عاصم".into(),
        }
    }

    #[test]
    fn url_is_zero_padded() {
        assert_eq!(
            chapter_url(&variant(), 36),
            "https://server8.mp3quran.net/s_gmd/036.mp3"
        );
    }

    #[test]
    fn success_returns_body_and_name() {
        let fake = FakeTransport::new();
        let v = variant();
        fake.on_get(&chapter_url(&v, 36), Reply::Body(200, vec![1, 2, 3]));
        let ch = chapter(36).unwrap();
        match download_outcome(&fake, &v, ch) {
            DownloadOutcome::Success {
                blob,
                suggested_filename,
            } => {
                assert_eq!(blob.bytes, vec![1, 2, 3]);
                assert_eq!(suggested_filename, "Chapter_Yaseen_سعد الغامدي.mp3");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_success_is_network_error_without_retry() {
        let fake = FakeTransport::new();
        let v = variant();
        let url = chapter_url(&v, 36);
        fake.on_get(&url, Reply::Status(503));
        let err = download(&fake, &v, chapter(36).unwrap()).unwrap_err();
        assert!(matches!(err, DownloadError::NetworkError { .. }));
        assert_eq!(fake.count(Method::Get, &url), 1);

        fake.on_get("https://server8.mp3quran.net/s_gmd/001.mp3", Reply::Fail("x".into()));
        assert!(download(&fake, &v, chapter(1).unwrap()).is_err());
    }
}
