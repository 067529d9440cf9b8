//! 章节经文（quran-uthmani）获取，以及首节的泰斯米（Basmalah）剥离。

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::third_party::http::{AudioTransport, is_success};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterText {
    pub number: u32,
    pub name: String,
    pub english_name: String,
    #[serde(default)]
    pub english_name_translation: String,
    #[serde(default)]
    pub revelation_type: String,
    pub number_of_ayahs: u32,
    pub ayahs: Vec<AyahText>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AyahText {
    pub number: u32,
    pub number_in_surah: u32,
    pub text: String,
    #[serde(default)]
    pub juz: u32,
    #[serde(default)]
    pub page: u32,
}

#[derive(Deserialize)]
struct Envelope {
    status: String,
    data: Option<ChapterText>,
}

pub fn text_url(base: &str, chapter_id: u32) -> String {
    format!("{}/{}/quran-uthmani", base.trim_end_matches('/'), chapter_id)
}

/// 拉取章节经文；失败或 `status != "OK"` 时返回 `None`。
pub fn fetch(transport: &dyn AudioTransport, base: &str, chapter_id: u32) -> Option<ChapterText> {
    let url = text_url(base, chapter_id);
    let body = match transport.get_body(&url) {
        Ok((status, body)) if is_success(status) => body,
        Ok((status, _)) => {
            warn!(target: "text", "{url} -> HTTP {status}");
            return None;
        }
        Err(err) => {
            warn!(target: "text", "{url}: {err}");
            return None;
        }
    };

    let env: Envelope = match serde_json::from_slice(&body) {
        Ok(env) => env,
        Err(err) => {
            warn!(target: "text", "章节 {chapter_id} 经文解析失败: {err}");
            return None;
        }
    };
    if env.status != "OK" {
        debug!(target: "text", "章节 {chapter_id} status={}", env.status);
        return None;
    }
    env.data
}

fn basmalah_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^بِسْمِ\s+ٱللَّهِ\s+ٱلرَّحْمَٰنِ\s+ٱلرَّحِيمِ\s*").ok())
        .as_ref()
}

/// 第 1、9 章以外，第一节开头的泰斯米不属于该节，显示时去掉。
pub fn display_text(chapter_id: u32, ayah: &AyahText) -> String {
    if ayah.number_in_surah == 1
        && chapter_id != 1
        && chapter_id != 9
        && let Some(re) = basmalah_re()
    {
        re.replace(&ayah.text, "").into_owned()
    } else {
        ayah.text.clone()
    }
}

impl ChapterText {
    /// 按显示规则处理后的 (节号, 经文)。
    pub fn display_ayahs(&self) -> Vec<(u32, String)> {
        self.ayahs
            .iter()
            .map(|a| (a.number_in_surah, display_text(self.number, a)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::third_party::fake::{FakeTransport, Reply};

    const BASMALAH: &str = "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ";

    fn ayah(n: u32, text: &str) -> AyahText {
        AyahText {
            number: n,
            number_in_surah: n,
            text: text.to_string(),
            juz: 1,
            page: 1,
        }
    }

    #[test]
    fn basmalah_is_stripped_from_first_ayah_only() {
        let first = ayah(1, &format!("{BASMALAH} الم"));
        assert_eq!(display_text(2, &first), "الم");
        assert_eq!(display_text(1, &first), first.text);
        assert_eq!(display_text(9, &first), first.text);

        let second = ayah(2, &format!("{BASMALAH} x"));
        assert_eq!(display_text(2, &second), second.text);
    }

    #[test]
    fn fetch_reads_ok_envelope() {
        let fake = FakeTransport::new();
        let body = format!(
            r#"{{"code":200,"status":"OK","data":{{"number":112,"name":"سُورَةُ الإِخۡلَاصِ",
            "englishName":"Al-Ikhlaas","englishNameTranslation":"Sincerity",
            "revelationType":"Meccan","numberOfAyahs":4,
            "ayahs":[{{"number":6222,"text":"{BASMALAH} قُلْ هُوَ ٱللَّهُ أَحَدٌ","numberInSurah":1,"juz":30,"manzil":7,"page":604}}]}}}}"#
        );
        fake.on_get(
            &text_url("https://api/v1/surah", 112),
            Reply::Body(200, body.into_bytes()),
        );
        let text = fetch(&fake, "https://api/v1/surah/", 112).unwrap();
        assert_eq!(text.english_name, "Al-Ikhlaas");
        assert_eq!(text.number_of_ayahs, 4);
        assert_eq!(text.display_ayahs()[0].1, "قُلْ هُوَ ٱللَّهُ أَحَدٌ");
    }

    #[test]
    fn fetch_rejects_non_ok_and_errors() {
        let fake = FakeTransport::new();
        fake.on_get(
            &text_url("https://api", 1),
            Reply::Body(200, br#"{"code":404,"status":"NOT FOUND","data":null}"#.to_vec()),
        );
        fake.on_get(&text_url("https://api", 2), Reply::Fail("offline".into()));
        assert!(fetch(&fake, "https://api", 1).is_none());
        assert!(fetch(&fake, "https://api", 2).is_none());
        assert!(fetch(&fake, "https://api", 3).is_none());
    }
}
