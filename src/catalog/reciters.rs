//! 诵读者目录：把远端“诵读者 → 多个诵读版本（moshaf）”的嵌套结构展开为扁平列表。

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::base_system::json_extract::{JsonMap, id_list, pick_objects, pick_string, pick_u64};
use crate::download::range_support::supports_range;
use crate::third_party::http::{AudioTransport, is_success};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReciterVariant {
    /// `"{reciterId}-{moshafId}"`
    pub id: String,
    pub name: String,
    pub letter: String,
    pub audio_base_url: String,
    pub available_chapter_ids: Vec<u32>,
    pub total_chapter_count: u32,
    pub narration_name: String,
}

/// 拉取并展开目录。任何网络或解析失败都返回空列表。
pub fn load(transport: &dyn AudioTransport, url: &str) -> Vec<ReciterVariant> {
    let body = match transport.get_body(url) {
        Ok((status, body)) if is_success(status) => body,
        Ok((status, _)) => {
            error!(target: "catalog", "目录请求失败: HTTP {status}");
            return Vec::new();
        }
        Err(err) => {
            error!(target: "catalog", "目录请求失败: {err}");
            return Vec::new();
        }
    };

    let raw: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(err) => {
            error!(target: "catalog", "目录解析失败: {err}");
            return Vec::new();
        }
    };

    let list = normalize_catalog(&raw);
    info!(target: "catalog", "已加载 {} 个诵读版本", list.len());
    list
}

pub fn normalize_catalog(raw: &Value) -> Vec<ReciterVariant> {
    let Some(root) = raw.as_object() else {
        warn!(target: "catalog", "目录不是 JSON 对象");
        return Vec::new();
    };

    let mut out: Vec<ReciterVariant> = pick_objects(root, "reciters")
        .into_iter()
        .flat_map(expand_reciter)
        .collect();

    out.sort_by(|a, b| {
        collation_key(&a.name)
            .cmp(&collation_key(&b.name))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}

fn expand_reciter(reciter: &JsonMap) -> Vec<ReciterVariant> {
    let Some(reciter_id) = pick_string(reciter, &["id"]) else {
        return Vec::new();
    };
    let name = pick_string(reciter, &["name"]).unwrap_or_default();
    let letter = pick_string(reciter, &["letter"]).unwrap_or_default();

    pick_objects(reciter, "moshaf")
        .into_iter()
        .filter_map(|moshaf| {
            let moshaf_id = pick_string(moshaf, &["id"])?;
            let server = pick_string(moshaf, &["server"])?;
            let total = pick_u64(moshaf, &["surah_total"]).unwrap_or(0);
            Some(ReciterVariant {
                id: format!("{reciter_id}-{moshaf_id}"),
                name: name.clone(),
                letter: letter.clone(),
                audio_base_url: server,
                available_chapter_ids: id_list(moshaf.get("surah_list")),
                total_chapter_count: u32::try_from(total).unwrap_or(u32::MAX),
                narration_name: pick_string(moshaf, &["name"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// 阿拉伯文归一化：去掉符号与延长线，合并同一字母的不同写法，压缩空白。
pub fn fold_arabic(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !is_tashkeel(*c))
        .map(|c| match c {
            'أ' | 'إ' | 'آ' | 'ٱ' => 'ا',
            'ى' | 'ئ' => 'ي',
            'ؤ' => 'و',
            'ة' => 'ه',
            other => other,
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_tashkeel(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}')
}

fn collation_key(name: &str) -> String {
    fold_arabic(name)
}

/// 名称或首字母包含关键字；`range_only` 时只保留支持分段下载的版本。
pub fn filter_reciters<'a>(
    list: &'a [ReciterVariant],
    query: &str,
    range_only: bool,
) -> Vec<&'a ReciterVariant> {
    let query = query.trim();
    list.iter()
        .filter(|r| query.is_empty() || r.name.contains(query) || r.letter.contains(query))
        .filter(|r| !range_only || supports_range(r))
        .collect()
}

pub fn find<'a>(list: &'a [ReciterVariant], id: &str) -> Option<&'a ReciterVariant> {
    list.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::third_party::fake::{FakeTransport, Reply};
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "reciters": [
                {
                    "id": 123,
                    "name": "مشاري العفاسي",
                    "letter": "م",
                    "moshaf": [
                        {"id": 1, "name": "حفص عن عاصم - مرتل", "server": "https://s1/afs/",
                         "surah_total": "3", "surah_list": "1,2,2,114"},
                        {"id": 2, "name": "ورش عن نافع", "server": "https://s2/afs/",
                         "surah_total": 1, "surah_list": "1"}
                    ]
                },
                {"id": 7, "name": "أحمد بن علي العجمي", "letter": "أ", "moshaf": [
                    {"id": "5", "name": "حفص عن عاصم", "server": "https://s3/ajm/",
                     "surah_total": 114, "surah_list": "1,2"}
                ]},
                {"id": 9, "name": "بلا روايات", "letter": "ب", "moshaf": []}
            ]
        })
    }

    #[test]
    fn nested_catalog_expands_to_variants() {
        let list = normalize_catalog(&sample());
        assert_eq!(list.len(), 3);

        let afs = find(&list, "123-1").unwrap();
        assert_eq!(afs.name, "مشاري العفاسي");
        assert_eq!(afs.audio_base_url, "https://s1/afs/");
        assert_eq!(afs.available_chapter_ids, vec![1, 2, 2, 114]);
        assert_eq!(afs.total_chapter_count, 3);
        assert_eq!(afs.narration_name, "حفص عن عاصم - مرتل");

        assert!(find(&list, "123-2").is_some());
        assert!(find(&list, "7-5").is_some());
        assert!(list.iter().all(|r| !r.id.starts_with("9-")));
    }

    #[test]
    fn sorted_by_folded_arabic_name() {
        let list = normalize_catalog(&sample());
        // "أحمد" 归一化为 "احمد"，排在 "مشاري" 之前
        assert_eq!(list[0].id, "7-5");
        assert_eq!(list[1].name, "مشاري العفاسي");
    }

    #[test]
    fn malformed_input_yields_empty() {
        assert!(normalize_catalog(&json!([1, 2])).is_empty());
        assert!(normalize_catalog(&json!({"reciters": "x"})).is_empty());
    }

    #[test]
    fn load_fails_soft() {
        let fake = FakeTransport::new();
        fake.on_get("https://cat/bad", Reply::Body(200, b"not json".to_vec()));
        fake.on_get("https://cat/down", Reply::Fail("offline".into()));
        fake.on_get("https://cat/500", Reply::Status(500));
        assert!(load(&fake, "https://cat/bad").is_empty());
        assert!(load(&fake, "https://cat/down").is_empty());
        assert!(load(&fake, "https://cat/500").is_empty());
    }

    #[test]
    fn load_parses_body() {
        let fake = FakeTransport::new();
        let body = serde_json::to_vec(&sample()).unwrap();
        fake.on_get("https://cat/ok", Reply::Body(200, body));
        assert_eq!(load(&fake, "https://cat/ok").len(), 3);
    }

    #[test]
    fn fold_removes_marks_and_merges_letters() {
        assert_eq!(fold_arabic("  عَبْدُ   الْبَاسِط "), "عبد الباسط");
        assert_eq!(fold_arabic("إبراهيم الأخضر"), "ابراهيم الاخضر");
        assert_eq!(fold_arabic("مكـــة"), "مكه");
    }

    #[test]
    fn filter_by_name_letter_and_range() {
        let list = normalize_catalog(&sample());
        assert_eq!(filter_reciters(&list, "", false).len(), 3);
        assert_eq!(filter_reciters(&list, "العفاسي", false).len(), 2);
        assert_eq!(filter_reciters(&list, "أ", false).len(), 1);

        let ranged: Vec<&str> = filter_reciters(&list, "", true)
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert!(ranged.contains(&"123-1"));
        assert!(!ranged.contains(&"123-2"));
        assert!(ranged.contains(&"7-5"));
    }
}
