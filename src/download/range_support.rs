//! 分段下载可用性判定：只有“哈夫斯”传本，且名字能对上逐节音频源的诵读者才支持。

use crate::catalog::reciters::{ReciterVariant, fold_arabic};

pub const HAFS_MARKER: &str = "حفص";

/// (诵读者名字关键词, 逐节音频源目录)。按顺序匹配，先匹配者胜出。
pub static EVERY_AYAH_SOURCES: &[(&str, &str)] = &[
    ("مشاري العفاسي", "Alafasy_128kbps"),
    ("عبدالباسط عبدالصمد", "Abdul_Basit_Murattal_192kbps"),
    ("محمود خليل الحصري", "Husary_128kbps"),
    ("محمد صديق المنشاوي", "Minshawy_Murattal_128kbps"),
    ("عبدالرحمن السديس", "Abdurrahmaan_As-Sudais_192kbps"),
    ("سعود الشريم", "Saood_ash-Shuraym_128kbps"),
    ("ماهر المعيقلي", "Maher_AlMuaiqly_64kbps"),
    ("سعد الغامدي", "Ghamadi_40kbps"),
    ("أبو بكر الشاطري", "Abu_Bakr_Ash-Shaatree_128kbps"),
    ("علي الحذيفي", "Hudhaify_128kbps"),
    ("محمد أيوب", "Muhammad_Ayyoub_128kbps"),
    ("محمد جبريل", "Muhammad_Jibreel_128kbps"),
    ("ناصر القطامي", "Nasser_Alqatami_128kbps"),
    ("ياسر الدوسري", "Yasser_Ad-Dussary_128kbps"),
    ("هاني الرفاعي", "Hani_Rifai_192kbps"),
    ("أحمد بن علي العجمي", "Ahmed_ibn_Ali_al-Ajamy_128kbps_ketaballah.net"),
    ("عبدالله بصفر", "Abdullah_Basfar_192kbps"),
    ("محمد الطبلاوي", "Mohammad_al_Tablaway_128kbps"),
    ("إبراهيم الأخضر", "Ibrahim_Akhdar_32kbps"),
    ("فارس عباد", "Fares_Abbad_64kbps"),
    ("صلاح البدير", "Salah_Al_Budair_128kbps"),
    ("خالد القحطاني", "Khaalid_Abdullaah_al-Qahtaanee_192kbps"),
    ("علي جابر", "Ali_Jaber_64kbps"),
    ("عبدالله عواد الجهني", "Abdullaah_3awwaad_Al-Juhaynee_128kbps"),
    ("مصطفى إسماعيل", "Mustafa_Ismail_48kbps"),
    ("صلاح بو خاطر", "Salaah_AbdulRahman_Bukhatir_128kbps"),
    ("أيمن سويد", "Ayman_Sowaid_64kbps"),
    ("أكرم العلاقمي", "Akram_AlAlaqimy_128kbps"),
];

/// 关键词的每个空白分隔片段都必须出现在名字里（不要求顺序）。
pub fn key_matches(key: &str, display_name: &str) -> bool {
    let name = fold_arabic(display_name);
    let key = fold_arabic(key);
    let mut tokens = key.split_whitespace().peekable();
    if tokens.peek().is_none() {
        return false;
    }
    tokens.all(|token| name.contains(token))
}

pub fn resolve_source_key(display_name: &str) -> Option<&'static str> {
    EVERY_AYAH_SOURCES
        .iter()
        .find(|(key, _)| key_matches(key, display_name))
        .map(|(_, source)| *source)
}

pub fn is_hafs(variant: &ReciterVariant) -> bool {
    variant.narration_name.contains(HAFS_MARKER)
}

pub fn supports_range(variant: &ReciterVariant) -> bool {
    is_hafs(variant) && resolve_source_key(&variant.name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, narration: &str) -> ReciterVariant {
        ReciterVariant {
            id: "1-1".into(),
            name: name.into(),
            letter: "x".into(),
            audio_base_url: "https://server".into(),
            available_chapter_ids: vec![1],
            total_chapter_count: 1,
            narration_name: narration.into(),
        }
    }

    #[test]
    fn non_hafs_is_never_supported() {
        let v = variant("مشاري العفاسي", "ورش عن نافع");
        assert!(!supports_range(&v));
        assert!(resolve_source_key(&v.name).is_some());
    }

    #[test]
    fn hafs_with_known_name_is_supported() {
        assert!(supports_range(&variant("مشاري العفاسي", "حفص عن عاصم - مرتل")));
        assert!(!supports_range(&variant("قارئ مجهول", "حفص عن عاصم")));
    }

    #[test]
    fn extra_words_in_name_still_match() {
        assert_eq!(
            resolve_source_key("الشيخ مشاري بن راشد العفاسي"),
            Some("Alafasy_128kbps")
        );
    }

    #[test]
    fn all_tokens_are_required() {
        assert!(!key_matches("محمد أيوب", "محمد جبريل"));
        assert!(key_matches("محمد أيوب", "أيوب محمد"));
        assert!(!key_matches("", "محمد"));
    }

    #[test]
    fn letter_variants_are_folded() {
        assert_eq!(
            resolve_source_key("ابراهيم الاخضر"),
            Some("Ibrahim_Akhdar_32kbps")
        );
        assert_eq!(
            resolve_source_key("أحمد بن عليّ العجمي"),
            Some("Ahmed_ibn_Ali_al-Ajamy_128kbps_ketaballah.net")
        );
    }
}
