//! 内置章节表（114 章）及查询、筛选。

use serde::Serialize;

use super::reciters::ReciterVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Revelation {
    Meccan,
    Medinan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub id: u32,
    pub arabic_name: &'static str,
    pub english_name: &'static str,
    pub ayah_count: u32,
    pub revelation: Revelation,
}

const fn ch(
    id: u32,
    arabic_name: &'static str,
    english_name: &'static str,
    ayah_count: u32,
    revelation: Revelation,
) -> Chapter {
    Chapter {
        id,
        arabic_name,
        english_name,
        ayah_count,
        revelation,
    }
}

use Revelation::{Meccan, Medinan};

pub static CHAPTERS: [Chapter; 114] = [
    ch(1, "الفاتحة", "Al-Faatiha", 7, Meccan),
    ch(2, "البقرة", "Al-Baqara", 286, Medinan),
    ch(3, "آل عمران", "Aal-i-Imraan", 200, Medinan),
    ch(4, "النساء", "An-Nisaa", 176, Medinan),
    ch(5, "المائدة", "Al-Maaida", 120, Medinan),
    ch(6, "الأنعام", "Al-An'aam", 165, Meccan),
    ch(7, "الأعراف", "Al-A'raaf", 206, Meccan),
    ch(8, "الأنفال", "Al-Anfaal", 75, Medinan),
    ch(9, "التوبة", "At-Tawba", 129, Medinan),
    ch(10, "يونس", "Yunus", 109, Meccan),
    ch(11, "هود", "Hud", 123, Meccan),
    ch(12, "يوسف", "Yusuf", 111, Meccan),
    ch(13, "الرعد", "Ar-Ra'd", 43, Medinan),
    ch(14, "إبراهيم", "Ibrahim", 52, Meccan),
    ch(15, "الحجر", "Al-Hijr", 99, Meccan),
    ch(16, "النحل", "An-Nahl", 128, Meccan),
    ch(17, "الإسراء", "Al-Israa", 111, Meccan),
    ch(18, "الكهف", "Al-Kahf", 110, Meccan),
    ch(19, "مريم", "Maryam", 98, Meccan),
    ch(20, "طه", "Taa-Haa", 135, Meccan),
    ch(21, "الأنبياء", "Al-Anbiyaa", 112, Meccan),
    ch(22, "الحج", "Al-Hajj", 78, Medinan),
    ch(23, "المؤمنون", "Al-Muminoon", 118, Meccan),
    ch(24, "النور", "An-Noor", 64, Medinan),
    ch(25, "الفرقان", "Al-Furqaan", 77, Meccan),
    ch(26, "الشعراء", "Ash-Shu'araa", 227, Meccan),
    ch(27, "النمل", "An-Naml", 93, Meccan),
    ch(28, "القصص", "Al-Qasas", 88, Meccan),
    ch(29, "العنكبوت", "Al-Ankaboot", 69, Meccan),
    ch(30, "الروم", "Ar-Room", 60, Meccan),
    ch(31, "لقمان", "Luqman", 34, Meccan),
    ch(32, "السجدة", "As-Sajda", 30, Meccan),
    ch(33, "الأحزاب", "Al-Ahzaab", 73, Medinan),
    ch(34, "سبأ", "Saba", 54, Meccan),
    ch(35, "فاطر", "Faatir", 45, Meccan),
    ch(36, "يس", "Yaseen", 83, Meccan),
    ch(37, "الصافات", "As-Saaffaat", 182, Meccan),
    ch(38, "ص", "Saad", 88, Meccan),
    ch(39, "الزمر", "Az-Zumar", 75, Meccan),
    ch(40, "غافر", "Ghafir", 85, Meccan),
    ch(41, "فصلت", "Fussilat", 54, Meccan),
    ch(42, "الشورى", "Ash-Shura", 53, Meccan),
    ch(43, "الزخرف", "Az-Zukhruf", 89, Meccan),
    ch(44, "الدخان", "Ad-Dukhaan", 59, Meccan),
    ch(45, "الجاثية", "Al-Jaathiya", 37, Meccan),
    ch(46, "الأحقاف", "Al-Ahqaf", 35, Meccan),
    ch(47, "محمد", "Muhammad", 38, Medinan),
    ch(48, "الفتح", "Al-Fath", 29, Medinan),
    ch(49, "الحجرات", "Al-Hujuraat", 18, Medinan),
    ch(50, "ق", "Qaaf", 45, Meccan),
    ch(51, "الذاريات", "Adh-Dhaariyat", 60, Meccan),
    ch(52, "الطور", "At-Tur", 49, Meccan),
    ch(53, "النجم", "An-Najm", 62, Meccan),
    ch(54, "القمر", "Al-Qamar", 55, Meccan),
    ch(55, "الرحمن", "Ar-Rahmaan", 78, Medinan),
    ch(56, "الواقعة", "Al-Waaqia", 96, Meccan),
    ch(57, "الحديد", "Al-Hadid", 29, Medinan),
    ch(58, "المجادلة", "Al-Mujaadila", 22, Medinan),
    ch(59, "الحشر", "Al-Hashr", 24, Medinan),
    ch(60, "الممتحنة", "Al-Mumtahana", 13, Medinan),
    ch(61, "الصف", "As-Saff", 14, Medinan),
    ch(62, "الجمعة", "Al-Jumu'a", 11, Medinan),
    ch(63, "المنافقون", "Al-Munaafiqoon", 11, Medinan),
    ch(64, "التغابن", "At-Taghaabun", 18, Medinan),
    ch(65, "الطلاق", "At-Talaaq", 12, Medinan),
    ch(66, "التحريم", "At-Tahrim", 12, Medinan),
    ch(67, "الملك", "Al-Mulk", 30, Meccan),
    ch(68, "القلم", "Al-Qalam", 52, Meccan),
    ch(69, "الحاقة", "Al-Haaqqa", 52, Meccan),
    ch(70, "المعارج", "Al-Ma'aarij", 44, Meccan),
    ch(71, "نوح", "Nooh", 28, Meccan),
    ch(72, "الجن", "Al-Jinn", 28, Meccan),
    ch(73, "المزمل", "Al-Muzzammil", 20, Meccan),
    ch(74, "المدثر", "Al-Muddaththir", 56, Meccan),
    ch(75, "القيامة", "Al-Qiyaama", 40, Meccan),
    ch(76, "الإنسان", "Al-Insaan", 31, Medinan),
    ch(77, "المرسلات", "Al-Mursalaat", 50, Meccan),
    ch(78, "النبأ", "An-Naba", 40, Meccan),
    ch(79, "النازعات", "An-Naazi'aat", 46, Meccan),
    ch(80, "عبس", "Abasa", 42, Meccan),
    ch(81, "التكوير", "At-Takwir", 29, Meccan),
    ch(82, "الانفطار", "Al-Infitaar", 19, Meccan),
    ch(83, "المطففين", "Al-Mutaffifin", 36, Meccan),
    ch(84, "الانشقاق", "Al-Inshiqaaq", 25, Meccan),
    ch(85, "البروج", "Al-Burooj", 22, Meccan),
    ch(86, "الطارق", "At-Taariq", 17, Meccan),
    ch(87, "الأعلى", "Al-A'laa", 19, Meccan),
    ch(88, "الغاشية", "Al-Ghaashiya", 26, Meccan),
    ch(89, "الفجر", "Al-Fajr", 30, Meccan),
    ch(90, "البلد", "Al-Balad", 20, Meccan),
    ch(91, "الشمس", "Ash-Shams", 15, Meccan),
    ch(92, "الليل", "Al-Lail", 21, Meccan),
    ch(93, "الضحى", "Ad-Dhuhaa", 11, Meccan),
    ch(94, "الشرح", "Ash-Sharh", 8, Meccan),
    ch(95, "التين", "At-Tin", 8, Meccan),
    ch(96, "العلق", "Al-Alaq", 19, Meccan),
    ch(97, "القدر", "Al-Qadr", 5, Meccan),
    ch(98, "البينة", "Al-Bayyina", 8, Medinan),
    ch(99, "الزلزلة", "Az-Zalzala", 8, Medinan),
    ch(100, "العاديات", "Al-Aadiyaat", 11, Meccan),
    ch(101, "القارعة", "Al-Qaari'a", 11, Meccan),
    ch(102, "التكاثر", "At-Takaathur", 8, Meccan),
    ch(103, "العصر", "Al-Asr", 3, Meccan),
    ch(104, "الهمزة", "Al-Humaza", 9, Meccan),
    ch(105, "الفيل", "Al-Fil", 5, Meccan),
    ch(106, "قريش", "Quraish", 4, Meccan),
    ch(107, "الماعون", "Al-Maa'un", 7, Meccan),
    ch(108, "الكوثر", "Al-Kawthar", 3, Meccan),
    ch(109, "الكافرون", "Al-Kaafiroon", 6, Meccan),
    ch(110, "النصر", "An-Nasr", 3, Medinan),
    ch(111, "المسد", "Al-Masad", 5, Meccan),
    ch(112, "الإخلاص", "Al-Ikhlaas", 4, Meccan),
    ch(113, "الفلق", "Al-Falaq", 5, Meccan),
    ch(114, "الناس", "An-Naas", 6, Meccan),
];

pub fn chapter(id: u32) -> Option<&'static Chapter> {
    let idx = usize::try_from(id).ok()?.checked_sub(1)?;
    CHAPTERS.get(idx)
}

/// 该诵读版本提供的章节，按章节表顺序；源数据中的重复 id 只出现一次。
pub fn available_chapters(variant: &ReciterVariant) -> Vec<&'static Chapter> {
    CHAPTERS
        .iter()
        .filter(|c| variant.available_chapter_ids.contains(&c.id))
        .collect()
}

/// 阿拉伯文名包含、英文名（忽略大小写）包含，或 id 完全相等。
pub fn filter_chapters<'a>(list: &[&'a Chapter], query: &str) -> Vec<&'a Chapter> {
    let query = query.trim();
    if query.is_empty() {
        return list.to_vec();
    }
    let lower = query.to_lowercase();
    list.iter()
        .copied()
        .filter(|c| {
            c.arabic_name.contains(query)
                || c.english_name.to_lowercase().contains(&lower)
                || c.id.to_string() == query
        })
        .collect()
}
