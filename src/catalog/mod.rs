//! 目录数据：诵读者、章节表、经文。

pub mod chapters;
pub mod reciters;
pub mod text;
