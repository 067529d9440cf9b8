//! 下载核心入口。
//!
//! 子模块：
//! - `models`：请求、结果、状态与进度快照
//! - `range_support`：分段下载可用性判定与逐节音频源映射
//! - `assembler`：分段下载状态机
//! - `full_chapter`：整章下载
//! - `progress`：进度快照与终端进度条
//! - `save`：结果落盘

pub mod assembler;
pub mod full_chapter;
pub mod models;
pub mod progress;
pub mod range_support;
pub mod save;
