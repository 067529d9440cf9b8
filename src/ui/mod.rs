//! 交互层入口：命令行与 Web 两套实现。

pub mod noui;
pub mod web;
