//! 古兰经音频下载器。
//!
//! 浏览诵读者目录与 114 章，整章下载，或者把逐节音频拼成任意节范围的 mp3。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志/重试等基础设施
//! - `catalog`：章节表、诵读者目录、经文
//! - `download`：整章下载、分段拼接状态机、保存
//! - `third_party`：HTTP 传输与逐节音频源
//! - `ui`：命令行与 Web 两套交互
//! - `prewarm_state`：启动时后台加载目录

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;

mod base_system;
mod catalog;
mod download;
mod error;
mod prewarm_state;
mod third_party;
mod ui;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use third_party::http::{AudioTransport, ReqwestTransport};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "quran-audio-downloader")]
#[command(about = "Quran audio browser and downloader")]
struct Cli {
    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 启用服务器模式（Web UI）
    #[arg(long, default_value_t = false)]
    server: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,

    /// 数据目录路径（存放 config.yml 和 logs，方便 Docker 挂载）
    #[arg(long)]
    data_dir: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("Quran Audio Downloader v{}", VERSION);
        return Ok(());
    }

    let data_dir = cli.data_dir.as_deref().map(Path::new);
    let _log = init_logging(cli.debug, cli.server, data_dir)?;

    let config =
        load_or_create::<Config>(None, data_dir).map_err(|e| anyhow!(e.to_string()))?;
    info!(target: "startup", "当前版本: v{}", VERSION);

    let transport: Arc<dyn AudioTransport> =
        Arc::new(ReqwestTransport::from_config(&config).map_err(|e| anyhow!(e))?);
    prewarm_state::spawn_catalog_load(transport.clone(), config.catalog_url.clone());

    if cli.server {
        // 保留一份引用，阻塞客户端不能在 tokio 运行时内析构
        return ui::web::run(&config, transport.clone());
    }
    ui::noui::run(&config, transport)
}

/// 命令行模式下控制台日志会打断交互提示，只写文件；服务器模式额外广播给 Web 端。
fn init_logging(debug: bool, server: bool, base_dir: Option<&Path>) -> Result<LogSystem> {
    let opts = LogOptions {
        debug,
        use_color: true,
        archive_on_exit: true,
        console: server,
        broadcast_to_ui: server,
    };
    LogSystem::init_with_base(opts, base_dir).map_err(|e| anyhow!(e))
}
