//! Web 界面：浏览诵读者与章节、在线试听、提交下载任务。

mod router;
mod routes;
mod state;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::base_system::context::Config;
use crate::base_system::logging;
use crate::third_party::http::AudioTransport;
use state::{AppState, JobStore, LogBuffer};

const DEFAULT_BIND: &str = "127.0.0.1:18424";
const BIND_ENV: &str = "QURAN_WEB_ADDR";

pub fn run(config: &Config, transport: Arc<dyn AudioTransport>) -> Result<()> {
    let bind_raw = std::env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let bind_addrs = parse_bind_addrs(&bind_raw)?;

    let library_root = config.default_save_dir();
    std::fs::create_dir_all(&library_root)
        .map_err(|e| anyhow!(e).context(format!("create {}", library_root.display())))?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(run_async(bind_addrs, config.clone(), library_root, transport))
}

fn parse_bind_addr(raw: &str) -> Result<SocketAddr> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(anyhow!("empty bind addr"));
    }

    if let Ok(a) = s.parse::<SocketAddr>() {
        return Ok(a);
    }

    // 容忍不带方括号的 IPv6，如 "::1:18424"
    if !s.starts_with('[')
        && let Some((host, port)) = s.rsplit_once(':')
        && host.contains(':')
        && !port.is_empty()
        && port.chars().all(|c| c.is_ascii_digit())
        && let Ok(a) = format!("[{host}]:{port}").parse::<SocketAddr>()
    {
        return Ok(a);
    }

    Err(anyhow!(
        "invalid {BIND_ENV}: '{s}'. Use '127.0.0.1:18424' or '[::1]:18424'; separate multiple binds by comma."
    ))
}

fn parse_bind_addrs(raw: &str) -> Result<Vec<SocketAddr>> {
    let mut out = Vec::new();
    for part in raw.split([',', ';']).map(str::trim).filter(|s| !s.is_empty()) {
        let a = parse_bind_addr(part)?;
        if !out.contains(&a) {
            out.push(a);
        }
    }
    if out.is_empty() {
        return Err(anyhow!("empty {BIND_ENV}"));
    }
    Ok(out)
}

async fn run_async(
    bind_addrs: Vec<SocketAddr>,
    config: Config,
    library_root: PathBuf,
    transport: Arc<dyn AudioTransport>,
) -> Result<()> {
    let state = AppState {
        bind_addrs: Arc::new(bind_addrs.clone()),
        config: Arc::new(config),
        library_root: Arc::new(library_root),
        jobs: Arc::new(JobStore::default()),
        transport,
        logs: Arc::new(LogBuffer::new(logging::take_broadcast_rx())),
    };

    let notify = Arc::new(tokio::sync::Notify::new());
    {
        let notify = notify.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            println!("正在停止服务...");
            notify.notify_waiters();
        });
    }

    let mut servers = Vec::new();
    for bind in bind_addrs {
        let listener = match tokio::net::TcpListener::bind(bind).await {
            Ok(l) => l,
            Err(e) => {
                // 双栈下 [::] 可能已经覆盖了 0.0.0.0
                if !servers.is_empty() && e.kind() == std::io::ErrorKind::AddrInUse {
                    warn!(target: "web", bind = %bind, error = %e, "bind failed (AddrInUse), skipping");
                    continue;
                }
                return Err(anyhow!(e).context(format!("bind failed: {bind}")));
            }
        };

        info!(target: "web", "Web UI listening on http://{bind}/ (set {BIND_ENV} to override)");
        println!("Web UI listening on http://{bind}/");

        let app = router::build_router(state.clone());
        let notify = notify.clone();
        servers.push(tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                notify.notified().await;
            })
            .await
        }));
    }

    if servers.is_empty() {
        return Err(anyhow!("no listeners started (check {BIND_ENV})"));
    }

    println!("按 Ctrl+C 停止。");
    for h in servers {
        h.await
            .map_err(|e| anyhow!("server task join failed: {e}"))?
            .map_err(|e| anyhow!(e))?;
    }
    Ok(())
}
