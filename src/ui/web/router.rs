use axum::Router;
use axum::extract::connect_info::ConnectInfo;
use axum::http::Request;
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use axum::routing::{delete, get};
use tracing::info;

use super::routes;
use super::state::AppState;

pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::index::index))
        .route("/assets/app.css", get(routes::index::asset_css))
        .route("/assets/app.js", get(routes::index::asset_js))
        .route("/api/status", get(routes::status::api_status))
        .route("/api/logs", get(routes::logs::api_logs))
        .route("/api/reciters", get(routes::catalog::list_reciters))
        .route(
            "/api/reciters/:id/chapters",
            get(routes::catalog::list_chapters),
        )
        .route("/api/chapters/:id/text", get(routes::catalog::chapter_text))
        .route(
            "/api/jobs",
            get(routes::jobs::list_jobs).post(routes::jobs::create_job),
        )
        .route("/api/jobs/:id", delete(routes::jobs::delete_job))
        .route("/download/*path", get(routes::download::download_file))
        .layer(from_fn(access_log_mw))
        .with_state(state)
}

async fn access_log_mw(req: Request<axum::body::Body>, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();
    let ip = req
        .extensions()
        .get::<ConnectInfo<std::net::SocketAddr>>()
        .map(|c| c.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let resp = next.run(req).await;
    // 轮询接口太频繁，不记
    if !matches!(path.as_str(), "/api/jobs" | "/api/logs") || method != "GET" {
        info!(target: "web_access", ip = %ip, method = %method, path = %path, status = %resp.status().as_u16(), "ok");
    }
    resp
}
