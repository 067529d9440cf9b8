use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::prewarm_state;
use crate::ui::web::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub(crate) async fn api_status(State(state): State<AppState>) -> Json<Value> {
    let cfg = state.config.as_ref();
    let binds: Vec<String> = state.bind_addrs.iter().map(|a| a.to_string()).collect();
    Json(json!({
        "version": VERSION,
        "prewarm_in_progress": prewarm_state::is_prewarm_in_progress(),
        "catalog_loaded": prewarm_state::is_loaded(),
        "catalog_size": prewarm_state::catalog().len(),
        "save_dir": state.library_root.to_string_lossy(),
        "bind_addrs": binds,
        "config": {
            "catalog_url": cfg.catalog_url,
            "per_ayah_base_url": cfg.per_ayah_base_url,
            "max_retries": cfg.max_retries,
            "probe_attempts": cfg.probe_attempts,
            "allow_overwrite_files": cfg.allow_overwrite_files,
        }
    }))
}
