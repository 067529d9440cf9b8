use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::ui::web::state::AppState;

pub(crate) async fn api_logs(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "lines": state.logs.snapshot() }))
}
