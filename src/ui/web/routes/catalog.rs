use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};

use super::ApiError;
use crate::catalog::chapters::{self, chapter};
use crate::catalog::{reciters, text};
use crate::download::full_chapter::chapter_url;
use crate::download::range_support::supports_range;
use crate::error::DownloadError;
use crate::prewarm_state;
use crate::ui::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReciterQuery {
    #[serde(default)]
    pub(crate) q: String,
    #[serde(default)]
    pub(crate) range_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChapterQuery {
    #[serde(default)]
    pub(crate) q: String,
}

pub(crate) async fn list_reciters(Query(q): Query<ReciterQuery>) -> Json<Value> {
    let catalog = prewarm_state::catalog();
    let items: Vec<Value> = reciters::filter_reciters(&catalog, &q.q, q.range_only)
        .into_iter()
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.name,
                "letter": r.letter,
                "narration": r.narration_name,
                "total_chapters": r.total_chapter_count,
                "supports_range": supports_range(r),
            })
        })
        .collect();

    Json(json!({
        "loading": prewarm_state::is_prewarm_in_progress(),
        "total": catalog.len(),
        "items": items,
    }))
}

pub(crate) async fn list_chapters(
    Path(id): Path<String>,
    Query(q): Query<ChapterQuery>,
) -> Result<Json<Value>, ApiError> {
    let catalog = prewarm_state::catalog();
    let reciter =
        reciters::find(&catalog, &id).ok_or_else(|| DownloadError::UnknownReciter(id.clone()))?;

    let available = chapters::available_chapters(reciter);
    let items: Vec<Value> = chapters::filter_chapters(&available, &q.q)
        .into_iter()
        .map(|c| {
            json!({
                "id": c.id,
                "arabic_name": c.arabic_name,
                "english_name": c.english_name,
                "ayah_count": c.ayah_count,
                "revelation": c.revelation,
                "stream_url": chapter_url(reciter, c.id),
            })
        })
        .collect();

    Ok(Json(json!({
        "reciter": {
            "id": reciter.id,
            "name": reciter.name,
            "narration": reciter.narration_name,
            "supports_range": supports_range(reciter),
        },
        "items": items,
    })))
}

pub(crate) async fn chapter_text(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Value>, ApiError> {
    if chapter(id).is_none() {
        return Err(DownloadError::UnknownChapter(id).into());
    }

    let transport = state.transport.clone();
    let base = state.config.chapter_text_url.clone();
    let body = tokio::task::spawn_blocking(move || text::fetch(transport.as_ref(), &base, id))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| DownloadError::network(format!("chapter {id} text unavailable")))?;

    let ayahs: Vec<Value> = body
        .display_ayahs()
        .into_iter()
        .map(|(n, t)| json!({"number": n, "text": t}))
        .collect();

    Ok(Json(json!({
        "number": body.number,
        "name": body.name,
        "english_name": body.english_name,
        "english_name_translation": body.english_name_translation,
        "revelation_type": body.revelation_type,
        "number_of_ayahs": body.number_of_ayahs,
        "ayahs": ayahs,
    })))
}
