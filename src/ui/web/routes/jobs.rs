use std::path::Path as FsPath;
use std::sync::Arc;
use std::thread;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, info};

use super::ApiError;
use crate::base_system::context::Config;
use crate::catalog::chapters::chapter;
use crate::catalog::reciters;
use crate::download::assembler::RangeAssembler;
use crate::download::full_chapter;
use crate::download::models::{DownloadOutcome, RangeRequest};
use crate::download::progress::ProgressReporter;
use crate::download::range_support::supports_range;
use crate::download::save;
use crate::error::DownloadError;
use crate::prewarm_state;
use crate::third_party::http::AudioTransport;
use crate::ui::web::state::{AppState, JobKind, JobRejected, JobState, JobStore, NewJob};

#[derive(Debug, Deserialize)]
pub(crate) struct CreateJobReq {
    pub(crate) reciter_id: String,
    pub(crate) chapter_id: u32,
    #[serde(default)]
    pub(crate) start_ayah: Option<u32>,
    #[serde(default)]
    pub(crate) end_ayah: Option<u32>,
}

pub(crate) async fn list_jobs(State(state): State<AppState>) -> Json<Value> {
    let items = state.jobs.list();
    Json(json!({ "items": items }))
}

pub(crate) async fn create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobReq>,
) -> Result<Json<Value>, ApiError> {
    let catalog = prewarm_state::catalog();
    let reciter = reciters::find(&catalog, req.reciter_id.trim())
        .cloned()
        .ok_or_else(|| DownloadError::UnknownReciter(req.reciter_id.clone()))?;
    let chapter = *chapter(req.chapter_id).ok_or(DownloadError::UnknownChapter(req.chapter_id))?;

    let kind = match (req.start_ayah, req.end_ayah) {
        (None, None) => JobKind::Full,
        (start, end) => {
            if !supports_range(&reciter) {
                return Err(DownloadError::NoSourceMapping {
                    reciter: reciter.name.clone(),
                }
                .into());
            }
            let start_ayah = start.unwrap_or(1);
            let end_ayah = end.unwrap_or(chapter.ayah_count);
            RangeRequest::new(reciter.clone(), chapter, start_ayah, end_ayah).validate()?;
            JobKind::Range {
                start_ayah,
                end_ayah,
            }
        }
    };

    let id = state
        .jobs
        .create(NewJob {
            kind,
            reciter_id: reciter.id.clone(),
            reciter_name: reciter.name.clone(),
            chapter_id: chapter.id,
            chapter_name: chapter.english_name.to_string(),
        })
        .map_err(|rejected| match rejected {
            JobRejected::RangeBusy(active) => ApiError::new(
                StatusCode::CONFLICT,
                "assembler_busy",
                format!("range job {active} is still running"),
            ),
            _ => ApiError::internal("job store rejected the job"),
        })?;

    let jobs = state.jobs.clone();
    let transport = state.transport.clone();
    let cfg = state.config.as_ref().clone();
    let library_root = state.library_root.as_ref().clone();

    thread::Builder::new()
        .name(format!("job-{id}"))
        .spawn(move || {
            jobs.set_running(id);
            let outcome = match kind {
                JobKind::Full => {
                    full_chapter::download_outcome(transport.as_ref(), &reciter, &chapter)
                }
                JobKind::Range {
                    start_ayah,
                    end_ayah,
                } => {
                    let request = RangeRequest::new(reciter, chapter, start_ayah, end_ayah);
                    run_range(&jobs, id, transport, &cfg, &request)
                }
            };
            finish_job(&jobs, id, outcome, &cfg, &library_root);
        })
        .map_err(|e| {
            state.jobs.set_failed(id, "internal", e.to_string());
            ApiError::internal(format!("spawn job thread failed: {e}"))
        })?;

    Ok(Json(json!({ "id": id, "state": JobState::Queued })))
}

fn run_range(
    jobs: &Arc<JobStore>,
    id: u64,
    transport: Arc<dyn AudioTransport>,
    cfg: &Config,
    request: &RangeRequest,
) -> DownloadOutcome {
    let mut assembler = RangeAssembler::from_config(transport, cfg);
    let jobs_cb = jobs.clone();
    let mut reporter =
        ProgressReporter::new(false, Some(Box::new(move |snap| jobs_cb.set_progress(id, snap))));
    assembler.run(request, |event| reporter.on_event(event))
}

fn finish_job(
    jobs: &JobStore,
    id: u64,
    outcome: DownloadOutcome,
    cfg: &Config,
    library_root: &FsPath,
) {
    match outcome {
        DownloadOutcome::Success {
            blob,
            suggested_filename,
        } => match save::save(
            &blob,
            &suggested_filename,
            library_root,
            cfg.allow_overwrite_files,
        ) {
            Ok(path) => {
                let file = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or(suggested_filename);
                info!(target: "web", "任务 {id} 完成: {file}");
                jobs.set_done(id, file);
            }
            Err(err) => {
                error!(target: "web", "任务 {id} 保存失败: {err}");
                jobs.set_failed(id, err.kind(), err.user_message());
            }
        },
        DownloadOutcome::Failure { reason } => {
            jobs.set_failed(id, reason.kind(), reason.user_message());
        }
    }
}

pub(crate) async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, ApiError> {
    match state.jobs.remove(id) {
        Ok(()) => Ok(Json(json!({"ok": true}))),
        Err(JobRejected::NotFound) => Err(ApiError::new(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("job {id} not found"),
        )),
        Err(_) => Err(ApiError::new(
            StatusCode::CONFLICT,
            "running",
            format!("job {id} is still running"),
        )),
    }
}
