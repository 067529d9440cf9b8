use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::base_system::context::Config;
use crate::download::models::ProgressSnapshot;
use crate::third_party::http::AudioTransport;

const LOG_BUFFER_LINES: usize = 500;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) bind_addrs: Arc<Vec<SocketAddr>>,
    pub(crate) config: Arc<Config>,
    pub(crate) library_root: Arc<PathBuf>,
    pub(crate) jobs: Arc<JobStore>,
    pub(crate) transport: Arc<dyn AudioTransport>,
    pub(crate) logs: Arc<LogBuffer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum JobState {
    Queued,
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(crate) enum JobKind {
    Full,
    Range { start_ayah: u32, end_ayah: u32 },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct JobInfo {
    pub(crate) id: u64,
    pub(crate) kind: JobKind,
    pub(crate) reciter_id: String,
    pub(crate) reciter_name: String,
    pub(crate) chapter_id: u32,
    pub(crate) chapter_name: String,
    pub(crate) state: JobState,
    pub(crate) progress: Option<ProgressSnapshot>,
    pub(crate) percent: u32,
    pub(crate) error_kind: Option<&'static str>,
    pub(crate) message: Option<String>,
    /// 相对 library_root 的文件名，供 `/download/*path` 使用
    pub(crate) file: Option<String>,
    pub(crate) created_ms: u64,
    pub(crate) updated_ms: u64,
}

#[derive(Debug, Clone)]
pub(crate) struct NewJob {
    pub(crate) kind: JobKind,
    pub(crate) reciter_id: String,
    pub(crate) reciter_name: String,
    pub(crate) chapter_id: u32,
    pub(crate) chapter_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobRejected {
    /// 同一时间只允许一个分段下载
    RangeBusy(u64),
    Running,
    NotFound,
}

#[derive(Debug, Default)]
pub(crate) struct JobStore {
    next_id: AtomicU64,
    inner: Mutex<HashMap<u64, JobInfo>>,
}

impl JobStore {
    pub(crate) fn create(&self, job: NewJob) -> Result<u64, JobRejected> {
        let mut g = self.lock();
        if matches!(job.kind, JobKind::Range { .. })
            && let Some(active) = g
                .values()
                .find(|j| matches!(j.kind, JobKind::Range { .. }) && is_active(j))
        {
            return Err(JobRejected::RangeBusy(active.id));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let now = now_ms();
        g.insert(
            id,
            JobInfo {
                id,
                kind: job.kind,
                reciter_id: job.reciter_id,
                reciter_name: job.reciter_name,
                chapter_id: job.chapter_id,
                chapter_name: job.chapter_name,
                state: JobState::Queued,
                progress: None,
                percent: 0,
                error_kind: None,
                message: None,
                file: None,
                created_ms: now,
                updated_ms: now,
            },
        );
        Ok(id)
    }

    pub(crate) fn list(&self) -> Vec<JobInfo> {
        let g = self.lock();
        let mut v: Vec<JobInfo> = g.values().cloned().collect();
        v.sort_by(|a, b| {
            b.updated_ms
                .cmp(&a.updated_ms)
                .then_with(|| b.id.cmp(&a.id))
        });
        v
    }

    pub(crate) fn get(&self, id: u64) -> Option<JobInfo> {
        self.lock().get(&id).cloned()
    }

    /// 删除已结束的任务；运行中的任务无法取消。
    pub(crate) fn remove(&self, id: u64) -> Result<(), JobRejected> {
        let mut g = self.lock();
        let Some(job) = g.get(&id) else {
            return Err(JobRejected::NotFound);
        };
        if is_active(job) {
            return Err(JobRejected::Running);
        }
        g.remove(&id);
        Ok(())
    }

    pub(crate) fn set_running(&self, id: u64) {
        self.update(id, |j| {
            j.state = JobState::Running;
            j.message = None;
        });
    }

    pub(crate) fn set_progress(&self, id: u64, snap: ProgressSnapshot) {
        self.update(id, |j| {
            j.percent = snap.percent();
            j.progress = Some(snap);
        });
    }

    pub(crate) fn set_done(&self, id: u64, file: String) {
        self.update(id, |j| {
            j.state = JobState::Done;
            j.percent = 100;
            j.message = None;
            j.file = Some(file);
        });
    }

    pub(crate) fn set_failed(&self, id: u64, kind: &'static str, msg: String) {
        self.update(id, |j| {
            j.state = JobState::Failed;
            j.error_kind = Some(kind);
            j.message = Some(msg);
        });
    }

    fn update<F: FnOnce(&mut JobInfo)>(&self, id: u64, f: F) {
        let mut g = self.lock();
        let Some(j) = g.get_mut(&id) else {
            return;
        };
        f(j);
        j.updated_ms = now_ms();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, JobInfo>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn is_active(job: &JobInfo) -> bool {
    matches!(job.state, JobState::Queued | JobState::Running)
}

/// 广播日志的环形缓冲；每次读取时把通道里的新行搬进来。
pub(crate) struct LogBuffer {
    rx: Option<crossbeam_channel::Receiver<String>>,
    lines: Mutex<VecDeque<String>>,
}

impl LogBuffer {
    pub(crate) fn new(rx: Option<crossbeam_channel::Receiver<String>>) -> Self {
        Self {
            rx,
            lines: Mutex::new(VecDeque::with_capacity(LOG_BUFFER_LINES)),
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<String> {
        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(rx) = self.rx.as_ref() {
            for line in rx.try_iter() {
                if lines.len() == LOG_BUFFER_LINES {
                    lines.pop_front();
                }
                lines.push_back(line);
            }
        }
        lines.iter().cloned().collect()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
