//! 下载相关的数据模型。

use serde::Serialize;

use crate::catalog::chapters::Chapter;
use crate::catalog::reciters::ReciterVariant;
use crate::error::DownloadError;

pub const AUDIO_MIME: &str = "audio/mpeg";

/// 一次分段下载请求，只对一次尝试有效。
#[derive(Debug, Clone)]
pub struct RangeRequest {
    pub reciter: ReciterVariant,
    pub chapter: Chapter,
    pub start_ayah: u32,
    pub end_ayah: u32,
}

impl RangeRequest {
    pub fn new(reciter: ReciterVariant, chapter: Chapter, start_ayah: u32, end_ayah: u32) -> Self {
        Self {
            reciter,
            chapter,
            start_ayah,
            end_ayah,
        }
    }

    /// `1 <= start <= end <= ayah_count`
    pub fn validate(&self) -> Result<(), DownloadError> {
        let ok = self.start_ayah >= 1
            && self.start_ayah <= self.end_ayah
            && self.end_ayah <= self.chapter.ayah_count;
        if ok {
            Ok(())
        } else {
            Err(DownloadError::InvalidRange {
                start: self.start_ayah,
                end: self.end_ayah,
                ayah_count: self.chapter.ayah_count,
            })
        }
    }

    pub fn len(&self) -> u32 {
        self.end_ayah.saturating_sub(self.start_ayah) + 1
    }

    pub fn suggested_filename(&self) -> String {
        format!(
            "Chapter_{}_{}-{}_{}.mp3",
            self.chapter.english_name, self.start_ayah, self.end_ayah, self.reciter.name
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentKey {
    pub chapter_id: u32,
    pub ayah: u32,
}

#[derive(Debug, Clone)]
pub struct AyahSegment {
    pub key: SegmentKey,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub segments: Vec<SegmentKey>,
}

impl AudioBlob {
    /// 按顺序直接拼接，不做任何重编码。
    pub fn concat(segments: Vec<AyahSegment>) -> Self {
        let total = segments.iter().map(|s| s.bytes.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        let mut keys = Vec::with_capacity(segments.len());
        for seg in segments {
            bytes.extend_from_slice(&seg.bytes);
            keys.push(seg.key);
        }
        Self {
            bytes,
            mime: AUDIO_MIME,
            segments: keys,
        }
    }

    pub fn single(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: AUDIO_MIME,
            segments: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum DownloadOutcome {
    Success {
        blob: AudioBlob,
        suggested_filename: String,
    },
    Failure {
        reason: DownloadError,
    },
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

/// 分段下载状态机的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeState {
    Idle,
    Verifying,
    Downloading,
    Processing,
    Done,
    Error,
}

impl RangeState {
    pub fn label(self) -> &'static str {
        match self {
            RangeState::Idle => "idle",
            RangeState::Verifying => "verifying",
            RangeState::Downloading => "downloading",
            RangeState::Processing => "processing",
            RangeState::Done => "done",
            RangeState::Error => "error",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(
            self,
            RangeState::Verifying | RangeState::Downloading | RangeState::Processing
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub state: RangeState,
    pub completed: u32,
    pub total: u32,
}

impl ProgressSnapshot {
    pub fn idle() -> Self {
        Self {
            state: RangeState::Idle,
            completed: 0,
            total: 0,
        }
    }

    pub fn percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        self.completed.saturating_mul(100) / self.total
    }
}
