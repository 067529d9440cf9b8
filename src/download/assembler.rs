//! 分段下载状态机：校验 → 探测 → 逐节顺序下载 → 拼接。
//!
//! ```text
//! Idle → Verifying → Downloading → Processing → Done
//!            └──────────┴──→ Error
//! ```
//!
//! 一次失败即终止本次尝试，已下载的数据全部丢弃；调用方 `reset()` 后从头再来。

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::models::{
    AudioBlob, AyahSegment, DownloadOutcome, RangeRequest, RangeState, SegmentKey,
};
use super::range_support::resolve_source_key;
use crate::base_system::context::Config;
use crate::base_system::retry::RetryPolicy;
use crate::error::DownloadError;
use crate::third_party::every_ayah::{AyahFetcher, AyahProbe};
use crate::third_party::http::AudioTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvent {
    StateChanged(RangeState),
    Progress { completed: u32, total: u32 },
}

pub struct RangeAssembler {
    probe: AyahProbe,
    fetcher: AyahFetcher,
    state: RangeState,
}

impl RangeAssembler {
    pub fn new(
        transport: Arc<dyn AudioTransport>,
        per_ayah_base: &str,
        probe_policy: RetryPolicy,
        fetch_policy: RetryPolicy,
    ) -> Self {
        Self {
            probe: AyahProbe::new(transport.clone(), per_ayah_base, probe_policy),
            fetcher: AyahFetcher::new(transport, per_ayah_base, fetch_policy),
            state: RangeState::Idle,
        }
    }

    pub fn from_config(transport: Arc<dyn AudioTransport>, config: &Config) -> Self {
        Self::new(
            transport,
            &config.per_ayah_base_url,
            config.probe_policy(),
            config.fetch_policy(),
        )
    }

    pub fn state(&self) -> RangeState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = RangeState::Idle;
    }

    /// 执行一次分段下载。所有失败都以 `DownloadOutcome::Failure` 返回。
    pub fn run<F>(&mut self, request: &RangeRequest, mut observer: F) -> DownloadOutcome
    where
        F: FnMut(RangeEvent),
    {
        if self.state != RangeState::Idle {
            return DownloadOutcome::Failure {
                reason: DownloadError::AssemblerBusy {
                    state: self.state.label().to_string(),
                },
            };
        }
        // 范围非法时不离开 Idle
        if let Err(reason) = request.validate() {
            return DownloadOutcome::Failure { reason };
        }

        match self.assemble(request, &mut observer) {
            Ok(blob) => {
                self.transition(RangeState::Done, &mut observer);
                info!(
                    target: "range",
                    "章节 {} 第 {}-{} 节完成，共 {} 字节",
                    request.chapter.id,
                    request.start_ayah,
                    request.end_ayah,
                    blob.bytes.len()
                );
                DownloadOutcome::Success {
                    blob,
                    suggested_filename: request.suggested_filename(),
                }
            }
            Err(reason) => {
                warn!(target: "range", "分段下载失败: {reason}");
                self.transition(RangeState::Error, &mut observer);
                DownloadOutcome::Failure { reason }
            }
        }
    }

    fn assemble<F>(
        &mut self,
        request: &RangeRequest,
        observer: &mut F,
    ) -> Result<AudioBlob, DownloadError>
    where
        F: FnMut(RangeEvent),
    {
        let chapter_id = request.chapter.id;

        self.transition(RangeState::Verifying, observer);
        let source_key = resolve_source_key(&request.reciter.name).ok_or_else(|| {
            DownloadError::NoSourceMapping {
                reciter: request.reciter.name.clone(),
            }
        })?;
        // 只抽查起始节
        if !self.probe.exists(source_key, chapter_id, request.start_ayah) {
            return Err(DownloadError::SourceUnavailable {
                source_key: source_key.to_string(),
                chapter_id,
                ayah: request.start_ayah,
            });
        }
        debug!(target: "range", "源 {source_key} 可用");

        self.transition(RangeState::Downloading, observer);
        let total = request.len();
        observer(RangeEvent::Progress {
            completed: 0,
            total,
        });
        let mut segments = Vec::with_capacity(total as usize);
        for ayah in request.start_ayah..=request.end_ayah {
            let bytes = self.fetcher.fetch(source_key, chapter_id, ayah)?;
            segments.push(AyahSegment {
                key: SegmentKey { chapter_id, ayah },
                bytes,
            });
            observer(RangeEvent::Progress {
                completed: segments.len() as u32,
                total,
            });
        }

        self.transition(RangeState::Processing, observer);
        Ok(AudioBlob::concat(segments))
    }

    fn transition<F>(&mut self, next: RangeState, observer: &mut F)
    where
        F: FnMut(RangeEvent),
    {
        debug!(target: "range", "{} -> {}", self.state.label(), next.label());
        self.state = next;
        observer(RangeEvent::StateChanged(next));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::catalog::chapters::chapter;
    use crate::catalog::reciters::ReciterVariant;
    use crate::third_party::every_ayah::ayah_url;
    use crate::third_party::fake::{FakeTransport, Method, Reply};

    const BASE: &str = "https://ayah.test/data";
    const KEY: &str = "Alafasy_128kbps";

    fn reciter(name: &str) -> ReciterVariant {
        ReciterVariant {
            id: "123-1".into(),
            name: name.into(),
            letter: "م".into(),
            audio_base_url: "https://server/afs/".into(),
            available_chapter_ids: vec![1, 2],
            total_chapter_count: 2,
            narration_name: "حفص عن عاصم".into(),
        }
    }

    fn request(start: u32, end: u32) -> RangeRequest {
        RangeRequest::new(
            reciter("مشاري العفاسي"),
            *chapter(1).unwrap(),
            start,
            end,
        )
    }

    fn assembler(fake: &Arc<FakeTransport>) -> RangeAssembler {
        RangeAssembler::new(
            fake.clone(),
            BASE,
            RetryPolicy::single(),
            RetryPolicy::linear(3, Duration::ZERO),
        )
    }

    fn serve(fake: &FakeTransport, ayahs: std::ops::RangeInclusive<u32>) {
        for n in ayahs {
            let url = ayah_url(BASE, KEY, 1, n);
            fake.on_head(&url, Reply::Status(200));
            fake.on_get(&url, Reply::Body(200, vec![n as u8; 3]));
        }
    }

    #[test]
    fn successful_range_walks_every_state() {
        let fake = Arc::new(FakeTransport::new());
        serve(&fake, 1..=7);
        let mut asm = assembler(&fake);

        let mut events = Vec::new();
        let outcome = asm.run(&request(2, 4), |e| events.push(e));

        let DownloadOutcome::Success {
            blob,
            suggested_filename,
        } = outcome
        else {
            panic!("expected success");
        };
        assert_eq!(blob.bytes, vec![2, 2, 2, 3, 3, 3, 4, 4, 4]);
        assert_eq!(
            blob.segments.iter().map(|k| k.ayah).collect::<Vec<_>>(),
            vec![2, 3, 4]
        );
        assert_eq!(suggested_filename, "Chapter_Al-Faatiha_2-4_مشاري العفاسي.mp3");
        assert_eq!(asm.state(), RangeState::Done);

        let states: Vec<RangeState> = events
            .iter()
            .filter_map(|e| match e {
                RangeEvent::StateChanged(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                RangeState::Verifying,
                RangeState::Downloading,
                RangeState::Processing,
                RangeState::Done
            ]
        );
        assert!(events.contains(&RangeEvent::Progress {
            completed: 3,
            total: 3
        }));
    }

    #[test]
    fn probe_checks_only_the_start_ayah() {
        let fake = Arc::new(FakeTransport::new());
        serve(&fake, 1..=7);
        let mut asm = assembler(&fake);
        assert!(asm.run(&request(1, 7), |_| {}).is_success());

        let heads: Vec<_> = fake
            .requests()
            .into_iter()
            .filter(|(m, _)| *m == Method::Head)
            .collect();
        assert_eq!(heads, vec![(Method::Head, ayah_url(BASE, KEY, 1, 1))]);
    }

    #[test]
    fn invalid_range_keeps_idle() {
        let fake = Arc::new(FakeTransport::new());
        let mut asm = assembler(&fake);
        for (s, e) in [(0, 3), (5, 3), (1, 8)] {
            let outcome = asm.run(&request(s, e), |_| {});
            assert!(matches!(
                outcome,
                DownloadOutcome::Failure {
                    reason: DownloadError::InvalidRange { .. }
                }
            ));
            assert_eq!(asm.state(), RangeState::Idle);
        }
        assert!(fake.requests().is_empty());
    }

    #[test]
    fn unknown_reciter_has_no_mapping() {
        let fake = Arc::new(FakeTransport::new());
        let mut asm = assembler(&fake);
        let req = RangeRequest::new(reciter("قارئ مجهول"), *chapter(1).unwrap(), 1, 2);
        let outcome = asm.run(&req, |_| {});
        assert!(matches!(
            outcome,
            DownloadOutcome::Failure {
                reason: DownloadError::NoSourceMapping { .. }
            }
        ));
        assert_eq!(asm.state(), RangeState::Error);
    }

    #[test]
    fn missing_start_ayah_means_source_unavailable() {
        let fake = Arc::new(FakeTransport::new());
        let mut asm = assembler(&fake);
        let outcome = asm.run(&request(1, 3), |_| {});
        assert!(matches!(
            outcome,
            DownloadOutcome::Failure {
                reason: DownloadError::SourceUnavailable { ayah: 1, .. }
            }
        ));
        assert!(
            !fake
                .requests()
                .iter()
                .any(|(m, _)| *m == Method::Get)
        );
    }

    #[test]
    fn not_found_aborts_without_retry_or_later_requests() {
        let fake = Arc::new(FakeTransport::new());
        serve(&fake, 1..=2);
        fake.on_get(&ayah_url(BASE, KEY, 1, 3), Reply::Status(404));
        serve(&fake, 4..=5);
        let mut asm = assembler(&fake);

        let outcome = asm.run(&request(1, 5), |_| {});
        assert!(matches!(
            outcome,
            DownloadOutcome::Failure {
                reason: DownloadError::AyahNotFound { ayah: 3, .. }
            }
        ));
        assert_eq!(asm.state(), RangeState::Error);
        assert_eq!(fake.count(Method::Get, &ayah_url(BASE, KEY, 1, 3)), 1);
        assert_eq!(fake.count(Method::Get, &ayah_url(BASE, KEY, 1, 4)), 0);
        assert_eq!(fake.count(Method::Get, &ayah_url(BASE, KEY, 1, 5)), 0);
    }

    #[test]
    fn transient_failures_exhaust_to_fetch_failed() {
        let fake = Arc::new(FakeTransport::new());
        serve(&fake, 1..=1);
        let url = ayah_url(BASE, KEY, 1, 2);
        fake.on_get(&url, Reply::Fail("connection reset".into()));
        let mut asm = assembler(&fake);

        let outcome = asm.run(&request(1, 2), |_| {});
        let DownloadOutcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(
            reason.to_string(),
            "Ayah 2 fetch failed: request failed: connection reset"
        );
        assert_eq!(fake.count(Method::Get, &url), 3);
    }

    #[test]
    fn busy_until_reset_then_byte_identical_rerun() {
        let fake = Arc::new(FakeTransport::new());
        serve(&fake, 1..=7);
        let mut asm = assembler(&fake);

        let DownloadOutcome::Success { blob: first, .. } = asm.run(&request(3, 6), |_| {}) else {
            panic!("expected success");
        };

        let busy = asm.run(&request(3, 6), |_| {});
        assert!(matches!(
            busy,
            DownloadOutcome::Failure {
                reason: DownloadError::AssemblerBusy { .. }
            }
        ));
        assert_eq!(asm.state(), RangeState::Done);

        asm.reset();
        let DownloadOutcome::Success { blob: second, .. } = asm.run(&request(3, 6), |_| {}) else {
            panic!("expected success");
        };
        assert_eq!(first, second);
    }
}
