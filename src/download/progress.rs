//! 进度上报：把状态机事件折叠成快照，并可选地驱动终端进度条。

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::assembler::RangeEvent;
use super::models::{ProgressSnapshot, RangeState};

pub struct ProgressReporter {
    snapshot: ProgressSnapshot,
    cb: Option<Box<dyn FnMut(ProgressSnapshot) + Send>>,
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub fn new(
        show_bar: bool,
        cb: Option<Box<dyn FnMut(ProgressSnapshot) + Send>>,
    ) -> Self {
        let bar = show_bar.then(|| {
            let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
            let style = ProgressStyle::with_template(
                "{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
            bar.set_style(style);
            bar.set_prefix("逐节下载");
            bar
        });
        Self {
            snapshot: ProgressSnapshot::idle(),
            cb,
            bar,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.snapshot
    }

    pub fn on_event(&mut self, event: RangeEvent) {
        match event {
            RangeEvent::StateChanged(state) => {
                self.snapshot.state = state;
                if let Some(bar) = self.bar.as_ref() {
                    bar.set_message(state.label());
                }
                if matches!(state, RangeState::Done | RangeState::Error) {
                    self.finish_bar();
                }
            }
            RangeEvent::Progress { completed, total } => {
                self.snapshot.completed = completed;
                self.snapshot.total = total;
                if let Some(bar) = self.bar.as_ref() {
                    bar.set_length(u64::from(total));
                    bar.set_position(u64::from(completed));
                }
            }
        }
        self.emit();
    }

    fn emit(&mut self) {
        if let Some(cb) = self.cb.as_mut() {
            cb(self.snapshot);
        }
    }

    fn finish_bar(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.finish_bar();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn events_fold_into_snapshot_and_callback() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut reporter = ProgressReporter::new(
            false,
            Some(Box::new(move |s| sink.lock().unwrap().push(s))),
        );

        reporter.on_event(RangeEvent::StateChanged(RangeState::Downloading));
        reporter.on_event(RangeEvent::Progress {
            completed: 2,
            total: 4,
        });

        let snap = reporter.snapshot();
        assert_eq!(snap.state, RangeState::Downloading);
        assert_eq!(snap.percent(), 50);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
