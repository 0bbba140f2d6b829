use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Byte-level progress of a single upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub loaded: u64,
    pub total: u64,
    /// Rounded, always within `0..=100`
    pub percentage: u8,
}

impl ProgressEvent {
    pub fn new(loaded: u64, total: u64) -> Self {
        Self {
            loaded,
            total,
            percentage: percentage(loaded, total),
        }
    }
}

/// Callback receiving progress for one upload
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Callback receiving progress for one item of a batch, with its 0-based index
pub type BatchProgressSink = Arc<dyn Fn(usize, ProgressEvent) + Send + Sync>;

/// Rounded percentage, clamped to `0..=100`. An empty transfer counts as done.
pub fn percentage(loaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((loaded as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

struct ReporterState {
    sink: Option<ProgressSink>,
    loaded: AtomicU64,
    finished: AtomicBool,
}

/// Forwards progress to an optional sink for the lifetime of one upload.
///
/// `loaded` never decreases between events, whatever order reports arrive in,
/// and the completion event is delivered at most once. Clones share state.
#[derive(Clone)]
pub struct ProgressReporter {
    state: Arc<ReporterState>,
}

impl ProgressReporter {
    pub fn new(sink: Option<ProgressSink>) -> Self {
        Self {
            state: Arc::new(ReporterState {
                sink,
                loaded: AtomicU64::new(0),
                finished: AtomicBool::new(false),
            }),
        }
    }

    /// Reporter that drops every event
    pub fn silent() -> Self {
        Self::new(None)
    }

    /// Whether anyone is listening
    pub fn is_active(&self) -> bool {
        self.state.sink.is_some()
    }

    /// Highest `loaded` reported so far
    pub fn loaded(&self) -> u64 {
        self.state.loaded.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::Acquire)
    }

    /// Report `loaded` of `total` bytes transferred
    pub fn report(&self, loaded: u64, total: u64) {
        if self.is_finished() {
            return;
        }
        let loaded = if total > 0 { loaded.min(total) } else { loaded };
        let previous = self.state.loaded.fetch_max(loaded, Ordering::AcqRel);
        self.emit(ProgressEvent::new(previous.max(loaded), total));
    }

    /// Report the transfer as complete. Only the first call emits.
    pub fn complete(&self, total: u64) {
        if self.state.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        self.state.loaded.fetch_max(total, Ordering::AcqRel);
        self.emit(ProgressEvent::new(total, total));
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(sink) = &self.state.sink {
            sink(event);
        }
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("active", &self.is_active())
            .field("loaded", &self.loaded())
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Highest estimate a synthesized tick may report: strictly below `total`
fn estimate_ceiling(total: u64) -> u64 {
    (total / 100 * 95).min(total.saturating_sub(1))
}

/// Next synthesized estimate: a random step of up to 10% of `total`, capped below completion
pub(crate) fn next_estimate(current: u64, total: u64) -> u64 {
    let ceiling = estimate_ceiling(total);
    let max_step = (total / 10).max(1);
    let step = rand::thread_rng().gen_range(1..=max_step);
    current.saturating_add(step).min(ceiling)
}

/// Drive `upload` to completion while emitting estimated progress every `period`.
///
/// The ticker runs in the same task as `upload` and stops the moment it
/// settles. Estimates never reach 100%; the caller reports completion once the
/// real outcome is known.
pub async fn simulate_while<F, T>(
    reporter: &ProgressReporter,
    total: u64,
    period: Duration,
    upload: F,
) -> T
where
    F: Future<Output = T>,
{
    if !reporter.is_active() || total == 0 || period.is_zero() {
        return upload.await;
    }

    tokio::pin!(upload);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut estimate = reporter.loaded();

    loop {
        tokio::select! {
            biased;
            outcome = &mut upload => return outcome,
            _ = ticker.tick() => {
                estimate = next_estimate(estimate, total);
                reporter.report(estimate, total);
            }
        }
    }
}
