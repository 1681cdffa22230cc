//! Enter-animation scheduling.
//!
//! Rendering itself is synchronous; the only deferred behavior is the enter
//! transition tail. Each scheduled transition is a cancellable handle stored
//! alongside the chart instance, and every re-render cancels all pending
//! handles before rebuilding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed per-item stagger step.
const STAGGER_STEP: Duration = Duration::from_millis(60);

/// Cap on the total stagger across all items, so charts with many items do
/// not take proportionally longer to finish entering.
const STAGGER_CAP: Duration = Duration::from_millis(800);

/// Per-item enter delays: `per_item = min(fixed_step, cap / item_count)`.
pub fn stagger_delays(item_count: usize) -> Vec<Duration> {
    if item_count == 0 {
        return Vec::new();
    }
    let per_item = STAGGER_STEP.min(STAGGER_CAP / item_count as u32);
    (0..item_count).map(|i| per_item * i as u32).collect()
}

/// Cancellable handle for one scheduled transition.
#[derive(Debug, Clone)]
pub struct AnimationHandle {
    pub delay: Duration,
    cancelled: Arc<AtomicBool>,
}

impl AnimationHandle {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-chart scheduler. Owns the pending handles for the current render pass.
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    handles: Vec<AnimationHandle>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel everything still pending, then schedule fresh staggered
    /// transitions for `item_count` marks.
    pub fn schedule(&mut self, item_count: usize) -> &[AnimationHandle] {
        self.cancel_all();
        self.handles = stagger_delays(item_count)
            .into_iter()
            .map(AnimationHandle::new)
            .collect();
        &self.handles
    }

    pub fn cancel_all(&mut self) {
        for handle in &self.handles {
            handle.cancel();
        }
        self.handles.clear();
    }

    pub fn pending(&self) -> usize {
        self.handles.iter().filter(|h| !h.is_cancelled()).count()
    }
}
