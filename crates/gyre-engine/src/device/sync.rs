//! Frame-pacing primitives.
//!
//! wgpu reports GPU progress through queue callbacks rather than fences, so
//! the in-flight bound is a counter released from
//! [`wgpu::Queue::on_submitted_work_done`] completion tokens.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

const POISONED: &str = "inflight counter poisoned";

/// Interval between pump invocations while blocked on a full gate.
const PUMP_INTERVAL: Duration = Duration::from_millis(1);

/// Soft cap on how long `acquire` waits for a free slot before proceeding.
///
/// Uniform uploads are queue-ordered, so overrunning the bound cannot corrupt
/// a slot the GPU still reads; only the latency bound suffers.
const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(50);

/// Upper bound on how long teardown waits for outstanding frames.
///
/// A device that died without firing its completion callbacks must not hang
/// teardown forever; past this point the remaining frames are abandoned.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Counting gate bounding the number of submitted-but-incomplete frames.
///
/// `acquire` reserves a slot before the CPU touches per-frame GPU data and
/// blocks while the bound is reached; a [`CompletionToken`] handed to the
/// queue releases the slot once the GPU is done with the frame.
pub(crate) struct InflightGate {
    inner: Arc<GateInner>,
    limit: usize,
}

struct GateInner {
    count: Mutex<usize>,
    completed: Condvar,
}

/// Release half of one reserved gate slot.
///
/// Intended to be moved into the closure registered with
/// [`wgpu::Queue::on_submitted_work_done`].
pub(crate) struct CompletionToken {
    inner: Arc<GateInner>,
}

impl CompletionToken {
    /// Frees the slot and wakes any thread parked in `acquire` or `drain`.
    pub(crate) fn complete(self) {
        let mut count = self.inner.count.lock().expect(POISONED);
        *count = count.saturating_sub(1);
        self.inner.completed.notify_all();
    }
}

impl InflightGate {
    /// Creates a gate admitting at most `limit` frames in flight (min 1).
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(GateInner {
                count: Mutex::new(0),
                completed: Condvar::new(),
            }),
            limit: limit.max(1),
        }
    }

    /// Number of frames currently in flight.
    pub(crate) fn in_flight(&self) -> usize {
        *self.inner.count.lock().expect(POISONED)
    }

    /// Reserves a slot, blocking while the bound is reached.
    ///
    /// `pump` runs between waits; callers pass a hook that drives the device
    /// so completion callbacks can fire while this thread is parked.
    ///
    /// Returns `false` when the wait hit [`ACQUIRE_TIMEOUT`] and the slot was
    /// reserved past the bound.
    pub(crate) fn acquire(&self, mut pump: impl FnMut()) -> bool {
        let deadline = Instant::now() + ACQUIRE_TIMEOUT;
        loop {
            let mut count = self.inner.count.lock().expect(POISONED);
            if *count < self.limit {
                *count += 1;
                return true;
            }
            if Instant::now() >= deadline {
                *count += 1;
                return false;
            }
            let (guard, _timed_out) = self
                .inner
                .completed
                .wait_timeout(count, PUMP_INTERVAL)
                .expect(POISONED);
            drop(guard);
            pump();
        }
    }

    /// Returns the release half for one reserved slot.
    pub(crate) fn completion_token(&self) -> CompletionToken {
        CompletionToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Blocks until every reserved slot has been released.
    ///
    /// Called during teardown so per-frame buffers are never destroyed while
    /// the GPU may still read them. Gives up after [`DRAIN_TIMEOUT`].
    pub(crate) fn drain(&self, mut pump: impl FnMut()) {
        let deadline = Instant::now() + DRAIN_TIMEOUT;
        loop {
            let count = self.inner.count.lock().expect(POISONED);
            if *count == 0 {
                return;
            }
            if Instant::now() >= deadline {
                log::warn!(
                    "abandoning {} in-flight frame(s): device stopped reporting completion",
                    *count
                );
                return;
            }
            let (guard, _timed_out) = self
                .inner
                .completed
                .wait_timeout(count, PUMP_INTERVAL)
                .expect(POISONED);
            drop(guard);
            pump();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    // ── acquire / release ─────────────────────────────────────────────────

    #[test]
    fn acquire_up_to_limit_never_blocks() {
        let gate = InflightGate::new(2);
        assert!(gate.acquire(|| {}));
        assert!(gate.acquire(|| {}));
        assert_eq!(gate.in_flight(), 2);
    }

    #[test]
    fn completion_token_frees_a_slot() {
        let gate = InflightGate::new(1);
        gate.acquire(|| {});
        gate.completion_token().complete();
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn acquire_blocks_until_completion() {
        let gate = InflightGate::new(1);
        gate.acquire(|| {});
        let token = gate.completion_token();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            token.complete();
        });
        // Parks until the spawned completion fires, then reserves the slot.
        assert!(gate.acquire(|| {}));
        assert_eq!(gate.in_flight(), 1);
        handle.join().expect("completion thread panicked");
    }

    #[test]
    fn acquire_pumps_while_full() {
        let gate = InflightGate::new(1);
        gate.acquire(|| {});
        let token = Mutex::new(Some(gate.completion_token()));
        let mut pumped = false;
        assert!(gate.acquire(|| {
            pumped = true;
            if let Some(t) = token.lock().expect(POISONED).take() {
                t.complete();
            }
        }));
        assert!(pumped);
    }

    #[test]
    fn acquire_overruns_after_timeout() {
        let gate = InflightGate::new(1);
        gate.acquire(|| {});
        // Nothing ever completes; the soft cap lets the caller proceed.
        assert!(!gate.acquire(|| {}));
        assert_eq!(gate.in_flight(), 2);
    }

    #[test]
    fn limit_is_at_least_one() {
        let gate = InflightGate::new(0);
        assert!(gate.acquire(|| {}));
        assert_eq!(gate.in_flight(), 1);
    }

    // ── drain ─────────────────────────────────────────────────────────────

    #[test]
    fn drain_returns_immediately_when_empty() {
        let gate = InflightGate::new(2);
        gate.drain(|| {});
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn drain_waits_for_outstanding_frames() {
        let gate = InflightGate::new(3);
        gate.acquire(|| {});
        gate.acquire(|| {});
        let (first, second) = (gate.completion_token(), gate.completion_token());
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            first.complete();
            thread::sleep(Duration::from_millis(5));
            second.complete();
        });
        gate.drain(|| {});
        assert_eq!(gate.in_flight(), 0);
        handle.join().expect("completion thread panicked");
    }
}
