use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Playback clock driven by audio output.
///
/// The audio source advances it as samples are consumed, so video frames sync
/// to what is actually heard. Files without audio drive it from wall time
/// through [`WallDrive`]. Shared between the UI, decoder and audio threads.
#[derive(Clone)]
pub struct MasterClock {
    inner: Arc<ClockState>,
}

struct ClockState {
    position_us: AtomicU64,
    paused: AtomicBool,
    ended: AtomicBool,
    /// Set on seek so the audio source drops stale samples
    clear_buffer: AtomicBool,
    sample_rate: u32,
    channels: u16,
}

impl MasterClock {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            inner: Arc::new(ClockState {
                position_us: AtomicU64::new(0),
                paused: AtomicBool::new(true),
                ended: AtomicBool::new(false),
                clear_buffer: AtomicBool::new(false),
                sample_rate,
                channels,
            }),
        }
    }

    pub fn position_ms(&self) -> i64 {
        (self.inner.position_us.load(Ordering::Relaxed) / 1000) as i64
    }

    /// Jump to `ms` after a seek. Clears the end-of-stream mark.
    pub fn set_position_ms(&self, ms: i64) {
        let us = ms.max(0) as u64 * 1000;
        self.inner.position_us.store(us, Ordering::Relaxed);
        self.inner.clear_buffer.store(true, Ordering::Relaxed);
        self.inner.ended.store(false, Ordering::Relaxed);
    }

    /// Returns true once after each seek.
    pub fn take_clear_request(&self) -> bool {
        self.inner.clear_buffer.swap(false, Ordering::Relaxed)
    }

    pub fn advance_samples(&self, samples: u64) {
        if self.is_paused() {
            return;
        }
        let per_second = self.inner.sample_rate as f64 * self.inner.channels as f64;
        let delta_us = (samples as f64 * 1_000_000.0 / per_second) as u64;
        self.inner.position_us.fetch_add(delta_us, Ordering::Relaxed);
    }

    pub fn advance_by(&self, elapsed: Duration) {
        if self.is_paused() {
            return;
        }
        let delta_us = elapsed.as_micros().min(u64::MAX as u128) as u64;
        self.inner.position_us.fetch_add(delta_us, Ordering::Relaxed);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.paused.load(Ordering::Relaxed)
    }

    pub fn pause(&self) {
        self.inner.paused.store(true, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.inner.paused.store(false, Ordering::Relaxed);
    }

    /// Stop at `length_ms` and remember that the stream is over.
    pub fn mark_ended(&self, length_ms: i64) {
        self.pause();
        self.inner
            .position_us
            .store(length_ms.max(0) as u64 * 1000, Ordering::Relaxed);
        self.inner.ended.store(true, Ordering::Relaxed);
    }

    pub fn has_ended(&self) -> bool {
        self.inner.ended.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }
}

/// Advances a [`MasterClock`] by the wall time between calls while it runs.
#[derive(Debug, Default)]
pub struct WallDrive {
    last: Option<Instant>,
}

impl WallDrive {
    pub fn drive(&mut self, clock: &MasterClock, now: Instant) {
        if clock.is_paused() {
            self.last = None;
            return;
        }
        if let Some(last) = self.last {
            clock.advance_by(now.saturating_duration_since(last));
        }
        self.last = Some(now);
    }

    /// Forget the last reading, e.g. while a seek is pending.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
