use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Repeating timer for UI-side polling of engine state.
///
/// The UI loop asks [`PollingClock::due`] every frame; it answers true at most
/// once per interval. A stopped clock never fires again.
#[derive(Debug)]
pub struct PollingClock {
    interval: Duration,
    next_tick: Option<Instant>,
    running: Arc<AtomicBool>,
}

/// Read-only view of whether a [`PollingClock`] still runs.
#[derive(Debug, Clone)]
pub struct ClockWatch {
    running: Arc<AtomicBool>,
}

impl ClockWatch {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl PollingClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_tick: None,
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// A handle that sees this clock stop, from wherever it is held.
    pub fn watch(&self) -> ClockWatch {
        ClockWatch {
            running: Arc::clone(&self.running),
        }
    }

    /// Whether a tick fires at `now`. Firing schedules the next one.
    pub fn due(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.next_tick {
            Some(next) if now < next => false,
            _ => {
                self.next_tick = Some(now + self.interval);
                true
            }
        }
    }

    /// Time left until the next tick, for scheduling a repaint.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_tick
            .map(|next| next.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

/// Format a millisecond position as `MM:SS`, or `HH:MM:SS` from one hour up.
///
/// Sub-second parts are truncated.
pub fn format_time(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_interval() {
        let start = Instant::now();
        let mut clock = PollingClock::new(Duration::from_millis(250));

        assert!(clock.due(start));
        assert!(!clock.due(start + Duration::from_millis(100)));
        assert!(!clock.due(start + Duration::from_millis(249)));
        assert!(clock.due(start + Duration::from_millis(250)));
        assert!(!clock.due(start + Duration::from_millis(300)));
    }

    #[test]
    fn stopped_clock_never_fires() {
        let start = Instant::now();
        let mut clock = PollingClock::new(Duration::from_millis(250));
        clock.stop();

        assert!(!clock.is_running());
        assert!(!clock.due(start));
        assert!(!clock.due(start + Duration::from_secs(10)));
    }

    #[test]
    fn watch_sees_the_clock_stop() {
        let mut clock = PollingClock::new(Duration::from_millis(250));
        let watch = clock.watch();
        assert!(watch.is_running());

        clock.stop();
        assert!(!watch.is_running());
    }

    #[test]
    fn reports_time_until_next_tick() {
        let start = Instant::now();
        let mut clock = PollingClock::new(Duration::from_millis(250));
        assert_eq!(clock.until_next(start), Duration::ZERO);

        clock.due(start);
        assert_eq!(
            clock.until_next(start + Duration::from_millis(50)),
            Duration::from_millis(200)
        );
        assert_eq!(
            clock.until_next(start + Duration::from_secs(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn short_times_use_minutes_and_seconds() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(999), "00:00");
        assert_eq!(format_time(90_000), "01:30");
        assert_eq!(format_time(3_599_999), "59:59");
    }

    #[test]
    fn an_hour_or_more_adds_padded_hours() {
        assert_eq!(format_time(3_600_000), "01:00:00");
        assert_eq!(format_time(3_661_500), "01:01:01");
        assert_eq!(format_time(36_000_000 + 5_000), "10:00:05");
        assert_eq!(format_time(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn truncates_rather_than_rounds() {
        assert_eq!(format_time(59_999), "00:59");
        assert_eq!(format_time(3_600_999), "01:00:00");
    }

    #[test]
    fn negative_positions_render_as_zero() {
        assert_eq!(format_time(-1), "00:00");
    }

    #[test]
    fn format_switches_exactly_at_one_hour() {
        for ms in (0..3_600_000).step_by(61_237) {
            assert_eq!(format_time(ms).len(), 5, "{ms}");
        }
        for ms in (3_600_000..40_000_000).step_by(1_234_567) {
            assert_eq!(format_time(ms).matches(':').count(), 2, "{ms}");
        }
    }
}
