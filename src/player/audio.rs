use rodio::Source;
use std::sync::Arc;
use std::time::Duration;

use super::circular_buffer::SampleRing;
use super::clock::MasterClock;

/// Samples are counted in batches before advancing the clock.
const CLOCK_BATCH: u64 = 256;

/// Endless rodio source fed from the decoder's sample ring.
///
/// Plays silence on underrun and advances the [`MasterClock`] by what it
/// actually hands to the output device.
pub struct ClockedSource {
    ring: Arc<SampleRing<f32>>,
    clock: MasterClock,
    pending: u64,
}

impl ClockedSource {
    pub fn new(ring: Arc<SampleRing<f32>>, clock: MasterClock) -> Self {
        Self {
            ring,
            clock,
            pending: 0,
        }
    }
}

impl Iterator for ClockedSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.clock.take_clear_request() {
            self.ring.clear();
            self.pending = 0;
            return Some(0.0);
        }

        match self.ring.try_pop() {
            Some(sample) => {
                self.pending += 1;
                if self.pending == CLOCK_BATCH {
                    self.clock.advance_samples(CLOCK_BATCH);
                    self.pending = 0;
                }
                Some(sample)
            }
            None => Some(0.0),
        }
    }
}

impl Source for ClockedSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        self.clock.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underrun_plays_silence() {
        let ring = SampleRing::new(16);
        let mut source = ClockedSource::new(ring, MasterClock::new(48_000, 2));
        assert_eq!(source.next(), Some(0.0));
        assert_eq!(source.next(), Some(0.0));
    }

    #[test]
    fn consumed_samples_move_the_clock() {
        let ring = SampleRing::new(100_000);
        let clock = MasterClock::new(48_000, 2);
        clock.resume();
        ring.extend(std::iter::repeat(0.5).take(9_600));

        let mut source = ClockedSource::new(ring.clone(), clock.clone());
        let played: Vec<f32> = source.by_ref().take(9_600).collect();

        assert!(played.iter().all(|&s| s == 0.5));
        assert!(ring.is_empty());
        // 9_600 samples is 37 full batches; the remainder is still pending
        assert_eq!(clock.position_ms(), (37 * 256 * 1000 / 96_000) as i64);
    }

    #[test]
    fn seek_drops_buffered_samples() {
        let ring = SampleRing::new(64);
        let clock = MasterClock::new(48_000, 2);
        ring.extend([0.25; 32]);
        clock.set_position_ms(5_000);

        let mut source = ClockedSource::new(ring.clone(), clock);
        assert_eq!(source.next(), Some(0.0));
        assert!(ring.is_empty());
    }
}
