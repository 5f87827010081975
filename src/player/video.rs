use crossbeam_channel::Receiver;
use std::collections::VecDeque;

use super::decoder::DecodedFrame;

/// Frames later than this behind the clock are dropped (ms)
const DROP_THRESHOLD_MS: i64 = 20;
/// Frames up to this far ahead of the clock are shown early (ms)
const HOLD_THRESHOLD_MS: i64 = 20;
/// After a seek, frames this far before the target are still accepted (ms)
const SEEK_TOLERANCE_MS: i64 = 500;

/// Buffers decoded frames and hands out the one due at the current clock.
pub struct FrameQueue {
    receiver: Receiver<DecodedFrame>,
    buffer: VecDeque<DecodedFrame>,
    current: Option<DecodedFrame>,
    capacity: usize,
}

impl FrameQueue {
    pub fn new(receiver: Receiver<DecodedFrame>, capacity: usize) -> Self {
        Self {
            receiver,
            buffer: VecDeque::with_capacity(capacity),
            current: None,
            capacity,
        }
    }

    fn receive(&mut self) {
        while self.buffer.len() < self.capacity {
            match self.receiver.try_recv() {
                Ok(frame) => self.buffer.push_back(frame),
                Err(_) => break,
            }
        }
    }

    /// Promote the frame due at `clock_ms`. Returns it only when it changed.
    pub fn advance(&mut self, clock_ms: i64) -> Option<&DecodedFrame> {
        self.receive();

        while self
            .buffer
            .front()
            .is_some_and(|frame| frame.pts_ms < clock_ms - DROP_THRESHOLD_MS)
        {
            self.buffer.pop_front();
        }

        if self
            .buffer
            .front()
            .is_some_and(|frame| frame.pts_ms <= clock_ms + HOLD_THRESHOLD_MS)
        {
            self.current = self.buffer.pop_front();
            return self.current.as_ref();
        }
        None
    }

    /// First frame at or near `target_ms` after a seek, once one arrives.
    pub fn first_after_seek(&mut self, target_ms: i64) -> Option<&DecodedFrame> {
        self.receive();

        while self
            .buffer
            .front()
            .is_some_and(|frame| frame.pts_ms < target_ms - SEEK_TOLERANCE_MS)
        {
            self.buffer.pop_front();
        }

        let frame = self.buffer.pop_front()?;
        self.current = Some(frame);
        self.current.as_ref()
    }

    /// Forget every buffered frame, including those still in the channel.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.current = None;
        while self.receiver.try_recv().is_ok() {}
    }
}
