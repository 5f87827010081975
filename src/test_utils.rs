//! Test doubles for the engine and the file picker.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::controller::ClockWatch;
use crate::engine::{event_channel, EventQueue, EventSender, Media, MediaEngine};
use crate::ui::picker::FilePicker;

/// Engine commands recorded by [`MockEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(PathBuf),
    Play,
    Pause,
    SetTime(i64),
    SetVolume(i32),
    Dispose,
}

/// In-memory engine that records every command.
///
/// Time only moves when a test sets it; seeks clamp to `[0, length]` like a
/// real engine would. A failed open keeps the current media loaded.
pub struct MockEngine {
    calls: Vec<Call>,
    playing: bool,
    time: i64,
    length: i64,
    next_length: i64,
    volume: i32,
    fail_open: Option<String>,
    disposed: bool,
    length_queries: Cell<usize>,
    clock: Option<ClockWatch>,
    clock_running_at_dispose: Option<bool>,
    sender: EventSender,
    queue: EventQueue,
}

impl MockEngine {
    pub fn new() -> Self {
        let (sender, queue) = event_channel();
        Self {
            calls: Vec::new(),
            playing: false,
            time: 0,
            length: 0,
            next_length: 60_000,
            volume: 100,
            fail_open: None,
            disposed: false,
            length_queries: Cell::new(0),
            clock: None,
            clock_running_at_dispose: None,
            sender,
            queue,
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Length reported for the next opened media
    pub fn set_next_length(&mut self, length: i64) {
        self.next_length = length;
    }

    pub fn fail_next_open(&mut self, message: &str) {
        self.fail_open = Some(message.to_owned());
    }

    /// Jump to the end and stop, as a real engine does at end of stream.
    pub fn finish(&mut self) {
        self.time = self.length;
        self.playing = false;
    }

    pub fn event_sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn disposed(&self) -> bool {
        self.disposed
    }

    pub fn length_queries(&self) -> usize {
        self.length_queries.get()
    }

    /// Note the state of `clock` whenever the engine gets disposed.
    pub fn watch_clock(&mut self, clock: ClockWatch) {
        self.clock = Some(clock);
    }

    pub fn clock_running_at_dispose(&self) -> Option<bool> {
        self.clock_running_at_dispose
    }
}

impl MediaEngine for MockEngine {
    fn open(&mut self, media: &Media) -> anyhow::Result<()> {
        if let Some(message) = self.fail_open.take() {
            return Err(anyhow!(message));
        }
        self.calls.push(Call::Open(media.path().to_path_buf()));
        self.playing = false;
        self.time = 0;
        self.length = self.next_length;
        Ok(())
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
        self.playing = true;
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn time(&self) -> i64 {
        self.time
    }

    fn set_time(&mut self, ms: i64) {
        self.calls.push(Call::SetTime(ms));
        self.time = ms.clamp(0, self.length.max(0));
    }

    fn length(&self) -> i64 {
        self.length_queries.set(self.length_queries.get() + 1);
        self.length
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn set_volume(&mut self, volume: i32) {
        self.calls.push(Call::SetVolume(volume));
        self.volume = volume;
    }

    fn events(&self) -> EventQueue {
        self.queue.clone()
    }

    fn dispose(&mut self) {
        self.calls.push(Call::Dispose);
        self.clock_running_at_dispose = self.clock.as_ref().map(ClockWatch::is_running);
        self.disposed = true;
    }
}

/// Picker that hands out a fixed answer and counts how often it was asked.
pub struct MockPicker {
    answer: Option<PathBuf>,
    requests: usize,
}

impl MockPicker {
    pub fn returning(path: impl AsRef<Path>) -> Self {
        Self {
            answer: Some(path.as_ref().to_path_buf()),
            requests: 0,
        }
    }

    pub fn cancelling() -> Self {
        Self {
            answer: None,
            requests: 0,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests
    }
}

impl FilePicker for MockPicker {
    fn pick_media(&mut self) -> Option<PathBuf> {
        self.requests += 1;
        self.answer.clone()
    }
}

/// Create an empty file called `name` in a fresh temp dir.
pub fn media_file(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, b"").expect("write media file");
    (dir, path)
}
