mod fullscreen;
mod polling;

pub use fullscreen::{FullscreenToggle, WindowChrome, WindowMode};
pub use polling::{format_time, ClockWatch, PollingClock};

use std::path::Path;
use std::time::Instant;

use crate::config::PlayerSettings;
use crate::engine::{EngineEvent, EventQueue, Media, MediaEngine};
use crate::error::{PlayerError, Result};
use crate::ui::picker::FilePicker;

/// What the play/pause button currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayGlyph {
    /// Nothing playing; the button offers "play"
    Paused,
    /// Playing; the button offers "pause"
    Playing,
}

impl PlayGlyph {
    pub fn symbol(self) -> &'static str {
        match self {
            PlayGlyph::Paused => "▶",
            PlayGlyph::Playing => "⏸",
        }
    }
}

/// Everything the window displays about playback.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub now_playing: String,
    pub glyph: PlayGlyph,
    /// Progress slider position, 0..=100
    pub progress: f64,
    pub elapsed: String,
    pub total: String,
    pub volume: i32,
    pub fullscreen: bool,
    /// Last user-facing problem, if any
    pub status: Option<String>,
}

impl UiState {
    fn new(volume: i32) -> Self {
        Self {
            now_playing: String::new(),
            glyph: PlayGlyph::Paused,
            progress: 0.0,
            elapsed: format_time(0),
            total: format_time(0),
            volume,
            fullscreen: false,
            status: None,
        }
    }
}

/// Owns the transport state and the engine, and keeps [`UiState`] in sync.
///
/// All methods run on the UI thread. Engine notifications reach the
/// controller only through [`PlaybackController::pump_events`].
pub struct PlaybackController<E: MediaEngine> {
    engine: E,
    events: EventQueue,
    clock: PollingClock,
    fullscreen: FullscreenToggle,
    ui: UiState,

    media_loaded: bool,
    is_playing: bool,
    volume: i32,
    is_scrubbing: bool,
    disposed: bool,

    seek_step_ms: i64,
    volume_step: i32,
}

impl<E: MediaEngine> PlaybackController<E> {
    pub fn new(mut engine: E, settings: &PlayerSettings) -> Self {
        let volume = settings.initial_volume.clamp(0, 100);
        engine.set_volume(volume);
        let events = engine.events();

        Self {
            engine,
            events,
            clock: PollingClock::new(settings.poll_interval),
            fullscreen: FullscreenToggle::default(),
            ui: UiState::new(volume),
            media_loaded: false,
            is_playing: false,
            volume,
            is_scrubbing: false,
            disposed: false,
            seek_step_ms: settings.seek_step_ms,
            volume_step: settings.volume_step,
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn clock(&self) -> &PollingClock {
        &self.clock
    }

    pub fn media_loaded(&self) -> bool {
        self.media_loaded
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn volume(&self) -> i32 {
        self.volume
    }

    pub fn is_scrubbing(&self) -> bool {
        self.is_scrubbing
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    /// Open `path` and start playing it from the beginning.
    ///
    /// A path that is not an existing file leaves playback untouched.
    pub fn open_media(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let media = Media::from_path(path).map_err(|err| self.report(err))?;
        self.engine
            .open(&media)
            .map_err(|err| self.report(PlayerError::Engine(err)))?;
        self.engine.play();

        log::info!("playing {}", media.path().display());
        self.media_loaded = true;
        self.is_playing = true;
        self.is_scrubbing = false;
        self.ui.now_playing = media.name().to_owned();
        self.ui.glyph = PlayGlyph::Playing;
        self.ui.progress = 0.0;
        self.ui.elapsed = format_time(0);
        self.ui.total = format_time(0);
        self.ui.status = None;
        Ok(())
    }

    /// Ask `picker` for a file and open it. Cancelling does nothing.
    pub fn open_with(&mut self, picker: &mut dyn FilePicker) -> Result<()> {
        match picker.pick_media() {
            Some(path) => self.open_media(path),
            None => Ok(()),
        }
    }

    /// Play/pause button. With nothing loaded it opens a file instead.
    pub fn toggle_play_pause(&mut self, picker: &mut dyn FilePicker) -> Result<()> {
        if !self.media_loaded {
            return self.open_with(picker);
        }

        if self.engine.is_playing() {
            log::debug!("pause");
            self.engine.pause();
            self.is_playing = false;
            self.ui.glyph = PlayGlyph::Paused;
        } else {
            log::debug!("resume");
            self.engine.play();
            self.is_playing = true;
            self.ui.glyph = PlayGlyph::Playing;
        }
        Ok(())
    }

    pub fn seek_relative(&mut self, delta_ms: i64) {
        if !self.media_loaded {
            return;
        }
        let target = self.engine.time().saturating_add(delta_ms);
        log::debug!("seek {delta_ms:+} ms to {target} ms");
        self.engine.set_time(target);
    }

    pub fn skip_forward(&mut self) {
        self.seek_relative(self.seek_step_ms);
    }

    pub fn skip_back(&mut self) {
        self.seek_relative(-self.seek_step_ms);
    }

    pub fn set_volume(&mut self, volume: i32) {
        let volume = volume.clamp(0, 100);
        self.volume = volume;
        self.ui.volume = volume;
        self.engine.set_volume(volume);
    }

    pub fn volume_up(&mut self) {
        self.set_volume((self.ui.volume + self.volume_step).min(100));
    }

    pub fn volume_down(&mut self) {
        self.set_volume((self.ui.volume - self.volume_step).max(0));
    }

    /// The user is moving the progress slider to `progress` (0..=100).
    pub fn drag_progress(&mut self, progress: f64) {
        self.ui.progress = progress.clamp(0.0, 100.0);
    }

    /// Report, once per frame, whether the pointer holds the progress slider.
    ///
    /// Holding marks a scrub in progress; letting go commits the slider value.
    pub fn sync_scrub(&mut self, captured: bool) {
        if captured {
            self.on_scrub_start();
        } else if self.is_scrubbing {
            self.on_scrub_commit(self.ui.progress / 100.0);
        }
    }

    pub fn on_scrub_start(&mut self) {
        if !self.is_scrubbing {
            log::trace!("scrub started");
        }
        self.is_scrubbing = true;
    }

    /// Seek to `fraction` (0..=1) of the media and end the scrub.
    pub fn on_scrub_commit(&mut self, fraction: f64) {
        self.is_scrubbing = false;
        if !self.media_loaded {
            return;
        }
        let length = self.engine.length();
        if length <= 0 {
            return;
        }
        let target = (length as f64 * fraction.clamp(0.0, 1.0)).round() as i64;
        log::debug!("scrub to {target} ms");
        self.engine.set_time(target);
    }

    /// Switch fullscreen and return the chrome the window should take.
    pub fn toggle_fullscreen(&mut self, current: WindowChrome) -> WindowChrome {
        let target = self.fullscreen.toggle(current);
        self.ui.fullscreen = self.fullscreen.is_fullscreen();
        log::debug!(
            "fullscreen {}",
            if self.ui.fullscreen { "on" } else { "off" }
        );
        target
    }

    /// Refresh the position display if the polling clock is due.
    pub fn tick(&mut self, now: Instant) {
        if self.clock.due(now) {
            self.refresh();
        }
    }

    /// Copy engine position and length into the UI.
    pub fn refresh(&mut self) {
        if !self.media_loaded || self.disposed {
            return;
        }
        let length = self.engine.length();
        if length <= 0 {
            return;
        }
        let time = self.engine.time();
        log::trace!("poll {time}/{length} ms");

        if !self.is_scrubbing {
            self.ui.progress = (time as f64 * 100.0 / length as f64).clamp(0.0, 100.0);
        }
        self.ui.elapsed = format_time(time);
        self.ui.total = format_time(length);
    }

    /// Handle everything the engine posted since the last call.
    pub fn pump_events(&mut self) {
        let events: Vec<_> = self.events.drain().collect();
        for event in events {
            match event {
                EngineEvent::EndReached => self.on_end_reached(),
                EngineEvent::Error(message) => self.on_engine_error(message),
            }
        }
    }

    pub fn on_end_reached(&mut self) {
        log::info!("end of media reached");
        self.is_playing = false;
        self.ui.glyph = PlayGlyph::Paused;
        self.refresh();
    }

    pub fn on_engine_error(&mut self, message: String) {
        log::error!("engine error: {message}");
        self.is_playing = false;
        self.ui.glyph = PlayGlyph::Paused;
        self.ui.status = Some(message);
    }

    /// Stop polling, then release the engine. Later calls do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.clock.stop();
        self.engine.dispose();
        self.disposed = true;
        self.media_loaded = false;
        self.is_playing = false;
    }

    fn report(&mut self, err: PlayerError) -> PlayerError {
        log::warn!("{err}");
        self.ui.status = Some(err.to_string());
        err
    }
}

impl<E: MediaEngine> Drop for PlaybackController<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}
