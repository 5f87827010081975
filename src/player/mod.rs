//! FFmpeg + rodio implementation of [`MediaEngine`].
//!
//! Each opened file gets a session: a decoder thread feeding RGBA frames and
//! f32 samples, a rodio sink playing the samples, and an audio-driven master
//! clock the UI uses to pick which frame to show. Files without audio run the
//! clock from wall time instead.

mod audio;
mod circular_buffer;
mod clock;
mod decoder;
mod video;

use std::time::Instant;

use anyhow::{Context as _, Result};
use crossbeam_channel::bounded;
use egui::{Color32, ColorImage, Context, TextureHandle, TextureOptions};
use rodio::{OutputStream, OutputStreamHandle, Sink};

use audio::ClockedSource;
use circular_buffer::SampleRing;
use clock::{MasterClock, WallDrive};
use decoder::{
    probe, DecodedFrame, DecoderCommand, DecoderHandle, DecoderOutputs, StreamInfo,
    OUTPUT_CHANNELS,
};
use video::FrameQueue;

use crate::engine::{event_channel, EventQueue, EventSender, Media, MediaEngine};

const FRAME_CAPACITY: usize = 30;

/// One opened file and everything decoding it
struct Session {
    info: StreamInfo,
    decoder: DecoderHandle,
    clock: MasterClock,
    /// Set when there is no audio stream to advance the clock
    wall: Option<WallDrive>,
    frames: FrameQueue,
    texture: TextureHandle,
    seek_target: Option<i64>,
    playing: bool,

    // Dropped after the decoder so the sink never outlives its feed
    sink: Sink,
    _stream_handle: OutputStreamHandle,
    _output_stream: OutputStream,
}

impl Session {
    fn open(media: &Media, ctx: &Context, events: EventSender, volume: i32) -> Result<Self> {
        let info = probe(media.path())?;
        let clock = MasterClock::new(info.sample_rate, OUTPUT_CHANNELS);

        let (output_stream, stream_handle) =
            OutputStream::try_default().context("no audio output device")?;
        let sink = Sink::try_new(&stream_handle).context("failed to create audio sink")?;
        sink.set_volume(volume as f32 / 100.0);

        // About one second of audio
        let samples = SampleRing::new(info.sample_rate as usize * OUTPUT_CHANNELS as usize * 2);
        sink.append(ClockedSource::new(samples.clone(), clock.clone()));
        sink.pause();

        let (frame_sender, frame_receiver) = bounded(FRAME_CAPACITY);
        let decoder = DecoderHandle::spawn(
            media.path(),
            DecoderOutputs {
                frames: frame_sender,
                samples,
                clock: clock.clone(),
                events,
                length_ms: info.length_ms,
            },
        )?;

        let texture = ctx.load_texture(
            "video_frame",
            ColorImage::new([info.width as usize, info.height as usize], Color32::BLACK),
            TextureOptions::LINEAR,
        );

        let wall = (!info.has_audio).then(WallDrive::default);
        let mut session = Self {
            info,
            decoder,
            clock,
            wall,
            frames: FrameQueue::new(frame_receiver, FRAME_CAPACITY),
            texture,
            seek_target: None,
            playing: false,
            sink,
            _stream_handle: stream_handle,
            _output_stream: output_stream,
        };
        session.seek(0);
        Ok(session)
    }

    fn play(&mut self) {
        if self.clock.has_ended() {
            self.seek(0);
        }
        self.playing = true;
        if self.seek_target.is_none() {
            self.sink.play();
        }
        self.clock.resume();
        self.decoder.send(DecoderCommand::Resume);
    }

    fn pause(&mut self) {
        self.playing = false;
        self.sink.pause();
        self.clock.pause();
        self.decoder.send(DecoderCommand::Pause);
    }

    fn is_playing(&self) -> bool {
        self.playing && !self.clock.has_ended()
    }

    fn seek(&mut self, ms: i64) {
        let ms = ms.clamp(0, self.info.length_ms.max(0));
        self.seek_target = Some(ms);
        self.sink.pause();
        self.frames.clear();
        self.clock.set_position_ms(ms);
        self.decoder.send(DecoderCommand::Seek(ms));
    }

    fn time(&self) -> i64 {
        self.seek_target
            .unwrap_or_else(|| self.clock.position_ms())
            .min(self.info.length_ms.max(0))
    }

    /// Upload whichever frame is due. Runs on the UI thread every frame.
    fn update(&mut self, now: Instant) {
        if let Some(ref mut wall) = self.wall {
            if self.seek_target.is_some() {
                wall.reset();
            } else {
                wall.drive(&self.clock, now);
            }
        }

        if let Some(target) = self.seek_target {
            if let Some(frame) = self.frames.first_after_seek(target) {
                upload(&mut self.texture, frame);
                self.seek_target = None;
                if self.is_playing() {
                    self.sink.play();
                }
            }
            return;
        }

        if !self.is_playing() {
            return;
        }

        if let Some(frame) = self.frames.advance(self.clock.position_ms()) {
            upload(&mut self.texture, frame);
        }
    }
}

fn upload(texture: &mut TextureHandle, frame: &DecodedFrame) {
    let image = ColorImage::from_rgba_unmultiplied(
        [frame.width as usize, frame.height as usize],
        &frame.rgba,
    );
    texture.set(image, TextureOptions::LINEAR);
}

/// Media engine backed by FFmpeg decoding and rodio audio output.
pub struct FfmpegEngine {
    ctx: Context,
    session: Option<Session>,
    volume: i32,
    sender: EventSender,
    queue: EventQueue,
}

impl FfmpegEngine {
    pub fn new(ctx: Context) -> Result<Self> {
        ffmpeg_next::init().context("failed to initialize FFmpeg")?;

        let (sender, queue) = event_channel();
        let waker = ctx.clone();
        let sender = sender.with_waker(move || waker.request_repaint());

        Ok(Self {
            ctx,
            session: None,
            volume: 100,
            sender,
            queue,
        })
    }

    /// Advance video presentation; call once per UI frame.
    pub fn update_frame(&mut self) {
        if let Some(ref mut session) = self.session {
            session.update(Instant::now());
            if session.is_playing() || session.seek_target.is_some() {
                self.ctx.request_repaint();
            }
        }
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.session.as_ref().map(|session| &session.texture)
    }

    pub fn video_size(&self) -> Option<(u32, u32)> {
        self.session
            .as_ref()
            .map(|session| (session.info.width, session.info.height))
    }
}

impl MediaEngine for FfmpegEngine {
    fn open(&mut self, media: &Media) -> Result<()> {
        // The current session keeps playing unless the new one opens
        let session = Session::open(media, &self.ctx, self.sender.clone(), self.volume)
            .with_context(|| format!("cannot play {}", media.name()))?;
        log::info!(
            "opened {} ({}x{}, {} ms)",
            media.name(),
            session.info.width,
            session.info.height,
            session.info.length_ms
        );
        self.session = Some(session);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(ref mut session) = self.session {
            session.play();
        }
    }

    fn pause(&mut self) {
        if let Some(ref mut session) = self.session {
            session.pause();
        }
    }

    fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_playing)
    }

    fn time(&self) -> i64 {
        self.session.as_ref().map_or(0, Session::time)
    }

    fn set_time(&mut self, ms: i64) {
        if let Some(ref mut session) = self.session {
            session.seek(ms);
        }
    }

    fn length(&self) -> i64 {
        self.session.as_ref().map_or(0, |session| session.info.length_ms)
    }

    fn volume(&self) -> i32 {
        self.volume
    }

    fn set_volume(&mut self, volume: i32) {
        self.volume = volume.clamp(0, 100);
        if let Some(ref session) = self.session {
            session.sink.set_volume(self.volume as f32 / 100.0);
        }
    }

    fn events(&self) -> EventQueue {
        self.queue.clone()
    }

    fn dispose(&mut self) {
        if self.session.take().is_some() {
            log::info!("media engine disposed");
        }
    }
}
