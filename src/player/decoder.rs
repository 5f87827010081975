use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::{Audio as AudioFrame, Video as VideoFrame};
use ffmpeg_next::media::Type;
use ffmpeg_next::software::resampling::Context as Resampler;
use ffmpeg_next::software::scaling::{Context as Scaler, Flags};
use ffmpeg_next::util::channel_layout::ChannelLayout;
use ffmpeg_next::util::format::sample::{Sample, Type as SampleType};
use ffmpeg_next::{codec, decoder, Packet, Rational};
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::circular_buffer::SampleRing;
use super::clock::MasterClock;
use crate::engine::{EngineEvent, EventSender};

/// Audio is always resampled to interleaved f32 stereo
pub const OUTPUT_CHANNELS: u16 = 2;
const FALLBACK_SAMPLE_RATE: u32 = 44_100;
const COMMAND_CAPACITY: usize = 16;
const IDLE_SLEEP: Duration = Duration::from_millis(10);
const BACKPRESSURE_SLEEP: Duration = Duration::from_millis(1);

/// A decoded RGBA frame with tightly packed rows
pub struct DecodedFrame {
    pub rgba: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub pts_ms: i64,
}

#[derive(Debug)]
pub enum DecoderCommand {
    Seek(i64),
    Pause,
    Resume,
    Stop,
}

/// What the UI needs to know about a file before decoding starts
#[derive(Debug, Clone, Copy)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub length_ms: i64,
    pub sample_rate: u32,
    pub has_audio: bool,
}

pub fn probe(path: &Path) -> Result<StreamInfo> {
    let input = ffmpeg_next::format::input(path).context("failed to open input file")?;

    let video_stream = input
        .streams()
        .best(Type::Video)
        .ok_or_else(|| anyhow!("no video stream found"))?;
    let video = codec::Context::from_parameters(video_stream.parameters())?
        .decoder()
        .video()?;

    let audio_stream = input.streams().best(Type::Audio);
    let has_audio = audio_stream.is_some();
    let sample_rate = match audio_stream {
        Some(stream) => codec::Context::from_parameters(stream.parameters())?
            .decoder()
            .audio()?
            .rate(),
        None => FALLBACK_SAMPLE_RATE,
    };

    let length_ms = if input.duration() > 0 {
        input.duration() * 1000 / ffmpeg_next::ffi::AV_TIME_BASE as i64
    } else {
        0
    };

    Ok(StreamInfo {
        width: video.width(),
        height: video.height(),
        length_ms,
        sample_rate,
        has_audio,
    })
}

/// Where the decoder thread delivers its output
pub struct DecoderOutputs {
    pub frames: Sender<DecodedFrame>,
    pub samples: Arc<SampleRing<f32>>,
    pub clock: MasterClock,
    pub events: EventSender,
    pub length_ms: i64,
}

/// Owning handle to a running decoder thread. Dropping it stops the thread.
pub struct DecoderHandle {
    commands: Sender<DecoderCommand>,
    thread: Option<JoinHandle<()>>,
}

impl DecoderHandle {
    pub fn spawn(path: &Path, outputs: DecoderOutputs) -> Result<Self> {
        let (commands, command_rx) = bounded(COMMAND_CAPACITY);
        let path = path.to_path_buf();

        let thread = thread::Builder::new()
            .name("media-decoder".into())
            .spawn(move || {
                let events = outputs.events.clone();
                if let Err(err) = run(&path, outputs, command_rx) {
                    log::error!("decoder for {} stopped: {err:#}", path.display());
                    events.post(EngineEvent::Error(format!("{err:#}")));
                }
            })
            .context("failed to spawn decoder thread")?;

        Ok(Self {
            commands,
            thread: Some(thread),
        })
    }

    pub fn send(&self, command: DecoderCommand) {
        if let Err(err) = self.commands.send(command) {
            log::debug!("decoder gone, dropped {:?}", err.0);
        }
    }
}

impl Drop for DecoderHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(DecoderCommand::Stop);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("decoder thread panicked");
            }
        }
    }
}

enum Flow {
    Continue,
    Stop,
}

fn run(path: &Path, outputs: DecoderOutputs, commands: Receiver<DecoderCommand>) -> Result<()> {
    DecodeLoop::open(path, outputs, commands)?.run()
}

struct AudioPath {
    index: usize,
    decoder: decoder::Audio,
    resampler: Resampler,
}

struct DecodeLoop {
    input: Input,
    video_index: usize,
    video_time_base: Rational,
    video: decoder::Video,
    scaler: Scaler,
    audio: Option<AudioPath>,
    outputs: DecoderOutputs,
    commands: Receiver<DecoderCommand>,

    paused: bool,
    at_eof: bool,
    end_posted: bool,
    pending_seek: Option<i64>,
}

impl DecodeLoop {
    fn open(
        path: &Path,
        outputs: DecoderOutputs,
        commands: Receiver<DecoderCommand>,
    ) -> Result<Self> {
        let input = ffmpeg_next::format::input(path).context("failed to open input file")?;

        let video_stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| anyhow!("no video stream"))?;
        let video_index = video_stream.index();
        let video_time_base = video_stream.time_base();
        let video = codec::Context::from_parameters(video_stream.parameters())?
            .decoder()
            .video()?;

        let scaler = Scaler::get(
            video.format(),
            video.width(),
            video.height(),
            Pixel::RGBA,
            video.width(),
            video.height(),
            Flags::BILINEAR,
        )
        .context("failed to create RGBA scaler")?;

        let audio = match input.streams().best(Type::Audio) {
            Some(stream) => {
                let decoder = codec::Context::from_parameters(stream.parameters())?
                    .decoder()
                    .audio()?;
                let resampler = Resampler::get(
                    decoder.format(),
                    decoder.channel_layout(),
                    decoder.rate(),
                    Sample::F32(SampleType::Packed),
                    ChannelLayout::STEREO,
                    outputs.clock.sample_rate(),
                )
                .context("failed to create audio resampler")?;
                Some(AudioPath {
                    index: stream.index(),
                    decoder,
                    resampler,
                })
            }
            None => None,
        };

        Ok(Self {
            input,
            video_index,
            video_time_base,
            video,
            scaler,
            audio,
            outputs,
            commands,
            paused: true,
            at_eof: false,
            end_posted: false,
            pending_seek: None,
        })
    }

    fn run(&mut self) -> Result<()> {
        loop {
            if let Flow::Stop = self.drain_commands() {
                return Ok(());
            }

            if let Some(target) = self.pending_seek.take() {
                self.seek(target);
            }

            if self.paused {
                thread::sleep(IDLE_SLEEP);
                continue;
            }

            if self.at_eof {
                self.check_end();
                thread::sleep(IDLE_SLEEP);
                continue;
            }

            let mut packet = Packet::empty();
            let flow = match packet.read(&mut self.input) {
                Ok(()) => self.decode_packet(&packet)?,
                Err(ffmpeg_next::Error::Eof) => self.finish_stream()?,
                Err(err) => {
                    log::trace!("skipping unreadable packet: {err}");
                    Flow::Continue
                }
            };
            if let Flow::Stop = flow {
                return Ok(());
            }
        }
    }

    fn drain_commands(&mut self) -> Flow {
        loop {
            match self.commands.try_recv() {
                Ok(DecoderCommand::Stop) | Err(TryRecvError::Disconnected) => return Flow::Stop,
                Ok(DecoderCommand::Pause) => {
                    self.paused = true;
                    self.outputs.clock.pause();
                }
                Ok(DecoderCommand::Resume) => {
                    self.paused = false;
                    self.outputs.clock.resume();
                }
                Ok(DecoderCommand::Seek(target)) => self.pending_seek = Some(target),
                Err(TryRecvError::Empty) => return Flow::Continue,
            }
        }
    }

    fn seek(&mut self, target_ms: i64) {
        let ts = target_ms * ffmpeg_next::ffi::AV_TIME_BASE as i64 / 1000;
        if let Err(err) = self.input.seek(ts, ..ts) {
            log::warn!("seek to {target_ms} ms failed: {err}");
            return;
        }

        self.video.flush();
        if let Some(ref mut audio) = self.audio {
            audio.decoder.flush();
        }
        self.outputs.clock.set_position_ms(target_ms);
        self.at_eof = false;
        self.end_posted = false;
    }

    fn decode_packet(&mut self, packet: &Packet) -> Result<Flow> {
        let index = packet.stream();

        if index == self.video_index {
            if let Err(err) = self.video.send_packet(packet) {
                log::debug!("video decoder rejected packet: {err}");
                return Ok(Flow::Continue);
            }
            return self.drain_video();
        }

        if let Some(ref mut audio) = self.audio {
            if index == audio.index {
                if let Err(err) = audio.decoder.send_packet(packet) {
                    log::debug!("audio decoder rejected packet: {err}");
                    return Ok(Flow::Continue);
                }
                self.drain_audio();
            }
        }
        Ok(Flow::Continue)
    }

    /// Demuxer hit end of file: flush what the decoders still hold.
    fn finish_stream(&mut self) -> Result<Flow> {
        self.at_eof = true;
        log::debug!("demuxer reached end of file");

        if let Some(ref mut audio) = self.audio {
            if audio.decoder.send_eof().is_ok() {
                self.drain_audio();
            }
        }
        if self.video.send_eof().is_err() {
            return Ok(Flow::Continue);
        }
        self.drain_video()
    }

    fn drain_video(&mut self) -> Result<Flow> {
        let mut decoded = VideoFrame::empty();
        let mut rgba = VideoFrame::empty();

        while self.video.receive_frame(&mut decoded).is_ok() {
            self.scaler.run(&decoded, &mut rgba)?;
            let pts_ms = decoded.pts().map_or(0, |pts| {
                (pts as f64 * f64::from(self.video_time_base) * 1000.0) as i64
            });

            if let Flow::Stop = self.deliver(packed_frame(&rgba, pts_ms)) {
                return Ok(Flow::Stop);
            }
            if self.pending_seek.is_some() {
                break;
            }
        }
        Ok(Flow::Continue)
    }

    fn drain_audio(&mut self) {
        let Some(ref mut audio) = self.audio else {
            return;
        };

        let mut decoded = AudioFrame::empty();
        while audio.decoder.receive_frame(&mut decoded).is_ok() {
            let mut resampled = AudioFrame::empty();
            if let Err(err) = audio.resampler.run(&decoded, &mut resampled) {
                log::trace!("resampling failed: {err}");
                continue;
            }

            let len = resampled.samples() * OUTPUT_CHANNELS as usize * std::mem::size_of::<f32>();
            let data = resampled.data(0);
            let bytes = &data[..len.min(data.len())];
            self.outputs.samples.extend(
                bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]])),
            );
        }
    }

    /// Hand a frame to the UI, waiting while the channel is full. A seek or
    /// stop arriving meanwhile abandons the frame.
    fn deliver(&mut self, mut frame: DecodedFrame) -> Flow {
        loop {
            if let Flow::Stop = self.drain_commands() {
                return Flow::Stop;
            }
            if self.pending_seek.is_some() {
                return Flow::Continue;
            }

            match self.outputs.frames.try_send(frame) {
                Ok(()) => return Flow::Continue,
                Err(TrySendError::Full(f)) => {
                    frame = f;
                    thread::sleep(BACKPRESSURE_SLEEP);
                }
                Err(TrySendError::Disconnected(_)) => return Flow::Stop,
            }
        }
    }

    /// After end of file, report the end once all output has been consumed.
    fn check_end(&mut self) {
        if self.end_posted || !self.outputs.frames.is_empty() || !self.outputs.samples.is_empty() {
            return;
        }

        self.end_posted = true;
        self.paused = true;
        self.outputs.clock.mark_ended(self.outputs.length_ms);
        self.outputs.events.post(EngineEvent::EndReached);
    }
}

/// Copy row by row so stride padding never reaches the texture.
fn packed_frame(frame: &VideoFrame, pts_ms: i64) -> DecodedFrame {
    let width = frame.width();
    let height = frame.height();
    let stride = frame.stride(0);
    let row = width as usize * 4;
    let data = frame.data(0);

    let mut rgba = Vec::with_capacity(row * height as usize);
    for y in 0..height as usize {
        let start = y * stride;
        rgba.extend_from_slice(&data[start..start + row]);
    }

    DecodedFrame {
        rgba,
        width,
        height,
        pts_ms,
    }
}
