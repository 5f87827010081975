//! The media engine capability the playback controller drives.
//!
//! An engine does the actual demux/decode/render work on its own threads and
//! exposes a small command/query surface. Anything an engine wants to tell the
//! UI (end of stream, decode failures) goes through an [`EventSender`] and is
//! drained on the UI thread from the matching [`EventQueue`].

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PlayerError, Result};

/// A media resource that has been checked to exist on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    path: PathBuf,
    name: String,
}

impl Media {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PlayerError::FileNotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path: path.to_path_buf(),
            name,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File base name, shown as "now playing"
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Notifications pushed by an engine from its own threads
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    EndReached,
    Error(String),
}

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Posting side of the engine event queue. Safe to clone into engine threads.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<EngineEvent>,
    waker: Option<Waker>,
}

impl EventSender {
    /// Run `waker` after every post so a sleeping UI loop comes around to drain.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn post(&self, event: EngineEvent) {
        if self.sender.send(event).is_err() {
            log::debug!("event queue closed, dropping engine event");
            return;
        }
        if let Some(ref waker) = self.waker {
            waker();
        }
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("pending", &self.sender.len())
            .field("waker", &self.waker.is_some())
            .finish()
    }
}

/// Receiving side of the engine event queue, drained on the UI thread.
#[derive(Debug, Clone)]
pub struct EventQueue {
    receiver: Receiver<EngineEvent>,
}

impl EventQueue {
    /// Take every event posted so far without blocking.
    pub fn drain(&self) -> impl Iterator<Item = EngineEvent> + '_ {
        self.receiver.try_iter()
    }
}

pub fn event_channel() -> (EventSender, EventQueue) {
    let (sender, receiver) = unbounded();
    (
        EventSender {
            sender,
            waker: None,
        },
        EventQueue { receiver },
    )
}

/// Control surface of a media engine.
///
/// Commands are fire-and-forget: their effect shows up on the next query or
/// through a pushed [`EngineEvent`]. Times are milliseconds, volume is 0-100.
pub trait MediaEngine {
    /// Load `media`, replacing whatever was loaded before. On failure the
    /// previously loaded media stays loaded.
    fn open(&mut self, media: &Media) -> anyhow::Result<()>;

    fn play(&mut self);

    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Current playback position, 0 when nothing is loaded.
    fn time(&self) -> i64;

    /// Jump to `ms`. Out-of-range targets are the engine's to clamp.
    fn set_time(&mut self, ms: i64);

    /// Media duration, 0 or less while unknown.
    fn length(&self) -> i64;

    fn volume(&self) -> i32;

    fn set_volume(&mut self, volume: i32);

    /// A receiver for events this engine posts.
    fn events(&self) -> EventQueue;

    /// Release every engine resource. The engine is not used afterwards.
    fn dispose(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn media_requires_existing_file() {
        let missing = Path::new("/definitely/not/here.mkv");
        match Media::from_path(missing) {
            Err(PlayerError::FileNotFound(path)) => assert_eq!(path, missing),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn media_name_is_file_base_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday clip.mp4");
        std::fs::write(&path, b"not really a video").unwrap();

        let media = Media::from_path(&path).unwrap();
        assert_eq!(media.name(), "holiday clip.mp4");
        assert_eq!(media.path(), path.as_path());
    }

    #[test]
    fn directories_are_not_media() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Media::from_path(dir.path()).is_err());
    }

    #[test]
    fn events_cross_threads_and_wake_the_ui() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let (sender, queue) = event_channel();
        let counter = wakes.clone();
        let sender = sender.with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        thread::spawn(move || {
            sender.post(EngineEvent::Error("bad packet".into()));
            sender.post(EngineEvent::EndReached);
        })
        .join()
        .unwrap();

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            events,
            vec![EngineEvent::Error("bad packet".into()), EngineEvent::EndReached]
        );
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert_eq!(queue.drain().count(), 0);
    }
}
