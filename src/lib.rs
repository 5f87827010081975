pub mod app;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod player;
pub mod ui;

#[cfg(test)]
mod test_utils;

pub use app::PlayerApp;
pub use config::PlayerSettings;
pub use controller::{PlaybackController, UiState};
pub use engine::{Media, MediaEngine};
pub use error::PlayerError;
pub use player::FfmpegEngine;
pub use ui::controls::PlayerControls;
