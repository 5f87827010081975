use std::time::Duration;

/// Startup settings for the player window.
///
/// Values are compiled in and read once; nothing is persisted between runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub title: String,
    pub inner_size: [f32; 2],
    pub min_inner_size: [f32; 2],
    /// How often engine position/length are polled into the UI
    pub poll_interval: Duration,
    /// Arrow-key seek step in milliseconds
    pub seek_step_ms: i64,
    /// Up/Down volume step
    pub volume_step: i32,
    pub initial_volume: i32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            title: "Video Player".to_owned(),
            inner_size: [1280.0, 720.0],
            min_inner_size: [640.0, 480.0],
            poll_interval: Duration::from_millis(250),
            seek_step_ms: 5000,
            volume_step: 5,
            initial_volume: 80,
        }
    }
}
