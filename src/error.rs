use std::path::PathBuf;

pub type Result<T, E = PlayerError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error(transparent)]
    Engine(#[from] anyhow::Error),
}
