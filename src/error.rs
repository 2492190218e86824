use thiserror::Error;

/// Errors raised at the boundary between a caller and a board.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid move: {0}")]
    InvalidMove(String),

    #[error("Game is already over")]
    GameOver,

    #[error("Invalid board layout: {0}")]
    Layout(String),

    #[error("Invalid FEN: {0}")]
    Fen(String),
}

/// Errors that can occur while loading search settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}
