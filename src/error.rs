use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the game core.
///
/// The per-frame tick never fails; these only surface when spawning with bad
/// geometry, loading configuration, or starting background workers.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("degenerate rectangle {w}x{h}: width and height must be positive")]
    DegenerateRect { w: i32, h: i32 },

    #[error("rectangle at ({x}, {y}) lies entirely outside the playfield")]
    OutOfBounds { x: i32, y: i32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to spawn background worker: {0}")]
    Thread(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
