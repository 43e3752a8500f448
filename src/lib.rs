pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod logger;
pub mod motion;
pub mod render;
pub mod session;
pub mod store;
pub mod worker;

pub use compute::{GameState, InputState, Snapshot};
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use session::Session;
