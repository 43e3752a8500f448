use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt::time, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default log file; the terminal itself is taken over by the game.
pub const DEFAULT_LOG_PATH: &str = "alien_invader.log";

/// Install the tracing subscriber, writing to `path`.
///
/// `RUST_LOG` overrides the filter. Without it, debug builds log this crate
/// at `debug` and release builds at `info`. Call once, early; a second call
/// returns an error.
pub fn init(path: impl AsRef<Path>) -> anyhow::Result<()> {
    let file = File::create(path.as_ref())?;
    let default_directive = if cfg!(debug_assertions) {
        "warn,alien_invader=debug"
    } else {
        "error,alien_invader=info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_timer(time::uptime())
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}
