/// Seams to the drawing and audio layers.
///
/// The engine never talks to a window or a sound device directly; a host
/// supplies a `Canvas` and a `Soundtrack` and feeds each `Snapshot` through
/// `draw_snapshot`.

use tracing::info;

use crate::compute::Snapshot;
use crate::entities::Rgb;
use crate::geometry::Rect;

/// Something that can draw filled rectangles in playfield coordinates.
pub trait Canvas {
    type Error;

    fn clear(&mut self) -> Result<(), Self::Error>;
    fn fill_rect(&mut self, rect: &Rect, color: Rgb) -> Result<(), Self::Error>;
    fn present(&mut self) -> Result<(), Self::Error>;
}

/// Background music for the lifetime of a session.
pub trait Soundtrack: Send {
    fn start_loop(&mut self);
    fn stop(&mut self);
}

/// Soundtrack that only logs.
#[derive(Debug, Default)]
pub struct SilentSoundtrack {
    playing: bool,
}

impl SilentSoundtrack {
    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl Soundtrack for SilentSoundtrack {
    fn start_loop(&mut self) {
        self.playing = true;
        info!("soundtrack started (silent)");
    }

    fn stop(&mut self) {
        self.playing = false;
    }
}

/// Draw one frame: player, then lasers, then aliens.
pub fn draw_snapshot<C: Canvas>(canvas: &mut C, snapshot: &Snapshot) -> Result<(), C::Error> {
    canvas.clear()?;
    canvas.fill_rect(&snapshot.player.rect, snapshot.player.color)?;
    for laser in &snapshot.lasers {
        canvas.fill_rect(&laser.rect, laser.color)?;
    }
    for alien in &snapshot.aliens {
        canvas.fill_rect(&alien.rect, alien.color)?;
    }
    canvas.present()
}
