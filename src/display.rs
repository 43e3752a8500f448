/// Rendering layer. All terminal I/O lives here.
///
/// The playfield is scaled onto the terminal grid: row 0 is the HUD, the last
/// row holds the controls hint, and everything in between is the field.
/// Rectangles are painted into a cell buffer first so each frame is written
/// in one pass.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};

use alien_invader::compute::Snapshot;
use alien_invader::entities::{EndReason, Rgb};
use alien_invader::geometry::{Rect, Vec2};
use alien_invader::render::Canvas;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;
const C_BANNER: Color = Color::Red;

const CELL: &str = "█";

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

// ── TerminalCanvas ────────────────────────────────────────────────────────────

pub struct TerminalCanvas<W: Write> {
    out: W,
    bounds: Vec2,
    cols: u16,
    rows: u16,
    cells: Vec<Option<Rgb>>,
}

impl<W: Write> TerminalCanvas<W> {
    pub fn new(out: W, bounds: Vec2) -> io::Result<Self> {
        let (cols, height) = terminal::size()?;
        Ok(Self::with_size(out, bounds, cols, height))
    }

    pub fn with_size(out: W, bounds: Vec2, cols: u16, height: u16) -> Self {
        let rows = height.saturating_sub(2).max(1);
        Self {
            out,
            bounds,
            cols: cols.max(1),
            rows,
            cells: vec![None; cols.max(1) as usize * rows as usize],
        }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    /// Cell span `[start, end)` covering `[pos, pos + len)` on an axis of
    /// `field` units mapped onto `cells` cells. Always at least one cell wide
    /// when any part is visible.
    fn span(pos: i32, len: i32, field: i32, cells: u16) -> Option<(usize, usize)> {
        let cells = i64::from(cells);
        let field = i64::from(field.max(1));
        let lo = i64::from(pos).max(0);
        let hi = i64::from(pos + len).min(field);
        if lo >= hi {
            return None;
        }
        let start = (lo * cells / field).min(cells - 1);
        let end = ((hi * cells + field - 1) / field).clamp(start + 1, cells);
        Some((start as usize, end as usize))
    }

    fn cell(&self, col: usize, row: usize) -> Option<Rgb> {
        self.cells[row * self.cols as usize + col]
    }

    /// HUD line and, once the game is over, the banner.
    pub fn draw_overlay(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        self.out.queue(cursor::MoveTo(1, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD))?;
        self.out.queue(Print(format!(
            "ALIEN INVADER Z   Aliens:{:>4}  Lasers:{:>3}  Frame:{:>7}",
            snapshot.aliens.len(),
            snapshot.lasers.len(),
            snapshot.frame
        )))?;

        self.out.queue(cursor::MoveTo(1, self.rows + 1))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out.queue(Print("ARROWS / WASD : Move   SPACE : Shoot   Q : Quit"))?;

        if let Some(reason) = snapshot.end_reason {
            self.draw_game_over(reason)?;
        }
        self.out.queue(style::ResetColor)?;
        self.out.flush()
    }

    fn draw_game_over(&mut self, reason: EndReason) -> io::Result<()> {
        let lines = [
            "╔════════════════════════╗".to_string(),
            "║       GAME  OVER       ║".to_string(),
            "╚════════════════════════╝".to_string(),
            format!("You were {reason}."),
            "R - Play Again  Q - Quit".to_string(),
        ];
        let cx = self.cols / 2;
        let start_row = (self.rows / 2).saturating_sub(lines.len() as u16 / 2);
        self.out.queue(style::SetForegroundColor(C_BANNER))?;
        for (i, line) in lines.iter().enumerate() {
            let col = cx.saturating_sub(line.chars().count() as u16 / 2);
            self.out.queue(cursor::MoveTo(col, start_row + 1 + i as u16))?;
            self.out.queue(Print(line))?;
        }
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalCanvas<W> {
    type Error = io::Error;

    fn clear(&mut self) -> io::Result<()> {
        self.cells.iter_mut().for_each(|c| *c = None);
        Ok(())
    }

    fn fill_rect(&mut self, rect: &Rect, color: Rgb) -> io::Result<()> {
        let Some((c0, c1)) = Self::span(rect.x, rect.w, self.bounds.x, self.cols) else {
            return Ok(());
        };
        let Some((r0, r1)) = Self::span(rect.y, rect.h, self.bounds.y, self.rows) else {
            return Ok(());
        };
        let cols = self.cols as usize;
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells[row * cols + col] = Some(color);
            }
        }
        Ok(())
    }

    fn present(&mut self) -> io::Result<()> {
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        for row in 0..self.rows as usize {
            self.out.queue(cursor::MoveTo(0, row as u16 + 1))?;
            let mut current: Option<Rgb> = None;
            for col in 0..self.cols as usize {
                match self.cell(col, row) {
                    Some(rgb) => {
                        if current != Some(rgb) {
                            self.out.queue(style::SetForegroundColor(to_color(rgb)))?;
                            current = Some(rgb);
                        }
                        self.out.queue(Print(CELL))?;
                    }
                    None => {
                        self.out.queue(Print(' '))?;
                    }
                }
            }
        }
        Ok(())
    }
}
