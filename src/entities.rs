/// Game entity types: pure data, no logic.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Rect, Vec2};

// ── Colours ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const BROWN: Rgb = Rgb::new(139, 69, 19);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ── Alien kinds ──────────────────────────────────────────────────────────────

/// Alien class. Behaviour is looked up in a `MotionTable`; the colour is only
/// for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlienKind {
    Red,
    Brown,
    Blue,
}

impl AlienKind {
    pub const ALL: [AlienKind; 3] = [AlienKind::Red, AlienKind::Brown, AlienKind::Blue];

    pub fn color(self) -> Rgb {
        match self {
            AlienKind::Red => Rgb::RED,
            AlienKind::Brown => Rgb::BROWN,
            AlienKind::Blue => Rgb::BLUE,
        }
    }

    pub fn random(rng: &mut impl Rng) -> AlienKind {
        AlienKind::ALL[rng.gen_range(0..AlienKind::ALL.len())]
    }
}

// ── Ids ──────────────────────────────────────────────────────────────────────

/// Handle to an alien. Never reused within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlienId(pub u64);

/// Handle to a laser. Never reused within one session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaserId(pub u64);

impl fmt::Display for AlienId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alien#{}", self.0)
    }
}

impl fmt::Display for LaserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "laser#{}", self.0)
    }
}

// ── Player, aliens & lasers ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    /// Last direction moved in; orients newly fired lasers.
    pub facing: Direction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alien {
    pub id: AlienId,
    pub rect: Rect,
    pub kind: AlienKind,
    /// Last step direction, set only by the directional-step policy.
    pub heading: Option<Direction>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Laser {
    pub id: LaserId,
    pub rect: Rect,
    pub direction: Direction,
}

impl Laser {
    pub const LENGTH: i32 = 10;
    pub const THICKNESS: i32 = 2;

    /// Top-left corner of a shot fired by `shooter` facing `dir`: a thin bar
    /// centred on the shooter's leading edge.
    pub fn muzzle(shooter: &Rect, dir: Direction) -> Vec2 {
        let mid_x = shooter.x + shooter.w / 2 - Self::THICKNESS / 2;
        let mid_y = shooter.y + shooter.h / 2 - Self::THICKNESS / 2;
        match dir {
            Direction::Up => Vec2::new(mid_x, shooter.y),
            Direction::Down => Vec2::new(mid_x, shooter.y + shooter.h - 1),
            Direction::Left => Vec2::new(shooter.x, mid_y),
            Direction::Right => Vec2::new(shooter.x + shooter.w - 1, mid_y),
        }
    }

    /// Laser box at `origin`, long along the travel axis.
    pub fn rect_at(origin: Vec2, dir: Direction) -> Rect {
        let (w, h) = match dir {
            Direction::Up | Direction::Down => (Self::THICKNESS, Self::LENGTH),
            Direction::Left | Direction::Right => (Self::LENGTH, Self::THICKNESS),
        };
        Rect {
            x: origin.x,
            y: origin.y,
            w,
            h,
        }
    }
}

/// Why a session stopped running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The player touched an alien.
    Caught,
    /// The host asked to quit.
    Quit,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::Caught => f.write_str("touched by an alien"),
            EndReason::Quit => f.write_str("quit"),
        }
    }
}
