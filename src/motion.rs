/// Movement rules for every entity kind.
///
/// The player is input-driven and lasers fly straight. Aliens move according
/// to a `MotionPolicy` looked up by kind in a `MotionTable`, so which rule a
/// red alien follows is configuration rather than code.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::compute::InputState;
use crate::entities::{Alien, AlienKind, Laser, Player};
use crate::geometry::{Direction, Vec2};
use crate::store::AlienField;

pub const DEFAULT_WALK_STEP: i32 = 2;
pub const DEFAULT_HOMING_STEP: i32 = 5;
pub const DEFAULT_DIRECTIONAL_STEP: i32 = 20;

// ── Player & lasers ──────────────────────────────────────────────────────────

/// Move the player by `speed` along each held axis and clamp to the playfield.
/// Opposite keys on one axis cancel out. Returns `true` if any direction key
/// was held.
pub fn move_player(player: &mut Player, input: &InputState, speed: i32, bounds: Vec2) -> bool {
    let dx = i32::from(input.right) - i32::from(input.left);
    let dy = i32::from(input.down) - i32::from(input.up);
    player.rect.translate(dx * speed, dy * speed);
    player.rect.clamp_within(bounds);

    // Later checks win, so Down beats Up and Right beats Left.
    let mut facing = None;
    if input.left {
        facing = Some(Direction::Left);
    }
    if input.right {
        facing = Some(Direction::Right);
    }
    if input.up {
        facing = Some(Direction::Up);
    }
    if input.down {
        facing = Some(Direction::Down);
    }
    match facing {
        Some(dir) => {
            player.facing = dir;
            true
        }
        None => false,
    }
}

/// Advance a laser along its fixed direction. Lasers are never clamped.
pub fn move_laser(laser: &mut Laser, speed: i32) {
    let (ux, uy) = laser.direction.unit();
    laser.rect.translate(ux * speed, uy * speed);
}

// ── Alien policies ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum MotionPolicy {
    /// Jitter by a uniform integer in `[-max_step, max_step]` on each axis.
    RandomWalk {
        #[serde(default = "default_walk_step")]
        max_step: i32,
    },
    /// Close in on the player by up to `step` on each axis.
    Homing {
        #[serde(default = "default_homing_step")]
        step: i32,
    },
    /// Pick a random direction every step and move `step` along it.
    DirectionalStep {
        #[serde(default = "default_directional_step")]
        step: i32,
    },
}

fn default_walk_step() -> i32 {
    DEFAULT_WALK_STEP
}

fn default_homing_step() -> i32 {
    DEFAULT_HOMING_STEP
}

fn default_directional_step() -> i32 {
    DEFAULT_DIRECTIONAL_STEP
}

impl Default for MotionPolicy {
    fn default() -> Self {
        MotionPolicy::RandomWalk {
            max_step: DEFAULT_WALK_STEP,
        }
    }
}

impl MotionPolicy {
    /// Move one alien. The result is always clamped inside `bounds`.
    pub fn step(&self, alien: &mut Alien, target: Vec2, bounds: Vec2, rng: &mut impl Rng) {
        match *self {
            MotionPolicy::RandomWalk { max_step } => {
                let dx = rng.gen_range(-max_step..=max_step);
                let dy = rng.gen_range(-max_step..=max_step);
                alien.rect.translate(dx, dy);
            }
            MotionPolicy::Homing { step } => {
                let dx = (target.x - alien.rect.x).clamp(-step, step);
                let dy = (target.y - alien.rect.y).clamp(-step, step);
                alien.rect.translate(dx, dy);
            }
            MotionPolicy::DirectionalStep { step } => {
                let dir = Direction::random(rng);
                let (ux, uy) = dir.unit();
                alien.rect.translate(ux * step, uy * step);
                alien.heading = Some(dir);
            }
        }
        alien.rect.clamp_within(bounds);
    }

    /// Largest per-axis displacement this policy can produce.
    pub fn reach(&self) -> i32 {
        match *self {
            MotionPolicy::RandomWalk { max_step } => max_step,
            MotionPolicy::Homing { step } | MotionPolicy::DirectionalStep { step } => step,
        }
    }
}

// ── MotionTable ──────────────────────────────────────────────────────────────

/// Named tables matching the game's historical behaviours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionPreset {
    /// Every alien random-walks.
    Classic,
    /// Red aliens home in on the player; the rest random-walk.
    Homing,
    /// Every alien takes large random-direction steps sized by kind.
    Directional,
}

/// Per-kind motion policy lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "MotionTableRepr", into = "MotionTableRepr")]
pub struct MotionTable {
    pub red: MotionPolicy,
    pub brown: MotionPolicy,
    pub blue: MotionPolicy,
}

/// On disk a table is either a preset name or explicit per-kind entries.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum MotionTableRepr {
    Preset(MotionPreset),
    Table {
        #[serde(default)]
        red: MotionPolicy,
        #[serde(default)]
        brown: MotionPolicy,
        #[serde(default)]
        blue: MotionPolicy,
    },
}

impl From<MotionTableRepr> for MotionTable {
    fn from(repr: MotionTableRepr) -> Self {
        match repr {
            MotionTableRepr::Preset(preset) => MotionTable::preset(preset),
            MotionTableRepr::Table { red, brown, blue } => MotionTable { red, brown, blue },
        }
    }
}

impl From<MotionTable> for MotionTableRepr {
    fn from(table: MotionTable) -> Self {
        MotionTableRepr::Table {
            red: table.red,
            brown: table.brown,
            blue: table.blue,
        }
    }
}

impl Default for MotionTable {
    fn default() -> Self {
        MotionTable::preset(MotionPreset::Homing)
    }
}

impl MotionTable {
    pub fn preset(preset: MotionPreset) -> Self {
        let walk = MotionPolicy::default();
        match preset {
            MotionPreset::Classic => MotionTable {
                red: walk,
                brown: walk,
                blue: walk,
            },
            MotionPreset::Homing => MotionTable {
                red: MotionPolicy::Homing {
                    step: DEFAULT_HOMING_STEP,
                },
                brown: walk,
                blue: walk,
            },
            MotionPreset::Directional => MotionTable {
                red: MotionPolicy::DirectionalStep { step: 32 },
                brown: MotionPolicy::DirectionalStep { step: 25 },
                blue: MotionPolicy::DirectionalStep { step: 15 },
            },
        }
    }

    pub fn policy(&self, kind: AlienKind) -> &MotionPolicy {
        match kind {
            AlienKind::Red => &self.red,
            AlienKind::Brown => &self.brown,
            AlienKind::Blue => &self.blue,
        }
    }

    pub fn policies(&self) -> [&MotionPolicy; 3] {
        [&self.red, &self.brown, &self.blue]
    }

    /// Move every alien in `field` one step toward (or around) the published
    /// target.
    pub fn advance(&self, field: &mut AlienField, rng: &mut impl Rng) {
        let target = field.target();
        let bounds = field.bounds();
        for alien in field.store_mut().iter_mut() {
            self.policy(alien.kind).step(alien, target, bounds, rng);
        }
    }
}
