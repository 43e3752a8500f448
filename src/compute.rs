/// The update engine.
///
/// `GameState` owns the player and the lasers outright and shares the alien
/// field with the background workers. `tick` advances exactly one frame and
/// hands back an immutable `Snapshot` for the renderer. All randomness comes
/// through an injected RNG so tests can drive it deterministically.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::GameConfig;
use crate::entities::{Alien, AlienId, AlienKind, EndReason, Laser, LaserId, Player, Rgb};
use crate::error::{GameError, Result};
use crate::geometry::{intersects, Direction, Rect, Vec2};
use crate::motion::{move_laser, move_player};
use crate::store::{AlienField, EntityStore, SharedAliens};

// ── Input & output ───────────────────────────────────────────────────────────

/// Held state of every logical key, sampled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub quit: bool,
}

/// A filled rectangle to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectSprite {
    pub rect: Rect,
    pub color: Rgb,
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub player: RectSprite,
    pub lasers: Vec<RectSprite>,
    pub aliens: Vec<RectSprite>,
    pub running: bool,
    pub end_reason: Option<EndReason>,
    pub frame: u64,
}

// ── GameState ────────────────────────────────────────────────────────────────

pub struct GameState {
    pub player: Player,
    lasers: EntityStore<Laser>,
    aliens: SharedAliens,
    running: bool,
    end_reason: Option<EndReason>,
    /// Sum of every `dt` passed to `tick` while running.
    clock: Duration,
    last_shot: Option<Duration>,
    frame: u64,
    config: GameConfig,
}

impl GameState {
    /// Build the initial state: player at its start position facing up, plus
    /// `config.aliens.initial` randomly placed aliens.
    pub fn new(config: GameConfig, rng: &mut impl Rng) -> Result<Self> {
        config.validate()?;
        let bounds = config.bounds();
        let size = config.player.size;
        let mut rect = Rect::new(config.player.start_x, config.player.start_y, size, size)?;
        rect.clamp_within(bounds);

        let mut field = AlienField::new(bounds, config.aliens.size);
        for _ in 0..config.aliens.initial {
            field.spawn_random(rng);
        }
        field.set_target(rect.origin());

        Ok(Self {
            player: Player {
                rect,
                facing: Direction::Up,
            },
            lasers: EntityStore::new(),
            aliens: field.into_shared(),
            running: true,
            end_reason: None,
            clock: Duration::ZERO,
            last_shot: None,
            frame: 0,
            config,
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn end_reason(&self) -> Option<EndReason> {
        self.end_reason
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Handle to the shared alien field, for background workers.
    pub fn alien_field(&self) -> SharedAliens {
        Arc::clone(&self.aliens)
    }

    pub fn aliens(&self) -> Vec<Alien> {
        self.aliens.lock().aliens()
    }

    pub fn lasers(&self) -> Vec<Laser> {
        self.lasers.to_vec()
    }

    // ── Entity operations ────────────────────────────────────────────────────

    pub fn spawn_alien(&mut self, kind: AlienKind, rect: Rect) -> Result<AlienId> {
        self.aliens.lock().spawn_alien(kind, rect)
    }

    /// Returns `false` if the alien was already gone.
    pub fn remove_alien(&mut self, id: AlienId) -> bool {
        self.aliens.lock().remove_alien(id)
    }

    /// Add a laser whose top-left corner is `origin`. The laser box must at
    /// least partly overlap the playfield.
    pub fn spawn_laser(&mut self, origin: Vec2, direction: Direction) -> Result<LaserId> {
        let rect = Laser::rect_at(origin, direction);
        if rect.is_degenerate() {
            return Err(GameError::DegenerateRect {
                w: rect.w,
                h: rect.h,
            });
        }
        if !intersects(&rect, &Rect::playfield(self.config.bounds())) {
            return Err(GameError::OutOfBounds {
                x: origin.x,
                y: origin.y,
            });
        }
        Ok(self.insert_laser(rect, direction))
    }

    fn insert_laser(&mut self, rect: Rect, direction: Direction) -> LaserId {
        self.lasers.insert_with(|id| Laser {
            id,
            rect,
            direction,
        })
    }

    pub fn remove_laser(&mut self, id: LaserId) -> bool {
        self.lasers.remove(id).is_some()
    }

    // ── Per-frame tick ───────────────────────────────────────────────────────

    /// Advance the simulation by one frame of length `dt`.
    ///
    /// Once the game has ended this is a no-op that keeps returning the final
    /// snapshot.
    pub fn tick(&mut self, input: &InputState, dt: Duration, rng: &mut impl Rng) -> Snapshot {
        if !self.running {
            return self.snapshot();
        }
        self.clock += dt;
        self.frame += 1;

        if input.quit {
            self.finish(EndReason::Quit);
            return self.snapshot();
        }

        // ── 1. Player ────────────────────────────────────────────────────────
        let bounds = self.config.bounds();
        move_player(&mut self.player, input, self.config.player.speed, bounds);

        // ── 2. Fire ──────────────────────────────────────────────────────────
        if input.fire && self.shot_ready() {
            let dir = self.player.facing;
            // The player is clamped inside, so its muzzle always is too.
            let rect = Laser::rect_at(Laser::muzzle(&self.player.rect, dir), dir);
            let id = self.insert_laser(rect, dir);
            self.last_shot = Some(self.clock);
            trace!(%id, ?dir, "laser fired");
        }

        // ── 3. Lasers vs aliens ──────────────────────────────────────────────
        let mut field = self.aliens.lock();
        let arena = Rect::playfield(bounds);
        let mut spent: HashSet<LaserId> = HashSet::new();
        let mut killed: HashSet<AlienId> = HashSet::new();

        for laser in self.lasers.iter_mut() {
            let start = laser.rect;
            move_laser(laser, self.config.laser.speed);
            // Test the whole path travelled this tick, so a pair overlapping
            // at tick start is always resolved and nothing tunnels through.
            let swept = start.union(&laser.rect);

            // First live alien wins; one laser takes out at most one alien.
            let hit = field
                .store()
                .iter()
                .find(|a| !killed.contains(&a.id) && intersects(&swept, &a.rect))
                .map(|a| a.id);
            if let Some(alien_id) = hit {
                trace!(laser = %laser.id, alien = %alien_id, "hit");
                spent.insert(laser.id);
                killed.insert(alien_id);
            } else if self.config.laser.cull_offscreen && !intersects(&laser.rect, &arena) {
                spent.insert(laser.id);
            }
        }

        self.lasers.retain_ids(&spent);
        field.store_mut().retain_ids(&killed);
        if !killed.is_empty() {
            debug!(kills = killed.len(), remaining = field.len(), "aliens destroyed");
        }
        if self.config.aliens.respawn_on_kill {
            for _ in 0..killed.len() {
                field.spawn_random(rng);
            }
        }

        // ── 4. Player vs aliens ──────────────────────────────────────────────
        field.set_target(self.player.rect.origin());
        let caught = field
            .store()
            .iter()
            .any(|a| intersects(&self.player.rect, &a.rect));
        if caught {
            field.halt();
        }
        drop(field);

        if caught {
            self.finish(EndReason::Caught);
        }
        self.snapshot()
    }

    fn shot_ready(&self) -> bool {
        match self.last_shot {
            None => true,
            Some(at) => self.clock.saturating_sub(at) >= self.config.shot_cooldown(),
        }
    }

    /// Running → GameOver. Only the first call has any effect.
    fn finish(&mut self, reason: EndReason) {
        if !self.running {
            return;
        }
        self.running = false;
        self.end_reason = Some(reason);
        self.aliens.lock().halt();
        info!(frame = self.frame, %reason, "game over");
    }

    /// Render view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let monochrome = self.config.aliens.monochrome;
        let aliens: Vec<RectSprite> = self
            .aliens
            .lock()
            .store()
            .iter()
            .map(|a| RectSprite {
                rect: a.rect,
                color: if monochrome { Rgb::RED } else { a.kind.color() },
            })
            .collect();
        Snapshot {
            player: RectSprite {
                rect: self.player.rect,
                color: Rgb::WHITE,
            },
            lasers: self
                .lasers
                .iter()
                .map(|l| RectSprite {
                    rect: l.rect,
                    color: Rgb::GREEN,
                })
                .collect(),
            aliens,
            running: self.running,
            end_reason: self.end_reason,
            frame: self.frame,
        }
    }
}
