/// Id-keyed entity collections.
///
/// Removal during a sweep is never done in place: callers collect the ids they
/// want gone and hand them to `retain_ids` once the sweep is over, so no
/// element is skipped or visited twice.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use tracing::debug;

use crate::entities::{Alien, AlienId, AlienKind, Laser, LaserId};
use crate::error::{GameError, Result};
use crate::geometry::{intersects, Rect, Vec2};

// ── Entity traits ────────────────────────────────────────────────────────────

pub trait EntityId: Copy + Eq + Hash + fmt::Debug {
    fn from_raw(raw: u64) -> Self;
}

impl EntityId for AlienId {
    fn from_raw(raw: u64) -> Self {
        AlienId(raw)
    }
}

impl EntityId for LaserId {
    fn from_raw(raw: u64) -> Self {
        LaserId(raw)
    }
}

pub trait Entity {
    type Id: EntityId;

    fn id(&self) -> Self::Id;
    fn rect(&self) -> &Rect;
}

impl Entity for Alien {
    type Id = AlienId;

    fn id(&self) -> AlienId {
        self.id
    }

    fn rect(&self) -> &Rect {
        &self.rect
    }
}

impl Entity for Laser {
    type Id = LaserId;

    fn id(&self) -> LaserId {
        self.id
    }

    fn rect(&self) -> &Rect {
        &self.rect
    }
}

// ── EntityStore ──────────────────────────────────────────────────────────────

/// Insertion-ordered collection that hands out fresh ids.
#[derive(Clone, Debug)]
pub struct EntityStore<T: Entity> {
    items: Vec<T>,
    next_id: u64,
}

impl<T: Entity> Default for EntityStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityStore<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 0,
        }
    }

    /// Allocate an id and insert the entity built from it.
    pub fn insert_with(&mut self, make: impl FnOnce(T::Id) -> T) -> T::Id {
        let id = T::Id::from_raw(self.next_id);
        self.next_id += 1;
        self.items.push(make(id));
        id
    }

    /// Remove one entity. Removing an id that is already gone returns `None`.
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let idx = self.items.iter().position(|e| e.id() == id)?;
        Some(self.items.remove(idx))
    }

    /// Drop every entity whose id is in `marked`, in a single pass.
    /// Returns how many were removed.
    pub fn retain_ids(&mut self, marked: &HashSet<T::Id>) -> usize {
        if marked.is_empty() {
            return 0;
        }
        let before = self.items.len();
        self.items.retain(|e| !marked.contains(&e.id()));
        before - self.items.len()
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Entity + Clone> EntityStore<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

// ── AlienField ───────────────────────────────────────────────────────────────

/// Alien collection shared between the tick loop and background workers.
pub type SharedAliens = Arc<Mutex<AlienField>>;

/// Everything the background mover needs, behind one lock: the aliens, the
/// playfield they are confined to, and the player position published by the
/// most recent tick.
#[derive(Clone, Debug)]
pub struct AlienField {
    aliens: EntityStore<Alien>,
    bounds: Vec2,
    alien_size: i32,
    target: Vec2,
    halted: bool,
}

impl AlienField {
    pub fn new(bounds: Vec2, alien_size: i32) -> Self {
        Self {
            aliens: EntityStore::new(),
            bounds,
            alien_size,
            target: Vec2::default(),
            halted: false,
        }
    }

    pub fn into_shared(self) -> SharedAliens {
        Arc::new(Mutex::new(self))
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn alien_size(&self) -> i32 {
        self.alien_size
    }

    /// Player position as of the last tick; homing aliens chase this.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn set_target(&mut self, target: Vec2) {
        self.target = target;
    }

    /// Freeze the field once the game is over; background jobs check this
    /// under the lock and leave the aliens alone from then on.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Insert an alien at `rect`. The rect must have positive extent and at
    /// least partly overlap the playfield; it is then clamped inside.
    pub fn spawn_alien(&mut self, kind: AlienKind, rect: Rect) -> Result<AlienId> {
        if rect.is_degenerate() {
            return Err(GameError::DegenerateRect {
                w: rect.w,
                h: rect.h,
            });
        }
        if !intersects(&rect, &Rect::playfield(self.bounds)) {
            return Err(GameError::OutOfBounds {
                x: rect.x,
                y: rect.y,
            });
        }
        let mut rect = rect;
        rect.clamp_within(self.bounds);
        let id = self.aliens.insert_with(|id| Alien {
            id,
            rect,
            kind,
            heading: None,
        });
        debug!(%id, ?kind, x = rect.x, y = rect.y, "alien spawned");
        Ok(id)
    }

    /// Insert an alien of random kind at a random in-bounds position.
    pub fn spawn_random(&mut self, rng: &mut impl Rng) -> AlienId {
        let size = self.alien_size;
        let x = rng.gen_range(0..=(self.bounds.x - size).max(0));
        let y = rng.gen_range(0..=(self.bounds.y - size).max(0));
        let kind = AlienKind::random(rng);
        let id = self.aliens.insert_with(|id| Alien {
            id,
            rect: Rect {
                x,
                y,
                w: size,
                h: size,
            },
            kind,
            heading: None,
        });
        debug!(%id, ?kind, x, y, "alien spawned");
        id
    }

    /// Returns `false` if the alien was already gone.
    pub fn remove_alien(&mut self, id: AlienId) -> bool {
        self.aliens.remove(id).is_some()
    }

    /// Cloned view of every alien, in insertion order.
    pub fn aliens(&self) -> Vec<Alien> {
        self.aliens.to_vec()
    }

    pub fn store(&self) -> &EntityStore<Alien> {
        &self.aliens
    }

    pub fn store_mut(&mut self) -> &mut EntityStore<Alien> {
        &mut self.aliens
    }

    pub fn len(&self) -> usize {
        self.aliens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliens.is_empty()
    }
}
