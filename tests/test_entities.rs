use std::collections::HashSet;

use alien_invader::entities::*;
use alien_invader::geometry::{Direction, Rect, Vec2};
use alien_invader::store::EntityStore;

const SHOOTER: Rect = Rect { x: 390, y: 550, w: 20, h: 20 };

#[test]
fn alien_colours() {
    assert_eq!(AlienKind::Red.color(), Rgb::new(255, 0, 0));
    assert_eq!(AlienKind::Brown.color(), Rgb::new(139, 69, 19));
    assert_eq!(AlienKind::Blue.color(), Rgb::new(0, 0, 255));
}

#[test]
fn muzzle_sits_on_leading_edge() {
    assert_eq!(Laser::muzzle(&SHOOTER, Direction::Up), Vec2::new(399, 550));
    assert_eq!(Laser::muzzle(&SHOOTER, Direction::Down), Vec2::new(399, 569));
    assert_eq!(Laser::muzzle(&SHOOTER, Direction::Left), Vec2::new(390, 559));
    assert_eq!(Laser::muzzle(&SHOOTER, Direction::Right), Vec2::new(409, 559));
}

#[test]
fn laser_is_long_along_travel_axis() {
    let origin = Vec2::new(10, 20);
    assert_eq!(Laser::rect_at(origin, Direction::Up), Rect { x: 10, y: 20, w: 2, h: 10 });
    assert_eq!(Laser::rect_at(origin, Direction::Down), Rect { x: 10, y: 20, w: 2, h: 10 });
    assert_eq!(Laser::rect_at(origin, Direction::Left), Rect { x: 10, y: 20, w: 10, h: 2 });
    assert_eq!(Laser::rect_at(origin, Direction::Right), Rect { x: 10, y: 20, w: 10, h: 2 });
}

#[test]
fn ids_and_reasons_display() {
    assert_eq!(AlienId(7).to_string(), "alien#7");
    assert_eq!(LaserId(3).to_string(), "laser#3");
    assert_eq!(EndReason::Caught.to_string(), "touched by an alien");
    assert_eq!(EndReason::Quit.to_string(), "quit");
}

// ── EntityStore ───────────────────────────────────────────────────────────────

fn laser(id: LaserId) -> Laser {
    Laser {
        id,
        rect: Laser::rect_at(Vec2::new(0, 0), Direction::Up),
        direction: Direction::Up,
    }
}

#[test]
fn store_ids_are_never_reused() {
    let mut store: EntityStore<Laser> = EntityStore::new();
    let a = store.insert_with(laser);
    let b = store.insert_with(laser);
    assert!(store.remove(b).is_some());
    let c = store.insert_with(laser);
    assert!(a != b && b != c && a != c);
    assert!(store.contains(a) && store.contains(c));
    assert!(!store.contains(b));
}

#[test]
fn store_keeps_insertion_order() {
    let mut store: EntityStore<Laser> = EntityStore::new();
    let ids: Vec<_> = (0..4).map(|_| store.insert_with(laser)).collect();
    store.remove(ids[1]);
    let left: Vec<_> = store.iter().map(|l| l.id).collect();
    assert_eq!(left, vec![ids[0], ids[2], ids[3]]);
}

#[test]
fn store_double_remove_is_noop() {
    let mut store: EntityStore<Laser> = EntityStore::new();
    let id = store.insert_with(laser);
    assert!(store.remove(id).is_some());
    assert!(store.remove(id).is_none());
    assert!(store.is_empty());
}

#[test]
fn store_retain_ids_drops_marked_only() {
    let mut store: EntityStore<Laser> = EntityStore::new();
    let ids: Vec<_> = (0..5).map(|_| store.insert_with(laser)).collect();
    let marked: HashSet<_> = [ids[0], ids[3], LaserId(999)].into_iter().collect();
    assert_eq!(store.retain_ids(&marked), 2);
    let left: Vec<_> = store.iter().map(|l| l.id).collect();
    assert_eq!(left, vec![ids[1], ids[2], ids[4]]);
}

#[test]
fn store_get_mut_edits_in_place() {
    let mut store: EntityStore<Laser> = EntityStore::new();
    let id = store.insert_with(laser);
    if let Some(l) = store.get_mut(id) {
        l.rect.y = 42;
    }
    assert_eq!(store.get(id).map(|l| l.rect.y), Some(42));
}
