/// Predictive collision: where will the entity's hitbox be next frame,
/// and does anything there stop it?
///
/// Both checks look one step of `speed` ahead along the facing axis. They
/// never move the entity; they only set `collision_on` (and, for objects,
/// report which one was touched).
///
/// ## Tile probe
/// ┌────────┬──────────────────────┬──────────────────────────────┐
/// │ Facing │ Shifted edge         │ Probed cells                 │
/// ├────────┼──────────────────────┼──────────────────────────────┤
/// │ Up     │ top    − speed       │ (left, top)   (right, top)   │
/// │ Down   │ bottom + speed       │ (left, bottom)(right, bottom)│
/// │ Left   │ left   − speed       │ (left, top)   (left, bottom) │
/// │ Right  │ right  + speed       │ (right, top)  (right, bottom)│
/// └────────┴──────────────────────┴──────────────────────────────┘
/// A probe outside the grid counts as a collision.

use super::entity::{Facing, SpatialEntity};
use super::grid::TileGrid;
use super::object::ObjectRegistry;
use super::tile::TileSet;

/// Read-only view of the static world used by the tile probe.
pub struct MapView<'a> {
    pub grid: &'a TileGrid,
    pub tiles: &'a TileSet,
    pub tile_size: i32,
}

impl<'a> MapView<'a> {
    /// Pixel coordinate → cell index (floor division, so negatives stay off-grid).
    #[inline]
    pub fn cell_of(&self, px: i32) -> i32 {
        px.div_euclid(self.tile_size)
    }

    /// Off-grid cells block.
    pub fn is_blocking_cell(&self, col: i32, row: i32) -> bool {
        match self.grid.get(col, row) {
            Some(index) => self.tiles.is_collidable(index),
            None => true,
        }
    }

    pub fn is_blocking_px(&self, px: i32, py: i32) -> bool {
        self.is_blocking_cell(self.cell_of(px), self.cell_of(py))
    }
}

/// Tile check. Sets and returns `entity.collision_on`.
pub fn predict_tile_collision(entity: &mut SpatialEntity, map: &MapView) -> bool {
    let hb = entity.world_hitbox();
    let speed = entity.speed();
    let (mut left, mut right, mut top, mut bottom) = (hb.x, hb.right(), hb.y, hb.bottom());

    let (a, b) = match entity.facing {
        Facing::Up => {
            top -= speed;
            ((left, top), (right, top))
        }
        Facing::Down => {
            bottom += speed;
            ((left, bottom), (right, bottom))
        }
        Facing::Left => {
            left -= speed;
            ((left, top), (left, bottom))
        }
        Facing::Right => {
            right += speed;
            ((right, top), (right, bottom))
        }
    };

    let hit = map.is_blocking_px(a.0, a.1) || map.is_blocking_px(b.0, b.1);
    entity.collision_on = hit;
    hit
}

/// Object check. Returns the index of the last object touched when
/// `is_player` is set; touching a collidable object sets `collision_on`.
pub fn predict_object_collision(
    entity: &mut SpatialEntity,
    objects: &ObjectRegistry,
    world_w: i32,
    world_h: i32,
    is_player: bool,
) -> Option<usize> {
    if entity.x < 0 || entity.y < 0 || entity.x >= world_w || entity.y >= world_h {
        return None;
    }

    let (fx, fy) = entity.facing.delta();
    let speed = entity.speed();
    let probe = entity.world_hitbox().translated(fx * speed, fy * speed);

    let mut touched = None;
    for (i, obj) in objects.iter().enumerate() {
        if !probe.intersects(&obj.world_hitbox()) {
            continue;
        }
        if obj.is_collidable() {
            entity.collision_on = true;
        }
        if is_player {
            touched = Some(i);
        }
    }
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PLAYER_HITBOX;
    use crate::domain::object::{GameObject, ObjectKind};

    const T: i32 = 48;
    const GRASS: usize = 0;
    const WATER: usize = 2;

    fn open_grid() -> TileGrid {
        TileGrid::filled(10, 10, GRASS)
    }

    fn entity_at(col: i32, row: i32, facing: Facing) -> SpatialEntity {
        let mut e = SpatialEntity::new(col * T, row * T, 4, PLAYER_HITBOX);
        e.facing = facing;
        e
    }

    #[test]
    fn open_ground_does_not_collide() {
        let grid = open_grid();
        let tiles = TileSet::builtin();
        let map = MapView { grid: &grid, tiles: &tiles, tile_size: T };
        for facing in [Facing::Up, Facing::Down, Facing::Left, Facing::Right] {
            let mut e = entity_at(5, 5, facing);
            assert!(!predict_tile_collision(&mut e, &map), "{facing:?}");
            assert!(!e.collision_on);
        }
    }

    #[test]
    fn wall_ahead_within_speed_blocks() {
        let mut grid = open_grid();
        grid.set(6, 5, WATER);
        let tiles = TileSet::builtin();
        let map = MapView { grid: &grid, tiles: &tiles, tile_size: T };
        // Hitbox right edge 2px short of the water tile.
        let mut e = SpatialEntity::new(6 * T - 8 - 32 - 2, 5 * T - 16, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert!(predict_tile_collision(&mut e, &map));
        assert!(e.collision_on);
        // Same spot facing away is clear.
        e.facing = Facing::Left;
        assert!(!predict_tile_collision(&mut e, &map));
    }

    #[test]
    fn off_grid_probe_collides() {
        let grid = open_grid();
        let tiles = TileSet::builtin();
        let map = MapView { grid: &grid, tiles: &tiles, tile_size: T };
        let mut e = SpatialEntity::new(-8, 0, 4, PLAYER_HITBOX);
        e.facing = Facing::Left;
        assert!(predict_tile_collision(&mut e, &map));
        let mut e = SpatialEntity::new(0, -16, 4, PLAYER_HITBOX);
        e.facing = Facing::Up;
        assert!(predict_tile_collision(&mut e, &map));
    }

    #[test]
    fn far_edge_probe_collides() {
        let grid = open_grid();
        let tiles = TileSet::builtin();
        let map = MapView { grid: &grid, tiles: &tiles, tile_size: T };
        let edge = 10 * T;
        // Hitbox right/bottom edge 2px inside the last column/row.
        let mut e = SpatialEntity::new(edge - 8 - 32 - 2, 4 * T, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert!(predict_tile_collision(&mut e, &map));
        e.facing = Facing::Left;
        assert!(!predict_tile_collision(&mut e, &map));

        let mut e = SpatialEntity::new(4 * T, edge - 16 - 32 - 2, 4, PLAYER_HITBOX);
        e.facing = Facing::Down;
        assert!(predict_tile_collision(&mut e, &map));
        e.facing = Facing::Up;
        assert!(!predict_tile_collision(&mut e, &map));
    }

    #[test]
    fn probe_never_moves_entity() {
        let grid = open_grid();
        let tiles = TileSet::builtin();
        let map = MapView { grid: &grid, tiles: &tiles, tile_size: T };
        let mut e = entity_at(0, 0, Facing::Up);
        predict_tile_collision(&mut e, &map);
        assert_eq!((e.x, e.y), (0, 0));
    }

    #[test]
    fn key_is_reported_but_not_blocking() {
        let mut objects = ObjectRegistry::new();
        objects.push(GameObject::at_tile(ObjectKind::Key, 3, 2, T));
        // Player directly left of the key, hitbox touching its edge.
        let mut e = SpatialEntity::new(3 * T - 40, 2 * T - 16, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        let hit = predict_object_collision(&mut e, &objects, 10 * T, 10 * T, true);
        assert_eq!(hit, Some(0));
        assert!(!e.collision_on);
    }

    #[test]
    fn chest_blocks() {
        let mut objects = ObjectRegistry::new();
        objects.push(GameObject::at_tile(ObjectKind::Chest { open: false }, 3, 2, T));
        let mut e = SpatialEntity::new(3 * T - 40, 2 * T - 16, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert_eq!(predict_object_collision(&mut e, &objects, 10 * T, 10 * T, true), Some(0));
        assert!(e.collision_on);
    }

    #[test]
    fn non_player_gets_no_index() {
        let mut objects = ObjectRegistry::new();
        objects.push(GameObject::at_tile(ObjectKind::Chest { open: false }, 3, 2, T));
        let mut e = SpatialEntity::new(3 * T - 40, 2 * T - 16, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert_eq!(predict_object_collision(&mut e, &objects, 10 * T, 10 * T, false), None);
        assert!(e.collision_on);
    }

    #[test]
    fn last_match_wins() {
        let mut objects = ObjectRegistry::new();
        objects.push(GameObject::at_tile(ObjectKind::Key, 3, 2, T));
        objects.push(GameObject::at_tile(ObjectKind::Key, 3, 2, T));
        let mut e = SpatialEntity::new(3 * T - 40, 2 * T - 16, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert_eq!(predict_object_collision(&mut e, &objects, 10 * T, 10 * T, true), Some(1));
    }

    #[test]
    fn origin_outside_world_is_ignored() {
        let mut objects = ObjectRegistry::new();
        objects.push(GameObject::at_tile(ObjectKind::Chest { open: false }, 0, 0, T));
        let mut e = SpatialEntity::new(-10, 0, 4, PLAYER_HITBOX);
        e.facing = Facing::Right;
        assert_eq!(predict_object_collision(&mut e, &objects, 10 * T, 10 * T, true), None);
        assert!(!e.collision_on);
    }
}
