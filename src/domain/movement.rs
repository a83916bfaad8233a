/// Movement rules for one entity per frame.
///
/// Pure functions plus two entry points that bracket the collision pass:
/// `begin_move` turns held directions into a facing, `finish_move` turns
/// the (possibly vetoed) intent into a displacement.
///
/// ┌──────────────┬──────────────────────────────────────┐
/// │ Intent       │ Result                               │
/// ├──────────────┼──────────────────────────────────────┤
/// │ (0, 0)       │ not moving, no collision pass        │
/// │ |dy| > |dx|  │ facing Up/Down                       │
/// │ otherwise    │ facing Left/Right (ties horizontal)  │
/// │ collision    │ velocity (0, 0)                      │
/// │ diagonal     │ each axis × speed / √2, rounded      │
/// │ axial        │ direction × speed                    │
/// └──────────────┴──────────────────────────────────────┘

use super::entity::{DirFlags, Facing, SpatialEntity};

/// Combine held directions into a step in {-1, 0, 1}². Opposites cancel.
pub fn intended_direction(flags: DirFlags) -> (i32, i32) {
    let dx = flags.right as i32 - flags.left as i32;
    let dy = flags.down as i32 - flags.up as i32;
    (dx, dy)
}

pub fn resolve_facing(dx: i32, dy: i32) -> Option<Facing> {
    if dy.abs() > dx.abs() {
        Some(if dy > 0 { Facing::Down } else { Facing::Up })
    } else if dx != 0 {
        Some(if dx > 0 { Facing::Right } else { Facing::Left })
    } else {
        None
    }
}

/// Per-axis displacement for a direction at `speed`.
pub fn normalize_velocity(dx: i32, dy: i32, speed: i32) -> (i32, i32) {
    if dx != 0 && dy != 0 {
        let s = speed as f64 / std::f64::consts::SQRT_2;
        // f64::round is half-away-from-zero.
        ((dx as f64 * s).round() as i32, (dy as f64 * s).round() as i32)
    } else {
        (dx * speed, dy * speed)
    }
}

/// Keep an origin coordinate inside `[0, world_size - tile_size]`.
pub fn clamp_to_world(v: i32, world_size: i32, tile_size: i32) -> i32 {
    v.clamp(0, (world_size - tile_size).max(0))
}

/// World extent used for clamping.
#[derive(Clone, Copy, Debug)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
    pub tile_size: i32,
}

/// Start of the frame: returns the intended direction, or `None` when
/// nothing is held (the entity is then marked idle).
pub fn begin_move(entity: &mut SpatialEntity, flags: DirFlags) -> Option<(i32, i32)> {
    let (dx, dy) = intended_direction(flags);
    match resolve_facing(dx, dy) {
        Some(facing) => {
            entity.facing = facing;
            entity.collision_on = false;
            Some((dx, dy))
        }
        None => {
            entity.moving = false;
            entity.velocity = (0, 0);
            None
        }
    }
}

/// End of the frame: apply the velocity unless the collision pass vetoed it.
pub fn finish_move(entity: &mut SpatialEntity, dir: (i32, i32), bounds: Option<Bounds>) {
    entity.velocity = if entity.collision_on {
        (0, 0)
    } else {
        normalize_velocity(dir.0, dir.1, entity.speed())
    };

    entity.x += entity.velocity.0;
    entity.y += entity.velocity.1;

    if let Some(b) = bounds {
        entity.x = clamp_to_world(entity.x, b.width, b.tile_size);
        entity.y = clamp_to_world(entity.y, b.height, b.tile_size);
    }

    entity.moving = entity.velocity != (0, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PLAYER_HITBOX;
    use proptest::prelude::*;

    fn flags(up: bool, down: bool, left: bool, right: bool) -> DirFlags {
        DirFlags { up, down, left, right }
    }

    #[test]
    fn opposites_cancel() {
        assert_eq!(intended_direction(flags(true, true, false, false)), (0, 0));
        assert_eq!(intended_direction(flags(true, false, true, true)), (0, -1));
    }

    #[test]
    fn facing_tie_goes_horizontal() {
        assert_eq!(resolve_facing(1, 1), Some(Facing::Right));
        assert_eq!(resolve_facing(-1, -1), Some(Facing::Left));
        assert_eq!(resolve_facing(1, 2), Some(Facing::Down));
        assert_eq!(resolve_facing(0, -1), Some(Facing::Up));
        assert_eq!(resolve_facing(0, 0), None);
    }

    #[test]
    fn diagonal_speed_four() {
        assert_eq!(normalize_velocity(1, -1, 4), (3, -3));
        assert_eq!(normalize_velocity(-1, 1, 4), (-3, 3));
        assert_eq!(normalize_velocity(1, 0, 4), (4, 0));
    }

    #[test]
    fn up_right_moves_plus_three_minus_three() {
        let mut e = SpatialEntity::new(480, 480, 4, PLAYER_HITBOX);
        let dir = begin_move(&mut e, flags(true, false, false, true)).unwrap();
        assert_eq!(e.facing, Facing::Right);
        finish_move(&mut e, dir, None);
        assert_eq!((e.x, e.y), (483, 477));
        assert!(e.moving);
    }

    #[test]
    fn collision_zeroes_velocity() {
        let mut e = SpatialEntity::new(100, 100, 4, PLAYER_HITBOX);
        let dir = begin_move(&mut e, flags(false, false, false, true)).unwrap();
        e.collision_on = true;
        finish_move(&mut e, dir, None);
        assert_eq!((e.x, e.y), (100, 100));
        assert!(!e.moving);
    }

    #[test]
    fn nothing_held_is_idle() {
        let mut e = SpatialEntity::new(100, 100, 4, PLAYER_HITBOX);
        e.moving = true;
        e.facing = Facing::Left;
        assert!(begin_move(&mut e, DirFlags::default()).is_none());
        assert!(!e.moving);
        assert_eq!(e.facing, Facing::Left);
    }

    #[test]
    fn clamps_when_bounded() {
        let b = Bounds { width: 480, height: 480, tile_size: 48 };
        let mut e = SpatialEntity::new(2, 430, 4, PLAYER_HITBOX);
        let dir = begin_move(&mut e, flags(false, true, true, false)).unwrap();
        finish_move(&mut e, dir, Some(b));
        assert_eq!(e.x, 0);
        assert_eq!(e.y, 432);
    }

    proptest! {
        #[test]
        fn diagonal_preserves_speed(speed in 0i32..200, sx in prop::bool::ANY, sy in prop::bool::ANY) {
            let dx = if sx { 1 } else { -1 };
            let dy = if sy { 1 } else { -1 };
            let (vx, vy) = normalize_velocity(dx, dy, speed);
            let mag = ((vx * vx + vy * vy) as f64).sqrt();
            prop_assert!((mag - speed as f64).abs() <= 1.0);
            prop_assert_eq!(vx.abs(), vy.abs());
        }
    }
}
