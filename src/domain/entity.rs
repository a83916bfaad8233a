/// Entities: the shared spatial body and the Player built on it.
///
/// Positions are world pixel coordinates of the entity origin (top-left of
/// its sprite). The hitbox is an offset from that origin.

use super::geometry::{Hitbox, Rect};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Unit step in world axes (y grows downward).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, -1),
            Facing::Down => (0, 1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }
}

/// Held-direction snapshot for one frame.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct DirFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Anything with a world position, a hitbox and movement state.
#[derive(Clone, Debug)]
pub struct SpatialEntity {
    pub x: i32,
    pub y: i32,
    speed: i32,
    pub facing: Facing,
    pub moving: bool,
    /// Set by the collision pass for the current frame only.
    pub collision_on: bool,
    pub hitbox: Hitbox,
    /// Per-frame displacement chosen by the movement pass.
    pub velocity: (i32, i32),
}

impl SpatialEntity {
    pub fn new(x: i32, y: i32, speed: i32, hitbox: Hitbox) -> Self {
        SpatialEntity {
            x, y,
            speed: speed.max(0),
            facing: Facing::Down,
            moving: false,
            collision_on: false,
            hitbox,
            velocity: (0, 0),
        }
    }

    pub fn speed(&self) -> i32 {
        self.speed
    }

    /// Speed never goes negative.
    pub fn set_speed(&mut self, speed: i32) {
        self.speed = speed.max(0);
    }

    pub fn world_hitbox(&self) -> Rect {
        self.hitbox.at(self.x, self.y)
    }
}

// ── Player ──

pub const PLAYER_HITBOX: Hitbox = Hitbox::new(8, 16, 32, 32);
pub const ANIM_FRAMES: u8 = 4;
pub const ANIM_DELAY: u32 = 10;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: SpatialEntity,
    pub keys: u32,
    spawn: (i32, i32),
    default_speed: i32,
    anim_frame: u8,
    anim_counter: u32,
}

impl Player {
    pub fn new(spawn_x: i32, spawn_y: i32, speed: i32) -> Self {
        Player {
            body: SpatialEntity::new(spawn_x, spawn_y, speed, PLAYER_HITBOX),
            keys: 0,
            spawn: (spawn_x, spawn_y),
            default_speed: speed.max(0),
            anim_frame: 0,
            anim_counter: 0,
        }
    }

    /// Back to spawn: default speed, facing down, no keys, no pending collision.
    pub fn reset(&mut self) {
        let (x, y) = self.spawn;
        self.body = SpatialEntity::new(x, y, self.default_speed, self.body.hitbox);
        self.keys = 0;
        self.anim_frame = 0;
        self.anim_counter = 0;
    }

    pub fn anim_frame(&self) -> u8 {
        self.anim_frame
    }

    /// Advance the walk cycle while moving; snap to the idle frame otherwise.
    pub fn update_animation(&mut self) {
        if !self.body.moving {
            self.anim_frame = 0;
            self.anim_counter = 0;
            return;
        }
        self.anim_counter += 1;
        if self.anim_counter >= ANIM_DELAY {
            self.anim_counter = 0;
            self.anim_frame = (self.anim_frame + 1) % ANIM_FRAMES;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_is_never_negative() {
        let mut e = SpatialEntity::new(0, 0, -3, PLAYER_HITBOX);
        assert_eq!(e.speed(), 0);
        e.set_speed(-1);
        assert_eq!(e.speed(), 0);
        e.set_speed(6);
        assert_eq!(e.speed(), 6);
    }

    #[test]
    fn world_hitbox_follows_origin() {
        let mut e = SpatialEntity::new(100, 100, 4, PLAYER_HITBOX);
        assert_eq!(e.world_hitbox(), Rect::new(108, 116, 32, 32));
        e.x += 4;
        assert_eq!(e.world_hitbox(), Rect::new(112, 116, 32, 32));
    }

    #[test]
    fn reset_restores_spawn_state() {
        let mut p = Player::new(480, 480, 4);
        p.body.x = 10;
        p.body.set_speed(6);
        p.body.facing = Facing::Left;
        p.body.collision_on = true;
        p.keys = 3;
        p.reset();
        assert_eq!((p.body.x, p.body.y), (480, 480));
        assert_eq!(p.body.speed(), 4);
        assert_eq!(p.body.facing, Facing::Down);
        assert!(!p.body.collision_on);
        assert_eq!(p.keys, 0);
    }

    #[test]
    fn animation_cycles_only_while_moving() {
        let mut p = Player::new(0, 0, 4);
        p.body.moving = true;
        for _ in 0..ANIM_DELAY {
            p.update_animation();
        }
        assert_eq!(p.anim_frame(), 1);
        p.body.moving = false;
        p.update_animation();
        assert_eq!(p.anim_frame(), 0);
    }
}
