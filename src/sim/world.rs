/// WorldState: the complete snapshot of a running game.
///
/// The tile grid and tile table are static during play (only a map reload
/// swaps the grid). Everything dynamic (player, objects, HUD, screen) is
/// rebuilt by `reset_game`.

use std::path::PathBuf;

use crate::config::GameConfig;
use crate::domain::audio::VolumeScale;
use crate::domain::entity::Player;
use crate::domain::grid::TileGrid;
use crate::domain::movement::Bounds;
use crate::domain::object::{ContactContext, ObjectRegistry};
use crate::domain::screen::ScreenMachine;
use crate::domain::tile::TileSet;
use crate::domain::viewport::Viewport;
use crate::sim::level;

/// 16 px art at scale 3.
pub const TILE_SIZE: i32 = 48;
pub const MESSAGE_FRAMES: u32 = 90;

#[derive(Clone, Debug, Default)]
pub struct Hud {
    pub message: String,
    pub message_timer: u32,
    pub play_time: f64,
}

impl Hud {
    pub fn reset(&mut self) {
        *self = Hud::default();
    }

    /// One Playing frame: count the message down and advance the clock.
    pub fn tick(&mut self, dt: f64) {
        self.play_time += dt;
        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }
    }

    pub fn message_visible(&self) -> bool {
        self.message_timer > 0
    }
}

pub struct WorldState {
    pub grid: TileGrid,
    pub tiles: TileSet,
    pub tile_size: i32,

    pub player: Player,
    pub objects: ObjectRegistry,

    pub screen: ScreenMachine,
    pub hud: Hud,
    pub debug: bool,
    pub running: bool,

    pub music_volume: VolumeScale,
    pub se_volume: VolumeScale,

    pub viewport: Viewport,
    pub frame_dt: f64,

    // Rules from config
    pub required_keys: u32,
    pub boost_multiplier: f32,
    pub clamp_to_world: bool,
    pub confirm_quit: bool,
    pub map_path: PathBuf,
}

impl WorldState {
    pub fn new(config: &GameConfig, tiles: TileSet, grid: TileGrid) -> Self {
        let tile_size = TILE_SIZE;
        let spawn_x = grid.cols() as i32 * tile_size / 2;
        let spawn_y = grid.rows() as i32 * tile_size / 2;

        let mut world = WorldState {
            grid,
            tiles,
            tile_size,
            player: Player::new(spawn_x, spawn_y, config.player.speed),
            objects: ObjectRegistry::new(),
            screen: ScreenMachine::default(),
            hud: Hud::default(),
            debug: false,
            running: true,
            music_volume: VolumeScale::from_level(config.audio.music_volume),
            se_volume: VolumeScale::from_level(config.audio.se_volume),
            viewport: Viewport::new(config.display.screen_cols, config.display.screen_rows, tile_size),
            frame_dt: 1.0 / config.display.fps.max(1) as f64,
            required_keys: config.player.required_keys,
            boost_multiplier: config.player.boost_multiplier,
            clamp_to_world: config.world.clamp_to_world,
            confirm_quit: config.menu.confirm_quit,
            map_path: config.world.map_file.clone(),
        };
        level::place_objects(&mut world.objects, &world.grid, tile_size);
        world
    }

    /// Player, objects, HUD and screen back to a fresh game on the title menu.
    pub fn reset_game(&mut self) {
        self.player.reset();
        self.objects.clear();
        level::place_objects(&mut self.objects, &self.grid, self.tile_size);
        self.hud.reset();
        self.screen.reset();
        log::info!("Game reset");
    }

    pub fn set_message(&mut self, msg: &str) {
        self.hud.message = msg.to_string();
        self.hud.message_timer = MESSAGE_FRAMES;
    }

    pub fn world_width(&self) -> i32 {
        self.grid.cols() as i32 * self.tile_size
    }

    pub fn world_height(&self) -> i32 {
        self.grid.rows() as i32 * self.tile_size
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.clamp_to_world.then(|| Bounds {
            width: self.world_width(),
            height: self.world_height(),
            tile_size: self.tile_size,
        })
    }

    pub fn contact_context(&self) -> ContactContext {
        ContactContext {
            keys: self.player.keys,
            required_keys: self.required_keys,
            boost_multiplier: self.boost_multiplier,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_world() -> WorldState {
    let config = GameConfig::default();
    let tiles = TileSet::builtin();
    let grid = level::fallback_world(config.world.max_cols, config.world.max_rows, &tiles);
    WorldState::new(&config, tiles, grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screen::{ScreenState, TitleScreen};

    #[test]
    fn player_spawns_at_world_centre() {
        let w = test_world();
        assert_eq!((w.player.body.x, w.player.body.y), (40 * TILE_SIZE, 40 * TILE_SIZE));
        assert_eq!(w.screen.state(), ScreenState::Title(TitleScreen::MainMenu));
    }

    #[test]
    fn message_expires_after_ninety_frames() {
        let mut w = test_world();
        w.set_message("hello");
        for _ in 0..MESSAGE_FRAMES - 1 {
            w.hud.tick(w.frame_dt);
        }
        assert!(w.hud.message_visible());
        w.hud.tick(w.frame_dt);
        assert!(!w.hud.message_visible());
        assert!(w.hud.message.is_empty());
    }

    #[test]
    fn play_time_advances_one_second_per_fps_frames() {
        let mut w = test_world();
        for _ in 0..60 {
            w.hud.tick(w.frame_dt);
        }
        assert!((w.hud.play_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn reset_repopulates_objects() {
        let mut w = test_world();
        let full = w.objects.len();
        w.objects.remove(0);
        w.player.keys = 2;
        w.hud.play_time = 12.0;
        w.screen.enter(ScreenState::Ending);
        w.reset_game();
        assert_eq!(w.objects.len(), full);
        assert_eq!(w.player.keys, 0);
        assert_eq!(w.hud.play_time, 0.0);
        assert_eq!(w.screen.state(), ScreenState::Title(TitleScreen::MainMenu));
    }

    #[test]
    fn clamp_can_be_disabled() {
        let mut w = test_world();
        assert!(w.bounds().is_some());
        w.clamp_to_world = false;
        assert!(w.bounds().is_none());
    }
}
