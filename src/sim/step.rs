/// The update function: advances the world by one frame.
///
/// Processing order (Playing only):
///   1. HUD timers (message countdown, play clock)
///   2. Facing from held directions
///   3. Tile collision probe
///   4. Object collision probe, contact effects applied immediately
///   5. Velocity + position (vetoed by any collision)
///   6. Walk animation
///
/// Contact effects run before the velocity is finalised, so picking up
/// Boots already speeds up the frame that touched them.

use crate::domain::collision::{self, MapView};
use crate::domain::entity::DirFlags;
use crate::domain::movement;
use crate::domain::object::Effect;
use crate::domain::screen::ScreenState;
use super::event::{AudioCue, GameEvent};
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn update(world: &mut WorldState, input: DirFlags) -> Vec<GameEvent> {
    if world.screen.state() != ScreenState::Playing { return vec![]; }

    let mut events = Vec::new();
    world.hud.tick(world.frame_dt);

    resolve_player_movement(world, input, &mut events);
    world.player.update_animation();

    events
}

// ══════════════════════════════════════════════════════════════
// Movement
// ══════════════════════════════════════════════════════════════

fn resolve_player_movement(world: &mut WorldState, input: DirFlags, events: &mut Vec<GameEvent>) {
    let Some(dir) = movement::begin_move(&mut world.player.body, input) else { return };

    let map = MapView { grid: &world.grid, tiles: &world.tiles, tile_size: world.tile_size };
    collision::predict_tile_collision(&mut world.player.body, &map);

    let (w, h) = (world.world_width(), world.world_height());
    if let Some(index) = collision::predict_object_collision(&mut world.player.body, &world.objects, w, h, true) {
        apply_contact(world, index, events);
    }

    let bounds = world.bounds();
    movement::finish_move(&mut world.player.body, dir, bounds);
}

// ══════════════════════════════════════════════════════════════
// Contact effects
// ══════════════════════════════════════════════════════════════

/// Run the touched object's reaction. A `RemoveSelf` is deferred until
/// the other effects have seen the object.
fn apply_contact(world: &mut WorldState, index: usize, events: &mut Vec<GameEvent>) {
    let Some(obj) = world.objects.get(index) else { return };
    let kind = obj.kind;
    let effects = obj.on_player_contact(&world.contact_context());

    let mut remove = false;
    for effect in effects {
        match effect {
            Effect::RemoveSelf => remove = true,
            Effect::AddKey => {
                world.player.keys += 1;
                events.push(GameEvent::KeyPicked { keys: world.player.keys });
            }
            Effect::BoostSpeed(mult) => {
                let speed = (world.player.body.speed() as f32 * mult) as i32;
                world.player.body.set_speed(speed);
                events.push(GameEvent::BootsPicked { speed: world.player.body.speed() });
            }
            Effect::OpenChest => {
                if let Some(o) = world.objects.get_mut(index) {
                    o.open();
                }
                events.push(GameEvent::ChestOpened);
            }
            Effect::PlaySound(id) => events.push(GameEvent::Audio(AudioCue::PlaySe(id))),
            Effect::StopMusic => events.push(GameEvent::Audio(AudioCue::StopMusic)),
            Effect::ShowMessage(text) => world.set_message(&text),
            Effect::ChangeScreen(state) => world.screen.enter(state),
        }
    }

    if remove {
        world.objects.remove(index);
        log::debug!("{} collected, {} objects left", kind.name(), world.objects.len());
    }
}
