/// Screen-level input routing.
///
/// Each discrete command is matched against the active screen; the result
/// is a transition, a cursor move, a volume change or nothing. Movement
/// keys are not routed here (they are sampled as `DirFlags` by the loop).
///
/// ┌───────────────────────┬─────────────────┬──────────────────────────────┐
/// │ Screen                │ Command         │ Effect                       │
/// ├───────────────────────┼─────────────────┼──────────────────────────────┤
/// │ Title / MainMenu      │ Up / Down       │ cursor (wrap)                │
/// │                       │ Confirm START   │ → Title / Commands           │
/// │                       │ Confirm QUIT    │ stop running                 │
/// │ Title / Commands      │ Confirm         │ → Playing, start music       │
/// │ Playing               │ Pause           │ → Paused, stop music         │
/// │                       │ Escape          │ → Options / Main             │
/// │                       │ ToggleDebug     │ debug overlay on/off         │
/// │                       │ ReloadMap       │ re-read map file             │
/// │ Paused                │ Pause           │ → Playing, resume music      │
/// │ Options / Main        │ Up / Down       │ cursor (wrap)                │
/// │                       │ Left / Right    │ volume on Music / SE rows    │
/// │                       │ Confirm Quit    │ reset (or → ConfirmQuit)     │
/// │                       │ Confirm Back    │ → Playing                    │
/// │                       │ Escape          │ → Playing                    │
/// │ Options / ConfirmQuit │ Up / Down       │ cursor (wrap)                │
/// │                       │ Confirm Yes     │ reset                        │
/// │                       │ Confirm No, Esc │ → Options / Main on Back     │
/// │ Ending                │ Confirm         │ reset                        │
/// │ any                   │ Quit            │ stop running                 │
/// └───────────────────────┴─────────────────┴──────────────────────────────┘

use crate::domain::audio::{Channel, SoundId};
use crate::domain::screen::{
    OptionsScreen, ScreenState, TitleScreen, CONFIRM_YES, OPTIONS_BACK, OPTIONS_MUSIC,
    OPTIONS_QUIT, OPTIONS_SE, TITLE_QUIT, TITLE_START,
};
use super::event::{AudioCue, GameEvent};
use super::level;
use super::world::WorldState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Escape,
    Pause,
    ToggleDebug,
    ReloadMap,
    /// Ctrl+C / window close.
    Quit,
}

pub fn handle_command(world: &mut WorldState, cmd: Command) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if cmd == Command::Quit {
        log::info!("Quit requested");
        world.running = false;
        return events;
    }

    match world.screen.state() {
        ScreenState::Title(TitleScreen::MainMenu) => title_menu(world, cmd, &mut events),
        ScreenState::Title(TitleScreen::Commands) => {
            if cmd == Command::Confirm {
                world.screen.enter(ScreenState::Playing);
                events.push(GameEvent::Audio(AudioCue::PlayMusic(SoundId::GameTheme)));
            }
        }
        ScreenState::Playing => playing(world, cmd, &mut events),
        ScreenState::Paused => {
            if cmd == Command::Pause {
                world.screen.enter(ScreenState::Playing);
                events.push(GameEvent::Audio(AudioCue::ResumeMusic));
            }
        }
        ScreenState::Options(OptionsScreen::Main) => options_menu(world, cmd, &mut events),
        ScreenState::Options(OptionsScreen::ConfirmQuit) => confirm_quit(world, cmd, &mut events),
        ScreenState::Ending => {
            if cmd == Command::Confirm {
                full_reset(world, &mut events);
            }
        }
    }

    events
}

// ── Per-screen handlers ──

fn title_menu(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    match cmd {
        Command::Up | Command::Down => move_cursor(world, cmd, events),
        Command::Confirm => match world.screen.cursor() {
            TITLE_START => {
                menu_select(events);
                world.screen.enter(ScreenState::Title(TitleScreen::Commands));
            }
            TITLE_QUIT => {
                log::info!("Quit from title menu");
                world.running = false;
            }
            _ => {}
        },
        _ => {}
    }
}

fn playing(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    match cmd {
        Command::Pause => {
            world.screen.enter(ScreenState::Paused);
            events.push(GameEvent::Audio(AudioCue::StopMusic));
        }
        Command::Escape => world.screen.enter(ScreenState::Options(OptionsScreen::Main)),
        Command::ToggleDebug => world.debug = !world.debug,
        Command::ReloadMap => {
            log::info!("Reloading map {}", world.map_path.display());
            events.push(level::reload_map(world));
        }
        _ => {}
    }
}

fn options_menu(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    let cursor = world.screen.cursor();
    match cmd {
        Command::Up | Command::Down => move_cursor(world, cmd, events),
        Command::Left | Command::Right => {
            let (channel, scale) = match cursor {
                OPTIONS_MUSIC => (Channel::Music, &mut world.music_volume),
                OPTIONS_SE => (Channel::Effects, &mut world.se_volume),
                _ => return,
            };
            if cmd == Command::Left { scale.decrease() } else { scale.increase() }
            events.push(GameEvent::Audio(AudioCue::SetVolume(channel, *scale)));
            menu_select(events);
        }
        Command::Confirm => match cursor {
            OPTIONS_QUIT if world.confirm_quit => {
                menu_select(events);
                world.screen.enter(ScreenState::Options(OptionsScreen::ConfirmQuit));
            }
            OPTIONS_QUIT => full_reset(world, events),
            OPTIONS_BACK => {
                menu_select(events);
                world.screen.enter(ScreenState::Playing);
            }
            _ => {}
        },
        Command::Escape => world.screen.enter(ScreenState::Playing),
        _ => {}
    }
}

fn confirm_quit(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    match cmd {
        Command::Up | Command::Down => move_cursor(world, cmd, events),
        Command::Confirm if world.screen.cursor() == CONFIRM_YES => full_reset(world, events),
        Command::Confirm | Command::Escape => {
            world.screen.enter(ScreenState::Options(OptionsScreen::Main));
            world.screen.set_cursor(OPTIONS_BACK);
        }
        _ => {}
    }
}

// ── Helpers ──

fn move_cursor(world: &mut WorldState, cmd: Command, events: &mut Vec<GameEvent>) {
    if cmd == Command::Up {
        world.screen.cursor_up();
    } else {
        world.screen.cursor_down();
    }
    menu_select(events);
}

fn menu_select(events: &mut Vec<GameEvent>) {
    events.push(GameEvent::Audio(AudioCue::PlaySe(SoundId::MenuSelect)));
}

fn full_reset(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    world.reset_game();
    events.push(GameEvent::Audio(AudioCue::StopMusic));
    events.push(GameEvent::GameReset);
}
