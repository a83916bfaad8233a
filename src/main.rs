/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::{execute, terminal};

use config::GameConfig;
use domain::entity::DirFlags;
use domain::tile::TileSet;
use sim::dispatch::handle_command;
use sim::event::{AudioCue, GameEvent};
use sim::level;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(1);

/// Frames simulated per loop iteration at most; after a long stall the
/// backlog is dropped.
const MAX_CATCH_UP: u32 = 5;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);
    for notice in &config.notices {
        log::info!("{notice}");
    }

    let tiles = TileSet::load(config.world.tiles_file.as_deref());
    let grid = level::initial_grid(
        &config.world.map_file,
        config.world.max_cols,
        config.world.max_rows,
        &tiles,
    );
    let mut world = WorldState::new(&config, tiles, grid);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            std::io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    log::debug!("Keyboard release events: {enhanced}");

    let sound = SoundEngine::new(&config.audio.sounds_dir, world.music_volume, world.se_volume);

    let result = game_loop(&mut world, &mut renderer, sound.as_ref(), &config, enhanced);

    if enhanced {
        let _ = execute!(std::io::stdout(), PopKeyboardEnhancementFlags);
    }
    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("Game loop failed: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Key Quest!");
}

/// Log to the configured file; stderr belongs to the terminal UI.
/// Level comes from RUST_LOG, default info.
fn init_logging(config: &GameConfig) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match File::create(&config.log_file) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            // No log file, no logs: writing to stderr would corrupt the screen.
            eprintln!("Could not open log file {}: {e}", config.log_file.display());
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    enhanced: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let frame = Duration::from_secs_f64(world.frame_dt);
    let mut last = Instant::now();
    let mut accumulator = Duration::ZERO;

    log::info!("Game loop started at {} fps", config.display.fps);

    while world.running {
        kb.drain_events();
        gp.update();
        if kb.resized {
            renderer.invalidate();
        }
        if kb.focus_lost {
            gp.release_all();
        }

        let commands: Vec<_> = kb.commands().into_iter().chain(gp.commands()).collect();
        for cmd in commands {
            let events = handle_command(world, cmd);
            process_events(sound, &events, &mut kb, &mut gp);
            if !world.running {
                break;
            }
        }
        if !world.running {
            break;
        }

        let now = Instant::now();
        accumulator += now - last;
        last = now;

        let mut steps = 0;
        while accumulator >= frame {
            accumulator -= frame;
            steps += 1;
            if steps > MAX_CATCH_UP {
                accumulator = Duration::ZERO;
                break;
            }
            let dirs = merge_dirs(kb.dir_flags(), gp.dir_flags());
            let events = step::update(world, dirs);
            process_events(sound, &events, &mut kb, &mut gp);
            renderer.render(world)?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    log::info!("Game loop finished");
    Ok(())
}

fn merge_dirs(a: DirFlags, b: DirFlags) -> DirFlags {
    DirFlags {
        up: a.up || b.up,
        down: a.down || b.down,
        left: a.left || b.left,
        right: a.right || b.right,
    }
}

fn process_events(
    sound: Option<&SoundEngine>,
    events: &[GameEvent],
    kb: &mut InputState,
    gp: &mut GamepadState,
) {
    for event in events {
        match event {
            GameEvent::GameReset => {
                kb.clear_all();
                gp.release_all();
            }
            GameEvent::Audio(cue) => {
                let Some(sfx) = sound else { continue };
                match *cue {
                    AudioCue::PlayMusic(id) => sfx.play_music(id),
                    AudioCue::StopMusic => sfx.stop_music(),
                    AudioCue::ResumeMusic => sfx.resume_music(),
                    AudioCue::PlaySe(id) => sfx.play_se(id),
                    AudioCue::SetVolume(channel, scale) => sfx.set_volume_scale(channel, scale),
                }
            }
            other => log::debug!("{other:?}"),
        }
    }
}
