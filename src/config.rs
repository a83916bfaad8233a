/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD, or the
/// XDG/system data directories). Missing files or keys fall back to
/// defaults. Problems found while loading are kept in `notices` and logged
/// once the logger is up, since logging is configured from this file.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub audio: AudioConfig,
    pub menu: MenuConfig,
    pub gamepad: GamepadConfig,
    pub log_file: PathBuf,
    pub notices: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    pub fps: u32,
    pub screen_cols: i32,   // view width in tiles
    pub screen_rows: i32,
}

#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub map_file: PathBuf,
    pub tiles_file: Option<PathBuf>,
    pub max_cols: usize,
    pub max_rows: usize,
    pub clamp_to_world: bool,
}

#[derive(Clone, Debug)]
pub struct PlayerConfig {
    pub speed: i32,
    pub boost_multiplier: f32,
    pub required_keys: u32,
}

#[derive(Clone, Debug)]
pub struct AudioConfig {
    pub music_volume: usize,
    pub se_volume: usize,
    pub sounds_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct MenuConfig {
    pub confirm_quit: bool,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub pause: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    player: TomlPlayer,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    menu: TomlMenu,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_fps")]
    fps: u32,
    #[serde(default = "default_screen_cols")]
    screen_cols: i32,
    #[serde(default = "default_screen_rows")]
    screen_rows: i32,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_map_file")]
    map_file: String,
    #[serde(default)]
    tiles_file: String,
    #[serde(default = "default_world_size")]
    max_cols: usize,
    #[serde(default = "default_world_size")]
    max_rows: usize,
    #[serde(default = "default_true")]
    clamp_to_world: bool,
}

#[derive(Deserialize, Debug)]
struct TomlPlayer {
    #[serde(default = "default_speed")]
    speed: i32,
    #[serde(default = "default_boost")]
    boost_multiplier: f32,
    #[serde(default = "default_required_keys")]
    required_keys: u32,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_volume")]
    music_volume: usize,
    #[serde(default = "default_volume")]
    se_volume: usize,
    #[serde(default = "default_sounds_dir")]
    sounds_dir: String,
}

#[derive(Deserialize, Debug, Default)]
struct TomlMenu {
    #[serde(default)]
    confirm_quit: bool,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_pause")]
    pause: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_fps() -> u32 { 60 }
fn default_screen_cols() -> i32 { 16 }
fn default_screen_rows() -> i32 { 12 }
fn default_map_file() -> String { "maps/world01.txt".into() }
fn default_world_size() -> usize { 80 }
fn default_true() -> bool { true }
fn default_speed() -> i32 { 4 }
fn default_boost() -> f32 { 1.5 }
fn default_required_keys() -> u32 { 4 }
fn default_volume() -> usize { 3 }
fn default_sounds_dir() -> String { "assets/sounds".into() }
fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into()] }
fn default_pause() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "keyquest.log".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            fps: default_fps(),
            screen_cols: default_screen_cols(),
            screen_rows: default_screen_rows(),
        }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            map_file: default_map_file(),
            tiles_file: String::new(),
            max_cols: default_world_size(),
            max_rows: default_world_size(),
            clamp_to_world: true,
        }
    }
}

impl Default for TomlPlayer {
    fn default() -> Self {
        TomlPlayer {
            speed: default_speed(),
            boost_multiplier: default_boost(),
            required_keys: default_required_keys(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            music_volume: default_volume(),
            se_volume: default_volume(),
            sounds_dir: default_sounds_dir(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            pause: default_pause(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { log_file: default_log_file() }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, XDG data home, system data dir.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut notices = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut notices);
        let mut cfg = GameConfig::from_toml(toml_cfg, &search_dirs);
        cfg.notices.extend(notices);
        cfg
    }

    /// Parse a config document; relative paths resolve against `base`.
    #[cfg(test)]
    pub fn from_toml_str(text: &str, base: &std::path::Path) -> Result<Self, toml::de::Error> {
        let parsed: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(parsed, &[base.to_path_buf()]))
    }

    fn from_toml(t: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut notices = Vec::new();

        let fps = if t.display.fps == 0 {
            notices.push("display.fps must be positive; using 60".to_string());
            default_fps()
        } else {
            t.display.fps
        };

        let speed = if t.player.speed < 0 {
            notices.push(format!("player.speed {} is negative; using 0", t.player.speed));
            0
        } else {
            t.player.speed
        };

        let tiles_file = (!t.world.tiles_file.is_empty())
            .then(|| resolve_data_path(&t.world.tiles_file, search_dirs, false));

        GameConfig {
            display: DisplayConfig {
                fps,
                screen_cols: t.display.screen_cols.max(1),
                screen_rows: t.display.screen_rows.max(1),
            },
            world: WorldConfig {
                map_file: resolve_data_path(&t.world.map_file, search_dirs, false),
                tiles_file,
                max_cols: t.world.max_cols.max(1),
                max_rows: t.world.max_rows.max(1),
                clamp_to_world: t.world.clamp_to_world,
            },
            player: PlayerConfig {
                speed,
                boost_multiplier: t.player.boost_multiplier,
                required_keys: t.player.required_keys,
            },
            audio: AudioConfig {
                music_volume: t.audio.music_volume,
                se_volume: t.audio.se_volume,
                sounds_dir: resolve_data_path(&t.audio.sounds_dir, search_dirs, true),
            },
            menu: MenuConfig { confirm_quit: t.menu.confirm_quit },
            gamepad: GamepadConfig {
                confirm: t.gamepad.confirm,
                cancel: t.gamepad.cancel,
                pause: t.gamepad.pause,
            },
            log_file: PathBuf::from(t.general.log_file),
            notices,
        }
    }
}

/// Absolute paths are kept; relative ones resolve to the first candidate
/// directory where they exist, else stay relative to CWD.
fn resolve_data_path(raw: &str, search_dirs: &[PathBuf], want_dir: bool) -> PathBuf {
    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p;
    }
    search_dirs.iter()
        .map(|d| d.join(raw))
        .find(|c| if want_dir { c.is_dir() } else { c.is_file() })
        .unwrap_or(p)
}

/// Candidate directories to search: exe dir + CWD + data paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/keyquest)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keyquest");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/keyquest");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// First readable config.toml wins; a parse error means defaults.
fn load_toml(search_dirs: &[PathBuf], notices: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    notices.push(format!("Loaded config from {}", path.display()));
                    return cfg;
                }
                Err(e) => {
                    notices.push(format!("config.toml parse error: {e}; using default settings"));
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                notices.push(format!("could not read {}: {e}", path.display()));
            }
        }
    }
    TomlConfig::default()
}
