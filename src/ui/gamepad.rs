/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Movement, menu navigation
///   A / Start             →  Confirm
///   B                     →  Cancel (Escape)
///   Select                →  Pause

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::domain::entity::DirFlags;
use crate::sim::dispatch::Command;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Action-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    pause: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A, Btn::Start],
            cancel:  vec![Btn::B],
            pause:   vec![Btn::Select],
        }
    }
}

/// Direction pad or stick quadrant; index order Up, Down, Left, Right.
const UP: usize = 0;
const DOWN: usize = 1;
const LEFT: usize = 2;
const RIGHT: usize = 3;

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; 10],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
        let mut state = GamepadState::disconnected();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                state.connected = g.gamepads().next().is_some();
                if state.connected {
                    log::info!("Gamepad connected");
                }
                state.gilrs = Some(g);
            }
            Err(e) => log::warn!("Gamepad support unavailable: {e}"),
        }

        state
    }

    fn disconnected() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Unknown names are ignored; an
    /// action left with no valid buttons keeps its default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter()
                .filter_map(|s| {
                    let btn = Btn::from_name(s);
                    if btn.is_none() {
                        log::warn!("Unknown gamepad button {s:?} in config");
                    }
                    btn
                })
                .collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        let pa = parse_list(&cfg.pause);
        if !pa.is_empty() { map.pause = pa; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    log::info!("Gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("Gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        // Derive stick digital states
        self.stick[LEFT].set(self.stick_x < -STICK_DEADZONE);
        self.stick[RIGHT].set(self.stick_x > STICK_DEADZONE);
        self.stick[UP].set(self.stick_y > STICK_DEADZONE);
        self.stick[DOWN].set(self.stick_y < -STICK_DEADZONE);
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        let dir = match gilrs_btn {
            Button::DPadUp => Some(UP),
            Button::DPadDown => Some(DOWN),
            Button::DPadLeft => Some(LEFT),
            Button::DPadRight => Some(RIGHT),
            _ => None,
        };
        if let Some(d) = dir {
            self.dpad[d].set(held);
            return;
        }
        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    // ── Action queries (config-driven) ──

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    fn dir_held(&self, d: usize) -> bool {
        self.dpad[d].held || self.stick[d].held
    }

    fn dir_pressed(&self, d: usize) -> bool {
        self.dpad[d].just_pressed || self.stick[d].just_pressed
    }

    pub fn dir_flags(&self) -> DirFlags {
        DirFlags {
            up: self.dir_held(UP),
            down: self.dir_held(DOWN),
            left: self.dir_held(LEFT),
            right: self.dir_held(RIGHT),
        }
    }

    /// Edge-triggered commands for this frame.
    pub fn commands(&self) -> Vec<Command> {
        let mut out = Vec::new();
        let dirs = [(UP, Command::Up), (DOWN, Command::Down), (LEFT, Command::Left), (RIGHT, Command::Right)];
        for (d, cmd) in dirs {
            if self.dir_pressed(d) {
                out.push(cmd);
            }
        }
        if self.any_just_pressed(&self.action_map.confirm) { out.push(Command::Confirm); }
        if self.any_just_pressed(&self.action_map.cancel) { out.push(Command::Escape); }
        if self.any_just_pressed(&self.action_map.pause) { out.push(Command::Pause); }
        out
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    /// Drop every held button and centre the stick.
    pub fn release_all(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            *b = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(confirm: &[&str], cancel: &[&str], pause: &[&str]) -> GamepadConfig {
        let v = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        GamepadConfig { confirm: v(confirm), cancel: v(cancel), pause: v(pause) }
    }

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("south"), Some(Btn::A));
        assert_eq!(Btn::from_name("Back"), Some(Btn::Select));
        assert_eq!(Btn::from_name("RT"), Some(Btn::R2));
        assert_eq!(Btn::from_name("turbo"), None);
    }

    #[test]
    fn config_overrides_and_keeps_defaults() {
        let mut gp = GamepadState::disconnected();
        gp.load_button_config(&cfg(&["X"], &["nonsense"], &[]));
        assert_eq!(gp.action_map.confirm, vec![Btn::X]);
        assert_eq!(gp.action_map.cancel, vec![Btn::B]);
        assert_eq!(gp.action_map.pause, vec![Btn::Select]);
    }

    #[test]
    fn presses_become_commands() {
        let mut gp = GamepadState::disconnected();
        gp.dpad[DOWN].set(true);
        gp.buttons[btn_index(Btn::A)].set(true);
        gp.buttons[btn_index(Btn::Select)].set(true);
        assert_eq!(gp.commands(), vec![Command::Down, Command::Confirm, Command::Pause]);
        assert!(gp.dir_flags().down);

        gp.clear_just_pressed();
        assert!(gp.commands().is_empty());
        assert!(gp.dir_flags().down);
    }

    #[test]
    fn release_all_clears_held() {
        let mut gp = GamepadState::disconnected();
        gp.stick[LEFT].set(true);
        gp.release_all();
        assert_eq!(gp.dir_flags(), DirFlags::default());
    }
}
