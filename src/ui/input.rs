/// Keyboard input tracker.
///
/// Tracks which keys are currently held down, enabling:
///   - Continuous movement while a key is held (sampled as `DirFlags`)
///   - Edge-triggered menu commands (one per fresh press)
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't
/// support it. Losing terminal focus drops every held key.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::entity::DirFlags;
use crate::sim::dispatch::Command;

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Char('p'), KeyCode::Char('P')];
const KEYS_DEBUG: &[KeyCode] = &[KeyCode::Char('\'')];
const KEYS_RELOAD: &[KeyCode] = &[KeyCode::Char('k'), KeyCode::Char('K')];

/// Menu/meta command for a single key event, if it maps to one.
pub fn command_for_key(key: &KeyEvent) -> Option<Command> {
    let code = key.code;
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(Command::Quit);
    }
    let table: [(&[KeyCode], Command); 9] = [
        (KEYS_UP, Command::Up),
        (KEYS_DOWN, Command::Down),
        (KEYS_LEFT, Command::Left),
        (KEYS_RIGHT, Command::Right),
        (KEYS_CONFIRM, Command::Confirm),
        (&[KeyCode::Esc], Command::Escape),
        (KEYS_PAUSE, Command::Pause),
        (KEYS_DEBUG, Command::ToggleDebug),
        (KEYS_RELOAD, Command::ReloadMap),
    ];
    table.iter().find(|(keys, _)| keys.contains(&code)).map(|&(_, cmd)| cmd)
}

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that transitioned from "not held" → "held" during the
    /// most recent drain_events() call.
    fresh_presses: Vec<KeyCode>,

    /// Press events collected during drain, for command routing.
    pub raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,

    /// Terminal was resized since the last drain.
    pub resized: bool,

    /// Focus was lost since the last drain; other input devices should
    /// drop their held state too.
    pub focus_lost: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
            resized: false,
            focus_lost: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per loop iteration, before the frame update.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();
        self.resized = false;
        self.focus_lost = false;

        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.on_event(ev),
                Err(e) => log::warn!("Terminal event read failed: {e}"),
            }
        }

        // Expire keys that have timed out (fallback for terminals without Release)
        let now = Instant::now();
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn on_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => self.on_key(key),
            Event::FocusLost => {
                log::debug!("Focus lost; releasing all keys");
                self.clear_all();
                self.focus_lost = true;
            }
            Event::Resize(_, _) => self.resized = true,
            _ => {}
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Rely on timeout-based expiry instead
            }
            _ => {
                let was_held = self.is_held(key.code);
                self.last_active.insert(key.code, Instant::now());
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
                self.raw_events.push(key);
            }
        }
    }

    /// Forget every held key and pending press.
    pub fn clear_all(&mut self) {
        self.last_active.clear();
        self.fresh_presses.clear();
        self.raw_events.clear();
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Snapshot of held directions. A key pressed and released within
    /// the same drain still counts for this frame.
    pub fn dir_flags(&self) -> DirFlags {
        let on = |keys: &[KeyCode]| self.any_held(keys) || self.any_pressed(keys);
        DirFlags {
            up: on(KEYS_UP),
            down: on(KEYS_DOWN),
            left: on(KEYS_LEFT),
            right: on(KEYS_RIGHT),
        }
    }

    /// Commands from this drain's key presses, in arrival order.
    /// Auto-repeat is included so held arrows scroll menus.
    pub fn commands(&self) -> Vec<Command> {
        self.raw_events.iter().filter_map(command_for_key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_keys_to_commands() {
        assert_eq!(command_for_key(&key(KeyCode::Char('w'))), Some(Command::Up));
        assert_eq!(command_for_key(&key(KeyCode::Down)), Some(Command::Down));
        assert_eq!(command_for_key(&key(KeyCode::Enter)), Some(Command::Confirm));
        assert_eq!(command_for_key(&key(KeyCode::Char(' '))), Some(Command::Confirm));
        assert_eq!(command_for_key(&key(KeyCode::Esc)), Some(Command::Escape));
        assert_eq!(command_for_key(&key(KeyCode::Char('P'))), Some(Command::Pause));
        assert_eq!(command_for_key(&key(KeyCode::Char('\''))), Some(Command::ToggleDebug));
        assert_eq!(command_for_key(&key(KeyCode::Char('k'))), Some(Command::ReloadMap));
        assert_eq!(command_for_key(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(&ev), Some(Command::Quit));
    }

    #[test]
    fn held_keys_become_dir_flags() {
        let mut input = InputState::new();
        input.on_key(key(KeyCode::Char('d')));
        input.on_key(key(KeyCode::Up));
        let flags = input.dir_flags();
        assert!(flags.right && flags.up);
        assert!(!flags.left && !flags.down);
        assert_eq!(input.commands(), vec![Command::Right, Command::Up]);
    }

    #[test]
    fn release_honored_when_enabled() {
        let mut input = InputState::new();
        input.honor_release = true;
        input.on_key(key(KeyCode::Left));
        let mut release = key(KeyCode::Left);
        release.kind = KeyEventKind::Release;
        input.on_key(release);
        assert!(!input.is_held(KeyCode::Left));
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputState::new();
        input.on_event(Event::Key(key(KeyCode::Left)));
        input.on_event(Event::Key(key(KeyCode::Char('w'))));
        assert!(input.dir_flags().left && input.dir_flags().up);

        input.on_event(Event::FocusLost);
        assert_eq!(input.dir_flags(), DirFlags::default());
        assert!(input.commands().is_empty());
        assert!(input.focus_lost);
    }

    #[test]
    fn resize_is_flagged() {
        let mut input = InputState::new();
        input.on_event(Event::Resize(100, 40));
        assert!(input.resized);
        assert!(!input.focus_lost);
    }

    #[test]
    fn clear_all_drops_everything() {
        let mut input = InputState::new();
        input.on_key(key(KeyCode::Left));
        input.clear_all();
        assert_eq!(input.dir_flags(), DirFlags::default());
        assert!(input.commands().is_empty());
    }
}
