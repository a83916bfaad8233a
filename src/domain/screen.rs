/// Screen states, substates and the per-screen selection cursors.
///
/// Exactly one `ScreenState` is active. Each (state, substate) pair owns
/// its own cursor, reset to 0 whenever that pair is entered. Input routing
/// lives in `sim::dispatch`; this module only holds the bookkeeping.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TitleScreen {
    MainMenu,
    Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionsScreen {
    Main,
    ConfirmQuit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ScreenState {
    Title(TitleScreen),
    Playing,
    Paused,
    Options(OptionsScreen),
    Ending,
}

// ── Command tables ──

pub const TITLE_COMMANDS: &[&str] = &["START", "QUIT"];
pub const TITLE_START: usize = 0;
pub const TITLE_QUIT: usize = 1;

pub const OPTIONS_COMMANDS: &[&str] = &["Music", "Sound FX", "Quit game", "Back"];
pub const OPTIONS_MUSIC: usize = 0;
pub const OPTIONS_SE: usize = 1;
pub const OPTIONS_QUIT: usize = 2;
pub const OPTIONS_BACK: usize = 3;

pub const CONFIRM_COMMANDS: &[&str] = &["Yes", "No"];
pub const CONFIRM_YES: usize = 0;
pub const CONFIRM_NO: usize = 1;

const SLOT_COUNT: usize = 7;

impl ScreenState {
    fn slot(self) -> usize {
        match self {
            ScreenState::Title(TitleScreen::MainMenu) => 0,
            ScreenState::Title(TitleScreen::Commands) => 1,
            ScreenState::Playing => 2,
            ScreenState::Paused => 3,
            ScreenState::Options(OptionsScreen::Main) => 4,
            ScreenState::Options(OptionsScreen::ConfirmQuit) => 5,
            ScreenState::Ending => 6,
        }
    }

    /// Number of selectable entries; screens without a menu have one.
    pub fn command_count(self) -> usize {
        match self {
            ScreenState::Title(TitleScreen::MainMenu) => TITLE_COMMANDS.len(),
            ScreenState::Options(OptionsScreen::Main) => OPTIONS_COMMANDS.len(),
            ScreenState::Options(OptionsScreen::ConfirmQuit) => CONFIRM_COMMANDS.len(),
            _ => 1,
        }
    }
}

/// Next cursor position, wrapping to 0 past the last entry.
pub fn increase(cursor: usize, count: usize) -> usize {
    if count == 0 { 0 } else { (cursor + 1) % count }
}

/// Previous cursor position, wrapping to the last entry below 0.
pub fn decrease(cursor: usize, count: usize) -> usize {
    if count == 0 { 0 } else { (cursor + count - 1) % count }
}

#[derive(Clone, Debug)]
pub struct ScreenMachine {
    state: ScreenState,
    cursors: [usize; SLOT_COUNT],
}

impl Default for ScreenMachine {
    fn default() -> Self {
        ScreenMachine {
            state: ScreenState::Title(TitleScreen::MainMenu),
            cursors: [0; SLOT_COUNT],
        }
    }
}

impl ScreenMachine {
    pub fn state(&self) -> ScreenState {
        self.state
    }

    /// Switch screens; the entered screen's cursor starts at 0.
    pub fn enter(&mut self, state: ScreenState) {
        if state != self.state {
            log::debug!("Screen {:?} -> {:?}", self.state, state);
        }
        self.state = state;
        self.cursors[state.slot()] = 0;
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.state.slot()]
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        let count = self.state.command_count();
        self.cursors[self.state.slot()] = cursor.min(count.saturating_sub(1));
    }

    pub fn cursor_up(&mut self) {
        let slot = self.state.slot();
        self.cursors[slot] = decrease(self.cursors[slot], self.state.command_count());
    }

    pub fn cursor_down(&mut self) {
        let slot = self.state.slot();
        self.cursors[slot] = increase(self.cursors[slot], self.state.command_count());
    }

    /// Back to the title menu with every cursor cleared.
    pub fn reset(&mut self) {
        *self = ScreenMachine::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_helpers() {
        assert_eq!(decrease(0, 4), 3);
        assert_eq!(increase(3, 4), 0);
        assert_eq!(increase(1, 4), 2);
        assert_eq!(decrease(2, 4), 1);
        assert_eq!(increase(0, 0), 0);
    }

    #[test]
    fn starts_on_title_menu() {
        let m = ScreenMachine::default();
        assert_eq!(m.state(), ScreenState::Title(TitleScreen::MainMenu));
        assert_eq!(m.cursor(), 0);
    }

    #[test]
    fn cursors_are_independent_per_screen() {
        let mut m = ScreenMachine::default();
        m.cursor_down();
        assert_eq!(m.cursor(), 1);
        m.enter(ScreenState::Options(OptionsScreen::Main));
        assert_eq!(m.cursor(), 0);
        m.cursor_up();
        assert_eq!(m.cursor(), OPTIONS_BACK);
        m.enter(ScreenState::Title(TitleScreen::MainMenu));
        assert_eq!(m.cursor(), 0);
    }

    #[test]
    fn set_cursor_stays_in_range() {
        let mut m = ScreenMachine::default();
        m.enter(ScreenState::Options(OptionsScreen::ConfirmQuit));
        m.set_cursor(9);
        assert_eq!(m.cursor(), CONFIRM_NO);
    }

    #[test]
    fn reset_clears_everything() {
        let mut m = ScreenMachine::default();
        m.enter(ScreenState::Options(OptionsScreen::Main));
        m.cursor_down();
        m.reset();
        assert_eq!(m.state(), ScreenState::Title(TitleScreen::MainMenu));
        m.enter(ScreenState::Options(OptionsScreen::Main));
        assert_eq!(m.cursor(), 0);
    }
}
