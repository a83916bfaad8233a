/// Sound identities and the stepped volume scale.
///
/// The game never talks to an audio device from here; it only names
/// sounds and levels. `ui::sound` turns them into playback.

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SoundId {
    GameTheme,
    PickUpKey,
    PowerUp,
    Victory,
    MenuSelect,
}

impl SoundId {
    pub const ALL: [SoundId; 5] = [
        SoundId::GameTheme,
        SoundId::PickUpKey,
        SoundId::PowerUp,
        SoundId::Victory,
        SoundId::MenuSelect,
    ];

    /// File stem under the sounds directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            SoundId::GameTheme => "game_theme",
            SoundId::PickUpKey => "pick_up_key",
            SoundId::PowerUp => "power_up",
            SoundId::Victory => "victory",
            SoundId::MenuSelect => "menu_select",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Channel {
    Music,
    Effects,
}

/// Gain in decibels for each volume step. Step 0 is effectively silent.
pub const VOLUME_LEVELS_DB: [f32; 6] = [-80.0, -20.0, -12.0, -5.0, 1.0, 6.0];
pub const DEFAULT_VOLUME_LEVEL: usize = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VolumeScale {
    level: usize,
}

impl Default for VolumeScale {
    fn default() -> Self {
        VolumeScale { level: DEFAULT_VOLUME_LEVEL }
    }
}

impl VolumeScale {
    pub const MAX: usize = VOLUME_LEVELS_DB.len() - 1;

    /// Out-of-range levels are clamped into the table.
    pub fn from_level(level: usize) -> Self {
        if level > Self::MAX {
            log::warn!("Volume level {level} out of range, clamping to {}", Self::MAX);
        }
        VolumeScale { level: level.min(Self::MAX) }
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn increase(&mut self) {
        if self.level < Self::MAX {
            self.level += 1;
        }
    }

    pub fn decrease(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub fn db(&self) -> f32 {
        VOLUME_LEVELS_DB[self.level]
    }

    /// Linear amplitude factor for the current step.
    pub fn amplitude(&self) -> f32 {
        10f32.powf(self.db() / 20.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_inside_table() {
        let mut v = VolumeScale::from_level(VolumeScale::MAX);
        v.increase();
        assert_eq!(v.level(), VolumeScale::MAX);
        let mut v = VolumeScale::from_level(0);
        v.decrease();
        assert_eq!(v.level(), 0);
    }

    #[test]
    fn out_of_range_level_is_clamped() {
        assert_eq!(VolumeScale::from_level(42).level(), VolumeScale::MAX);
    }

    #[test]
    fn default_level_gain() {
        let v = VolumeScale::default();
        assert_eq!(v.level(), 3);
        assert_eq!(v.db(), -5.0);
        assert!(v.amplitude() > 0.5 && v.amplitude() < 0.6);
    }

    #[test]
    fn lowest_step_is_near_silent() {
        assert!(VolumeScale::from_level(0).amplitude() < 0.001);
    }
}
