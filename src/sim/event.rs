/// Events emitted by a simulation step or a screen transition.
/// The presentation layer consumes these for sound and input bookkeeping.

use crate::domain::audio::{Channel, SoundId, VolumeScale};

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    KeyPicked { keys: u32 },
    BootsPicked { speed: i32 },
    ChestOpened,
    MapReloaded,
    MapReloadFailed,
    /// Full reset back to the title; input flags must be dropped.
    GameReset,
    Audio(AudioCue),
}

/// Requests for the audio backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AudioCue {
    /// Start a looping track from the beginning.
    PlayMusic(SoundId),
    /// Halt the music track, keeping its position.
    StopMusic,
    ResumeMusic,
    PlaySe(SoundId),
    SetVolume(Channel, VolumeScale),
}
