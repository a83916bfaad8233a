/// Sound engine: music track and sound effects via rodio.
///
/// Clips are loaded from `<sounds_dir>/<name>.wav`. A clip that is missing
/// or does not decode is replaced by a procedurally generated 8-bit style
/// buffer, so every `SoundId` always has something to play.
///
/// Music plays on one looping sink that can be stopped (paused in place)
/// and resumed. Effects are fire-and-forget sinks.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use crate::domain::audio::{Channel, SoundId, VolumeScale};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        clips: HashMap<SoundId, Arc<Vec<u8>>>,
        music: RefCell<Option<Sink>>,
        music_gain: Cell<f32>,
        se_gain: Cell<f32>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new(sounds_dir: &Path, music: VolumeScale, se: VolumeScale) -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("No audio output ({e}); running silent");
                    return None;
                }
            };

            let clips = SoundId::ALL.iter()
                .map(|&id| (id, Arc::new(load_clip(sounds_dir, id))))
                .collect();

            Some(SoundEngine {
                _stream: stream,
                handle,
                clips,
                music: RefCell::new(None),
                music_gain: Cell::new(music.amplitude()),
                se_gain: Cell::new(se.amplitude()),
            })
        }

        fn decoder(&self, id: SoundId) -> Option<Decoder<Cursor<Vec<u8>>>> {
            let buf = self.clips.get(&id)?;
            Decoder::new(Cursor::new(buf.as_ref().clone())).ok()
        }

        /// Start `id` from the beginning, looping, replacing any current track.
        pub fn play_music(&self, id: SoundId) {
            let Some(buf) = self.clips.get(&id) else { return };
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            match Decoder::new_looped(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => {
                    sink.set_volume(self.music_gain.get());
                    sink.append(src);
                    *self.music.borrow_mut() = Some(sink);
                }
                Err(e) => log::warn!("Cannot decode {}: {e}", id.file_stem()),
            }
        }

        pub fn stop_music(&self) {
            if let Some(sink) = self.music.borrow().as_ref() {
                sink.pause();
            }
        }

        pub fn resume_music(&self) {
            if let Some(sink) = self.music.borrow().as_ref() {
                sink.play();
            }
        }

        pub fn play_se(&self, id: SoundId) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Some(src) = self.decoder(id) {
                    sink.set_volume(self.se_gain.get());
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn set_volume_scale(&self, channel: Channel, scale: VolumeScale) {
            let gain = scale.amplitude();
            match channel {
                Channel::Music => {
                    self.music_gain.set(gain);
                    if let Some(sink) = self.music.borrow().as_ref() {
                        sink.set_volume(gain);
                    }
                }
                Channel::Effects => self.se_gain.set(gain),
            }
        }
    }

    /// WAV bytes for `id`: the file if it decodes, else a generated clip.
    fn load_clip(dir: &Path, id: SoundId) -> Vec<u8> {
        let path = dir.join(format!("{}.wav", id.file_stem()));
        match std::fs::read(&path) {
            Ok(bytes) if Decoder::new(Cursor::new(bytes.clone())).is_ok() => {
                log::debug!("Loaded {}", path.display());
                bytes
            }
            Ok(_) => {
                log::warn!("{} does not decode; using generated sound", path.display());
                make_wav(&generate(id))
            }
            Err(e) => {
                log::warn!("{}: {e}; using generated sound", path.display());
                make_wav(&generate(id))
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: each produces Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    pub(super) fn generate(id: SoundId) -> Vec<f32> {
        match id {
            SoundId::GameTheme => gen_theme(),
            SoundId::PickUpKey => gen_pickup(),
            SoundId::PowerUp => gen_power_up(),
            SoundId::Victory => gen_victory(),
            SoundId::MenuSelect => gen_blip(880.0, 0.04, 0.25),
        }
    }

    fn tone(freq: f32, i: usize) -> f32 {
        let t = i as f32 / SAMPLE_RATE as f32;
        (t * freq * 2.0 * std::f32::consts::PI).sin()
    }

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                tone(freq, i) * env * volume
            })
            .collect()
    }

    /// Key pickup: quick ascending arpeggio C6→E6→G6
    fn gen_pickup() -> Vec<f32> {
        let notes = [1047.0_f32, 1319.0, 1568.0];
        let note_dur = 0.045;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                // Square-ish wave (sine + 3rd harmonic) for retro feel
                let wave = tone(freq, i) * 0.7 + tone(freq * 3.0, i) * 0.3;
                samples.push(wave * env * 0.25);
            }
        }
        samples
    }

    /// Boots: rising sweep 300Hz → 1200Hz
    fn gen_power_up() -> Vec<f32> {
        let duration = 0.3;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * 900.0;
                phase += freq / SAMPLE_RATE as f32;
                let wave = (phase * 2.0 * std::f32::consts::PI).sin();
                let env = 1.0 - t * 0.5;
                wave * env * 0.25
            })
            .collect()
    }

    /// Chest opened: ascending fanfare with a held last note
    fn gen_victory() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0]; // C5→E5→G5→C6
        let note_dur = 0.12;
        let mut samples = Vec::new();
        for &freq in &notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = tone(freq, i) * 0.6 + tone(freq * 2.0, i) * 0.3 + tone(freq * 3.0, i) * 0.1;
                samples.push(wave * env * 0.3);
            }
        }
        let n = (SAMPLE_RATE as f32 * 0.5) as usize;
        for i in 0..n {
            let env = 1.0 - (i as f32 / n as f32);
            samples.push(tone(1047.0, i) * env * 0.3);
        }
        samples
    }

    /// Background loop: a calm eight-bar walk over C major.
    fn gen_theme() -> Vec<f32> {
        const MELODY: [f32; 16] = [
            523.0, 659.0, 784.0, 659.0, 587.0, 698.0, 880.0, 698.0,
            523.0, 659.0, 784.0, 1047.0, 988.0, 784.0, 587.0, 523.0,
        ];
        const BASS: [f32; 4] = [131.0, 175.0, 131.0, 196.0];
        let note_dur = 0.25;
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        let mut samples = Vec::with_capacity(n * MELODY.len());
        for (k, &freq) in MELODY.iter().enumerate() {
            let bass = BASS[k / 4];
            for i in 0..n {
                let env = 1.0 - (i as f32 / n as f32) * 0.6;
                let lead = tone(freq, i) * env * 0.15;
                let low = tone(bass, i + k * n) * 0.08;
                samples.push(lead + low);
            }
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn every_sound_generates_a_decodable_wav() {
            for id in SoundId::ALL {
                let samples = generate(id);
                assert!(!samples.is_empty(), "{id:?}");
                assert!(samples.iter().all(|s| s.abs() <= 1.0), "{id:?}");
                let wav = make_wav(&samples);
                assert!(Decoder::new(Cursor::new(wav)).is_ok(), "{id:?}");
            }
        }

        #[test]
        fn wav_header_sizes() {
            let wav = make_wav(&[0.0; 10]);
            assert_eq!(&wav[0..4], b"RIFF");
            assert_eq!(wav.len(), 44 + 20);
            assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 20);
        }

        #[test]
        fn missing_file_falls_back_to_generated() {
            let dir = tempfile::tempdir().unwrap();
            let bytes = load_clip(dir.path(), SoundId::MenuSelect);
            assert_eq!(bytes, make_wav(&generate(SoundId::MenuSelect)));
        }

        #[test]
        fn undecodable_file_falls_back_to_generated() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("power_up.wav"), b"not a wav").unwrap();
            let bytes = load_clip(dir.path(), SoundId::PowerUp);
            assert_eq!(&bytes[0..4], b"RIFF");
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(
        _sounds_dir: &std::path::Path,
        _music: crate::domain::audio::VolumeScale,
        _se: crate::domain::audio::VolumeScale,
    ) -> Option<Self> {
        log::info!("Built without sound support");
        Some(SoundEngine)
    }
    pub fn play_music(&self, _id: crate::domain::audio::SoundId) {}
    pub fn stop_music(&self) {}
    pub fn resume_music(&self) {}
    pub fn play_se(&self, _id: crate::domain::audio::SoundId) {}
    pub fn set_volume_scale(&self, _channel: crate::domain::audio::Channel, _scale: crate::domain::audio::VolumeScale) {}
}
