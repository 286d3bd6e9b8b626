//! Polyphonic instrument
//!
//! Spawns one [`Voice`] per played note, sums the active voices into the
//! block and drops the ones whose envelope has finished.

use tracing::debug;

use crate::generator::{EnvelopeShape, Playable, SignalGenerator, Voice, Waveform};
use crate::pipeline::note::Note;
use crate::units::{Level, SampleRate};

/// Settings shared by every voice of an instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentConfig {
    pub waveform: Waveform,
    pub shape: EnvelopeShape,
    pub level: Level,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            shape: EnvelopeShape::default(),
            level: crate::units::DecibelLevel::new(-3.0).to_level(),
        }
    }
}

/// Manages polyphonic voices
#[derive(Debug, Clone)]
pub struct Instrument {
    rate: SampleRate,
    config: InstrumentConfig,
    voices: Vec<Voice>,
    scratch: Vec<f32>,
}

impl Instrument {
    pub fn new(config: InstrumentConfig, rate: SampleRate) -> Self {
        Self {
            rate,
            config,
            voices: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Instrument with a pre-sized scratch buffer for `block` samples.
    pub fn with_block_size(config: InstrumentConfig, rate: SampleRate, block: usize) -> Self {
        Self {
            scratch: vec![0.0; block],
            ..Self::new(config, rate)
        }
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> SampleRate {
        self.rate
    }

    fn spawn(&self, note: Note) -> Voice {
        Voice::for_note(
            note,
            self.config.waveform,
            self.config.level,
            &self.config.shape,
            self.rate,
        )
    }

    /// Start `note` after `after` samples and hold it until [`Instrument::note_off`].
    pub fn note_on(&mut self, note: Note, after: u32) {
        let mut voice = self.spawn(note);
        voice.hold(after);
        self.voices.push(voice);
        debug!(note = %note, after, voices = self.voices.len(), "note on");
    }

    /// Release every held voice playing `note`.
    pub fn note_off(&mut self, note: Note, after: u32) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.is_held() && *v.note() == note)
        {
            voice.release(after);
        }
    }

    /// Release every held voice at the start of the next block.
    pub fn all_notes_off(&mut self) {
        for voice in self.voices.iter_mut().filter(|v| v.is_held()) {
            voice.release(0);
        }
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn has_active_voices(&self) -> bool {
        !self.voices.is_empty()
    }
}

impl SignalGenerator for Instrument {
    fn render(&mut self, buffer: &mut [f32]) {
        buffer.fill(0.0);

        if self.voices.is_empty() {
            return;
        }

        if self.scratch.len() != buffer.len() {
            self.scratch.resize(buffer.len(), 0.0);
        }

        for voice in self.voices.iter_mut() {
            voice.render(&mut self.scratch);
            for (out, sample) in buffer.iter_mut().zip(self.scratch.iter()) {
                *out += sample;
            }
        }

        self.voices.retain(|voice| !voice.is_idle());
    }
}

impl Playable for Instrument {
    fn play_note(&mut self, note: Note, after: u32, duration: u32) {
        let mut voice = self.spawn(note);
        voice.play(after, duration);
        self.voices.push(voice);
        debug!(note = %note, after, duration, voices = self.voices.len(), "play note");
    }

    fn is_idle(&self) -> bool {
        self.voices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Seconds;

    fn create_instrument() -> Instrument {
        let shape = EnvelopeShape::new(
            Seconds::from_millis(2.0).unwrap(),
            Level::FULL,
            Seconds::from_millis(2.0).unwrap(),
            Level::new(0.5),
            Seconds::from_millis(4.0).unwrap(),
        );
        let config = InstrumentConfig {
            waveform: Waveform::Sine,
            shape,
            level: Level::new(0.5),
        };
        Instrument::with_block_size(config, SampleRate::new(1000).unwrap(), 16)
    }

    fn note(name: &str) -> Note {
        Note::parse(name).unwrap()
    }

    #[test]
    fn test_new_instrument_is_silent() {
        let mut inst = create_instrument();
        assert!(inst.is_idle());
        let mut buffer = [1.0f32; 16];
        inst.render(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_play_note_voice_lifecycle() {
        let mut inst = create_instrument();
        inst.play_note(note("A4"), 0, 10);
        inst.play_note(note("E4"), 4, 10);
        assert_eq!(inst.voice_count(), 2);

        let mut buffer = [0.0f32; 16];
        inst.render(&mut buffer);
        assert!(buffer.iter().any(|&s| s != 0.0));
        // A4 released at 10 and finished within the block
        assert_eq!(inst.voice_count(), 1);

        inst.render(&mut buffer);
        assert!(!inst.has_active_voices());
        assert!(inst.is_idle());
    }

    #[test]
    fn test_voices_are_summed_without_clipping() {
        let mut single = create_instrument();
        single.play_note(note("A4"), 0, 12);
        let mut one = [0.0f32; 16];
        single.render(&mut one);

        let mut double = create_instrument();
        double.play_note(note("A4"), 0, 12);
        double.play_note(note("A4"), 0, 12);
        let mut two = [0.0f32; 16];
        double.render(&mut two);

        for (a, b) in one.iter().zip(two.iter()) {
            assert!((2.0 * a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_held_note_until_note_off() {
        let mut inst = create_instrument();
        inst.note_on(note("C4"), 0);
        inst.note_on(note("G4"), 0);

        let mut buffer = [0.0f32; 16];
        for _ in 0..10 {
            inst.render(&mut buffer);
        }
        assert_eq!(inst.voice_count(), 2);

        inst.note_off(note("C4"), 0);
        inst.render(&mut buffer);
        assert_eq!(inst.voice_count(), 1);

        inst.all_notes_off();
        inst.render(&mut buffer);
        assert!(inst.is_idle());
    }

    #[test]
    fn test_note_off_ignores_timed_voices() {
        let mut inst = create_instrument();
        inst.play_note(note("C4"), 0, 100);
        inst.note_off(note("C4"), 0);

        let mut buffer = [0.0f32; 16];
        inst.render(&mut buffer);
        assert_eq!(inst.voice_count(), 1);
    }

    #[test]
    fn test_scratch_follows_block_length() {
        let mut inst = create_instrument();
        inst.play_note(note("A4"), 0, 100);
        let mut buffer = [0.0f32; 40];
        inst.render(&mut buffer);
        assert!(buffer[20..].iter().any(|&s| s != 0.0));
    }
}
