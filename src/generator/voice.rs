use super::envelope::{Envelope, EnvelopeShape};
use super::oscillator::{Oscillator, Waveform};
use super::SignalGenerator;
use crate::pipeline::note::Note;
use crate::units::{Level, SampleRate};

/// One sounding note: an oscillator shaped by its own envelope.
#[derive(Debug, Clone)]
pub struct Voice {
    note: Note,
    oscillator: Oscillator,
    envelope: Envelope,
    /// Started with an open-ended note-on and not released yet.
    held: bool,
}

impl Voice {
    pub fn new(note: Note, oscillator: Oscillator, envelope: Envelope) -> Self {
        Self {
            note,
            oscillator,
            envelope,
            held: false,
        }
    }

    /// Build a voice for `note` from an instrument's settings.
    pub fn for_note(
        note: Note,
        waveform: Waveform,
        level: Level,
        shape: &EnvelopeShape,
        rate: SampleRate,
    ) -> Self {
        let oscillator = waveform.oscillator(note.frequency(), level, rate);
        Self::new(note, oscillator, Envelope::new(shape, rate))
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    /// Play for `duration` samples, starting `after` samples into the next block.
    pub fn play(&mut self, after: u32, duration: u32) {
        self.held = false;
        self.envelope.note_on_for(after, duration);
    }

    /// Start `after` samples into the next block and hold until [`Voice::release`].
    pub fn hold(&mut self, after: u32) {
        self.held = true;
        self.envelope.note_on(after);
    }

    pub fn release(&mut self, after: u32) {
        self.held = false;
        self.envelope.note_off(after);
    }

    pub fn is_idle(&self) -> bool {
        self.envelope.is_idle()
    }
}

impl SignalGenerator for Voice {
    fn render(&mut self, buffer: &mut [f32]) {
        self.oscillator.render(buffer);
        self.envelope.apply(buffer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Seconds;

    fn create_voice(waveform: Waveform) -> Voice {
        let shape = EnvelopeShape::new(
            Seconds::from_millis(2.0).unwrap(),
            Level::FULL,
            Seconds::from_millis(2.0).unwrap(),
            Level::new(0.5),
            Seconds::from_millis(2.0).unwrap(),
        );
        let rate = SampleRate::new(1000).unwrap();
        Voice::for_note(Note::parse("A4").unwrap(), waveform, Level::FULL, &shape, rate)
    }

    #[test]
    fn test_new_voice_is_idle_until_played() {
        let mut voice = create_voice(Waveform::Sine);
        assert!(voice.is_idle());
        voice.play(0, 10);
        assert!(!voice.is_idle());
    }

    #[test]
    fn test_voice_goes_idle_after_release() {
        let mut voice = create_voice(Waveform::Triangle);
        voice.play(0, 10);

        let mut buffer = [0.0f32; 16];
        voice.render(&mut buffer);
        assert!(voice.is_idle());

        voice.render(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_silent_while_waiting() {
        let mut voice = create_voice(Waveform::Triangle);
        voice.play(8, 10);
        let mut buffer = [1.0f32; 8];
        voice.render(&mut buffer);
        assert!(buffer.iter().all(|&s| s == 0.0));
        assert!(!voice.is_idle());
    }

    #[test]
    fn test_hold_and_release() {
        let mut voice = create_voice(Waveform::Sine);
        voice.hold(0);
        assert!(voice.is_held());

        let mut buffer = [0.0f32; 64];
        voice.render(&mut buffer);
        assert!(!voice.is_idle());

        voice.release(0);
        assert!(!voice.is_held());
        voice.render(&mut buffer);
        assert!(voice.is_idle());
    }
}
