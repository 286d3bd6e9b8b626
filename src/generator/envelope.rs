use super::ramp::Ramp;
use crate::units::{Level, SampleRate, Seconds};

/// Shape of an attack/decay/sustain/release envelope.
///
/// ```text
///          /\
///         /  \
///        /   --- . . . ---\
///    ___/                  \___
///    w  a  d  s           r i
///
///  on --^                 ^-- off
/// ```
///
/// Attack ramps from silence up to `attack_level`, decay ramps from there to
/// `decay_level`, which is held (sustain) until note-off. Release ramps from
/// wherever the envelope is at note-off down to silence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack_time: Seconds,
    pub attack_level: Level,
    pub decay_time: Seconds,
    pub decay_level: Level,
    pub release_time: Seconds,
}

impl EnvelopeShape {
    pub fn new(
        attack_time: Seconds,
        attack_level: Level,
        decay_time: Seconds,
        decay_level: Level,
        release_time: Seconds,
    ) -> Self {
        Self {
            attack_time,
            attack_level,
            decay_time,
            decay_level,
            release_time,
        }
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack_time: Seconds::from_millis(10.0).unwrap_or(Seconds::ZERO),
            attack_level: Level::FULL,
            decay_time: Seconds::from_millis(100.0).unwrap_or(Seconds::ZERO),
            decay_level: Level::new(0.7),
            release_time: Seconds::from_millis(200.0).unwrap_or(Seconds::ZERO),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopePhase {
    /// Not started, or finished. Output is silence.
    Idle,
    /// Note-on scheduled but not reached yet. Output is silence.
    Wait,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Per-voice envelope generator
///
/// Note commands are counted in samples from the start of the next call to
/// [`Envelope::apply`]. Two ways to drive it:
/// - [`Envelope::note_on_for`] when the note length is known up front;
/// - [`Envelope::note_on`] followed later by [`Envelope::note_off`].
///
/// A note-on that arrives during Release restarts the attack from the
/// current level.
#[derive(Debug, Clone)]
pub struct Envelope {
    attack: Ramp,
    decay: Ramp,
    /// Fixed slope from the decay level to silence, whatever the level at note-off.
    release: Ramp,

    phase: EnvelopePhase,
    level: f32,

    pending_on: Option<u32>,
    pending_off: Option<u32>,
    /// Note-off delay armed when the pending note-on fires.
    hold: Option<u32>,
}

impl Envelope {
    pub fn new(shape: &EnvelopeShape, rate: SampleRate) -> Self {
        Self {
            attack: Ramp::between_levels(
                Level::SILENT,
                shape.attack_level,
                shape.attack_time,
                rate,
            ),
            decay: Ramp::between_levels(
                shape.attack_level,
                shape.decay_level,
                shape.decay_time,
                rate,
            ),
            release: Ramp::between_levels(
                shape.decay_level,
                Level::SILENT,
                shape.release_time,
                rate,
            ),
            phase: EnvelopePhase::Idle,
            level: 0.0,
            pending_on: None,
            pending_off: None,
            hold: None,
        }
    }

    pub fn phase(&self) -> EnvelopePhase {
        self.phase
    }

    /// Gain produced by the most recent sample.
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn is_idle(&self) -> bool {
        self.phase == EnvelopePhase::Idle
    }

    /// Start the note `after` samples from now; it sustains until [`note_off`].
    ///
    /// [`note_off`]: Envelope::note_off
    pub fn note_on(&mut self, after: u32) {
        self.schedule_on(after, None);
    }

    /// Start the note `after` samples from now and release it `hold` samples
    /// after it starts.
    pub fn note_on_for(&mut self, after: u32, hold: u32) {
        self.schedule_on(after, Some(hold));
    }

    fn schedule_on(&mut self, after: u32, hold: Option<u32>) {
        if self.phase == EnvelopePhase::Idle {
            self.phase = EnvelopePhase::Wait;
        }
        self.pending_on = Some(after);
        self.hold = hold;
    }

    /// Release the note `after` samples from now.
    ///
    /// Before the note has started (or after it has finished) this cancels
    /// everything and leaves the envelope Idle.
    pub fn note_off(&mut self, after: u32) {
        match self.phase {
            EnvelopePhase::Idle | EnvelopePhase::Wait => {
                self.phase = EnvelopePhase::Idle;
                self.level = 0.0;
                self.pending_on = None;
                self.pending_off = None;
                self.hold = None;
            }
            EnvelopePhase::Attack | EnvelopePhase::Decay | EnvelopePhase::Sustain => {
                self.pending_off = Some(after);
            }
            EnvelopePhase::Release => {
                // Only meaningful for a re-trigger that has not fired yet.
                if self.pending_on.is_some() {
                    self.hold = Some(after);
                }
            }
        }
    }

    /// Multiply `buffer` in place by the envelope, one gain per sample.
    pub fn apply(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_gain();
        }
    }

    /// Overwrite `buffer` with the raw envelope gains.
    pub fn fill(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_gain();
        }
    }

    fn next_gain(&mut self) -> f32 {
        if matches!(self.phase, EnvelopePhase::Wait | EnvelopePhase::Release)
            && countdown(&mut self.pending_on)
        {
            self.phase = EnvelopePhase::Attack;
            self.pending_off = self.hold.take();
        }

        if matches!(
            self.phase,
            EnvelopePhase::Attack | EnvelopePhase::Decay | EnvelopePhase::Sustain
        ) && countdown(&mut self.pending_off)
        {
            self.phase = EnvelopePhase::Release;
        }

        match self.phase {
            EnvelopePhase::Idle | EnvelopePhase::Wait => 0.0,
            EnvelopePhase::Attack => {
                if self.attack.step(&mut self.level) {
                    self.phase = EnvelopePhase::Decay;
                }
                self.level
            }
            EnvelopePhase::Decay => {
                if self.decay.step(&mut self.level) {
                    self.phase = EnvelopePhase::Sustain;
                }
                self.level
            }
            EnvelopePhase::Sustain => {
                self.level = self.decay.target();
                self.level
            }
            EnvelopePhase::Release => {
                if self.release.step(&mut self.level) {
                    self.phase = EnvelopePhase::Idle;
                }
                self.level
            }
        }
    }
}

/// Tick a pending command; true on the sample it fires.
fn countdown(pending: &mut Option<u32>) -> bool {
    match pending {
        Some(0) => {
            *pending = None;
            true
        }
        Some(remaining) => {
            *remaining -= 1;
            false
        }
        None => false,
    }
}
