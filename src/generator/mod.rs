//! Signal sources
//!
//! Everything that produces audio implements [`SignalGenerator`]: it fills a
//! block buffer in place. Sources that can be asked to play notes also
//! implement [`Playable`].

pub mod envelope;
pub mod oscillator;
pub mod ramp;
pub mod voice;

pub use envelope::{Envelope, EnvelopePhase, EnvelopeShape};
pub use oscillator::{Oscillator, SineOscillator, TriangleOscillator, Waveform};
pub use ramp::Ramp;
pub use voice::Voice;

use crate::pipeline::note::Note;

/// Core trait for all signal generators
///
/// Generators produce audio block by block. The buffer length is the block
/// size; every sample in it is overwritten.
pub trait SignalGenerator {
    fn render(&mut self, buffer: &mut [f32]);
}

/// A signal generator that plays notes on request.
pub trait Playable: SignalGenerator {
    /// Start `note` `after` samples into the next rendered block and stop it
    /// `duration` samples later.
    fn play_note(&mut self, note: Note, after: u32, duration: u32);

    /// True once nothing is sounding or scheduled.
    fn is_idle(&self) -> bool;
}
