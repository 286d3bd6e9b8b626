//! Notation to audio pipeline
//!
//! - note: note names and equal-temperament pitch
//! - parser: piano-roll notation into timed note events
//! - sequencer: sample-accurate dispatch of timed notes to an instrument
//! - instrument: polyphonic voice management
//! - mixer: clamped sum of several sources

pub mod instrument;
pub mod mixer;
pub mod note;
pub mod parser;
pub mod sequencer;

pub use instrument::{Instrument, InstrumentConfig};
pub use mixer::Mixer;
pub use note::{Note, PitchClass};
pub use parser::{parse_music_length, NoteEvent, Score};
pub use sequencer::{ScheduledNote, Sequencer};
