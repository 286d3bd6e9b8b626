//! Note names and equal-temperament pitch
//!
//! Names are `<pitch><octave>`: pitch is one of the twelve sharps-only names
//! `C C# D D# E F F# G G# A A# B`, octave is a single digit 0-8.
//! Note numbers follow MIDI (C0 = 12, A4 = 69).

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SynthError};
use crate::units::Frequency;

const C0_NOTE_NUMBER: i32 = 12;
const A4_NOTE_NUMBER: i32 = 69;
const A4_FREQUENCY: f32 = 440.0;

/// Pitch classes with support for black keys (sharps only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Semitones above C (C=0, C#=1, D=2, ...)
    pub fn semitone(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
        }
    }
}

impl FromStr for PitchClass {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        PitchClass::ALL
            .iter()
            .copied()
            .find(|pc| pc.name() == s)
            .ok_or_else(|| {
                SynthError::format(format!("invalid note name '{s}' (A-G#, no B# or E#)"))
            })
    }
}

/// A musical note: pitch class plus octave, with its derived frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pitch_class: PitchClass,
    octave: u8,
    frequency: Frequency,
}

impl Note {
    pub fn new(pitch_class: PitchClass, octave: u8) -> Result<Self> {
        if octave > 8 {
            return Err(SynthError::format(format!(
                "invalid octave number {octave} (0..8)"
            )));
        }
        let number = note_number(pitch_class, octave);
        let exponent = (number - A4_NOTE_NUMBER) as f32 / 12.0;
        let frequency = Frequency::new(2f32.powf(exponent) * A4_FREQUENCY)?;
        Ok(Self {
            pitch_class,
            octave,
            frequency,
        })
    }

    /// Parse a 2 or 3 character note name such as `C4` or `G#3`.
    pub fn parse(name: &str) -> Result<Self> {
        let split = match name.len() {
            2 => 1,
            3 => 2,
            _ => {
                return Err(SynthError::format(format!(
                    "invalid note name length: '{name}'"
                )))
            }
        };
        let (pitch, octave) = match (name.get(..split), name.get(split..)) {
            (Some(pitch), Some(octave)) => (pitch, octave),
            _ => return Err(SynthError::format(format!("invalid note name '{name}'"))),
        };

        let pitch_class = pitch.parse::<PitchClass>()?;
        let octave = match octave.as_bytes() {
            [digit @ b'0'..=b'8'] => digit - b'0',
            _ => {
                return Err(SynthError::format(format!(
                    "invalid octave '{octave}' in '{name}' (0..8)"
                )))
            }
        };

        Note::new(pitch_class, octave)
    }

    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// MIDI note number (A4 = 69).
    pub fn number(&self) -> i32 {
        note_number(self.pitch_class, self.octave)
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }
}

fn note_number(pitch_class: PitchClass, octave: u8) -> i32 {
    C0_NOTE_NUMBER + pitch_class.semitone() as i32 + 12 * octave as i32
}

impl FromStr for Note {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        Note::parse(s)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class.name(), self.octave)
    }
}
