//! Song files
//!
//! A song is described in TOML:
//!
//! ```toml
//! sample_rate = 8192
//! block_size = 256
//!
//! [instrument]
//! waveform = "triangle"
//! level_db = -6.0
//!
//! [instrument.envelope]
//! attack = 0.01
//! decay = 0.1
//! decay_level = 0.7
//! release = 0.2
//!
//! [notation]
//! bpm = 120
//! text = """
//! C4 |##  :    :    :    |
//! """
//!
//! [[notes]]
//! note = "A4"
//! on = 0.5
//! off = 1.0
//! ```
//!
//! Every field has a default; `duration` is derived from the content when
//! left out. The raw values here are validated by [`Song::from_config`].
//!
//! [`Song::from_config`]: crate::song::Song::from_config

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthError};
use crate::generator::{EnvelopeShape, Waveform};
use crate::pipeline::InstrumentConfig;
use crate::units::{DecibelLevel, Level, Seconds};

const DEFAULT_SAMPLE_RATE: u32 = 8192;
const DEFAULT_BLOCK_SIZE: usize = 256;
const DEFAULT_LEVEL_DB: f32 = -3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SongConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_block_size")]
    pub block_size: usize,
    /// Length of the output in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(default)]
    pub instrument: InstrumentSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notation: Option<NotationSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<NoteEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstrumentSection {
    #[serde(default)]
    pub waveform: Waveform,
    /// Linear level, 0..1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<f32>,
    /// Level in dB relative to full scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_db: Option<f32>,
    #[serde(default)]
    pub envelope: EnvelopeSection,
}

/// Envelope times in seconds, levels linear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeSection {
    pub attack: f32,
    pub attack_level: f32,
    pub decay: f32,
    pub decay_level: f32,
    pub release: f32,
}

impl Default for EnvelopeSection {
    fn default() -> Self {
        Self {
            attack: 0.01,
            attack_level: 1.0,
            decay: 0.1,
            decay_level: 0.7,
            release: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotationSection {
    pub bpm: f32,
    pub text: String,
}

/// A note given directly by name and times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteEntry {
    pub note: String,
    pub on: f32,
    pub off: f32,
}

fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

impl Default for SongConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            duration: None,
            instrument: InstrumentSection::default(),
            notation: None,
            notes: Vec::new(),
        }
    }
}

impl SongConfig {
    /// Load a song file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

impl InstrumentSection {
    /// Validate into the settings an [`Instrument`](crate::pipeline::Instrument) uses.
    pub fn to_instrument_config(&self) -> Result<InstrumentConfig> {
        let level = match (self.level, self.level_db) {
            (Some(_), Some(_)) => {
                return Err(SynthError::configuration(
                    "instrument sets both 'level' and 'level_db'",
                ))
            }
            (Some(linear), None) => Level::new(linear),
            (None, Some(db)) => DecibelLevel::new(db).to_level(),
            (None, None) => DecibelLevel::new(DEFAULT_LEVEL_DB).to_level(),
        };

        Ok(InstrumentConfig {
            waveform: self.waveform,
            shape: self.envelope.to_shape()?,
            level,
        })
    }
}

impl EnvelopeSection {
    pub fn to_shape(&self) -> Result<EnvelopeShape> {
        Ok(EnvelopeShape::new(
            Seconds::new(self.attack)?,
            Level::new(self.attack_level),
            Seconds::new(self.decay)?,
            Level::new(self.decay_level),
            Seconds::new(self.release)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = SongConfig::parse("").unwrap();
        assert_eq!(config, SongConfig::default());
        assert_eq!(config.sample_rate, 8192);
        assert_eq!(config.block_size, 256);
        assert_eq!(config.instrument.waveform, Waveform::Sine);
    }

    #[test]
    fn test_parse_full_song() {
        let content = r#"
sample_rate = 4000
block_size = 100
duration = 2.5

[instrument]
waveform = "triangle"
level = 0.25

[instrument.envelope]
attack = 0.02
release = 0.5

[notation]
bpm = 90
text = """
C4 |##  :    :    :    |
"""

[[notes]]
note = "A4"
on = 0.5
off = 1.0
"#;
        let config = SongConfig::parse(content).unwrap();
        assert_eq!(config.sample_rate, 4000);
        assert_eq!(config.duration, Some(2.5));
        assert_eq!(config.instrument.waveform, Waveform::Triangle);
        assert_eq!(config.instrument.envelope.attack, 0.02);
        // Unset envelope fields keep their defaults
        assert_eq!(config.instrument.envelope.decay_level, 0.7);
        let notation = config.notation.unwrap();
        assert_eq!(notation.bpm, 90.0);
        assert_eq!(notation.text, "C4 |##  :    :    :    |\n");
        assert_eq!(
            config.notes,
            vec![NoteEntry {
                note: "A4".to_string(),
                on: 0.5,
                off: 1.0,
            }]
        );
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = SongConfig::parse("sample_rat = 8000\n").unwrap_err();
        assert!(matches!(err, SynthError::Config(_)));
    }

    #[test]
    fn test_unknown_waveform_is_rejected() {
        let err = SongConfig::parse("[instrument]\nwaveform = \"square\"\n").unwrap_err();
        assert!(matches!(err, SynthError::Config(_)));
    }

    #[test]
    fn test_instrument_level() {
        let mut section = InstrumentSection::default();
        let default = section.to_instrument_config().unwrap();
        assert!((default.level.value() - 0.501_187).abs() < 1e-5);

        section.level_db = Some(-10.0);
        let config = section.to_instrument_config().unwrap();
        assert!((config.level.value() - 0.1).abs() < 1e-6);

        section.level = Some(0.5);
        assert!(section
            .to_instrument_config()
            .unwrap_err()
            .is_configuration());

        section.level_db = None;
        assert_eq!(section.to_instrument_config().unwrap().level, Level::new(0.5));
    }

    #[test]
    fn test_negative_envelope_time_is_rejected() {
        let section = EnvelopeSection {
            release: -0.1,
            ..EnvelopeSection::default()
        };
        assert!(section.to_shape().unwrap_err().is_configuration());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SongConfig::load(Path::new("/nonexistent/song.toml")).unwrap_err();
        assert!(matches!(err, SynthError::Io(_)));
    }
}
