//! Strongly typed units
//!
//! Raw numbers never cross a unit boundary unconverted: every value enters
//! through a factory function that validates it once, and conversions between
//! units (seconds to samples, decibels to linear level) live here.

use crate::error::{Result, SynthError};

/// Samples per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SampleRate(u32);

impl SampleRate {
    /// Create a sample rate, rejecting zero.
    pub fn new(samples_per_second: u32) -> Result<Self> {
        if samples_per_second == 0 {
            return Err(SynthError::configuration("sample rate must be positive"));
        }
        Ok(Self(samples_per_second))
    }

    /// Get the rate in samples per second
    pub fn hz(self) -> u32 {
        self.0
    }

    pub(crate) fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

/// A non-negative duration.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Seconds(f32);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0.0);

    /// Create a duration, rejecting negative and non-finite values.
    ///
    /// # Arguments
    /// * `seconds` - Length in seconds, finite and `>= 0`
    ///
    /// # Example
    /// ```
    /// use gridsynth::units::{SampleRate, Seconds};
    ///
    /// let rate = SampleRate::new(8000)?;
    /// assert_eq!(Seconds::new(0.5)?.to_samples(rate), 4000);
    /// assert!(Seconds::new(-1.0).is_err());
    /// # Ok::<(), gridsynth::SynthError>(())
    /// ```
    pub fn new(seconds: f32) -> Result<Self> {
        if !seconds.is_finite() || seconds < 0.0 {
            return Err(SynthError::configuration(format!(
                "duration must be a non-negative number of seconds, got {seconds}"
            )));
        }
        Ok(Self(seconds))
    }

    /// Convenience for millisecond literals.
    pub fn from_millis(millis: f32) -> Result<Self> {
        Self::new(millis / 1000.0)
    }

    /// Get the duration in seconds
    pub fn value(self) -> f32 {
        self.0
    }

    /// Number of whole samples covered by this duration.
    ///
    /// Truncates: 0.99 samples worth of time is 0 samples.
    pub fn to_samples(self, rate: SampleRate) -> u32 {
        (self.0 * rate.as_f32()) as u32
    }

    // Products of validated non-negative values stay valid.
    pub(crate) fn scaled(self, factor: f32) -> Seconds {
        Seconds(self.0 * factor)
    }

    pub fn plus(self, other: Seconds) -> Seconds {
        Seconds(self.0 + other.0)
    }
}

/// Pitch in hertz.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Frequency(f32);

impl Frequency {
    /// Create a frequency, rejecting zero, negative and non-finite values.
    pub fn new(hertz: f32) -> Result<Self> {
        if !hertz.is_finite() || hertz <= 0.0 {
            return Err(SynthError::configuration(format!(
                "frequency must be positive, got {hertz} Hz"
            )));
        }
        Ok(Self(hertz))
    }

    /// Get the frequency in hertz
    pub fn hz(self) -> f32 {
        self.0
    }

    /// Time between the two zero crossings of one cycle.
    pub fn half_period(self) -> Seconds {
        Seconds(1.0 / (2.0 * self.0))
    }
}

/// Linear amplitude in `[0, 1]`.
///
/// Out-of-range input is clamped silently.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Level(f32);

impl Level {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 1.0;

    pub const SILENT: Level = Level(Self::MIN);
    pub const FULL: Level = Level(Self::MAX);

    /// Create a level, clamping into `[0, 1]`; NaN becomes silence.
    pub fn new(linear: f32) -> Self {
        if linear.is_nan() {
            return Self::SILENT;
        }
        Self(linear.clamp(Self::MIN, Self::MAX))
    }

    /// Get the linear gain
    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<DecibelLevel> for Level {
    fn from(db: DecibelLevel) -> Self {
        db.to_level()
    }
}

/// Level relative to full scale, in decibels.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct DecibelLevel(f32);

impl DecibelLevel {
    /// Any finite or infinite dB value; the linear level is clamped on conversion.
    pub fn new(db: f32) -> Self {
        Self(db)
    }

    /// Get the level in dB
    pub fn value(self) -> f32 {
        self.0
    }

    /// Convert with the power-ratio form `10^(dB/10)`, so -3 dB is about 0.5.
    pub fn to_level(self) -> Level {
        Level::new(10f32.powf(self.0 / 10.0) * Level::MAX)
    }
}

impl std::ops::Neg for DecibelLevel {
    type Output = DecibelLevel;

    fn neg(self) -> Self::Output {
        DecibelLevel(-self.0)
    }
}

/// Number of samples rendered per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(usize);

impl BlockSize {
    /// Create a block size, rejecting zero.
    pub fn new(samples_per_block: usize) -> Result<Self> {
        if samples_per_block == 0 {
            return Err(SynthError::configuration("block size must be positive"));
        }
        Ok(Self(samples_per_block))
    }

    /// Get the number of samples per block
    pub fn samples(self) -> usize {
        self.0
    }
}

/// Tempo in beats per minute, 4/4 time.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bpm(f32);

impl Bpm {
    /// Create a tempo, rejecting zero, negative and non-finite values.
    pub fn new(beats_per_minute: f32) -> Result<Self> {
        if !beats_per_minute.is_finite() || beats_per_minute <= 0.0 {
            return Err(SynthError::configuration(format!(
                "tempo must be positive, got {beats_per_minute} BPM"
            )));
        }
        Ok(Self(beats_per_minute))
    }

    /// Get the tempo in beats per minute
    pub fn value(self) -> f32 {
        self.0
    }

    /// Length of one quarter-note beat.
    pub fn beat(self) -> Seconds {
        Seconds(60.0 / self.0)
    }

    /// Length of one 4/4 bar.
    pub fn bar(self) -> Seconds {
        self.beat().scaled(4.0)
    }

    /// One grid column of the notation format.
    pub fn sixteenth(self) -> Seconds {
        self.bar().scaled(1.0 / 16.0)
    }
}
