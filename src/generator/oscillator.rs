use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

use super::SignalGenerator;
use crate::units::{Frequency, Level, SampleRate};

/// Sine oscillator
///
/// Phase accumulator: y[n] = level * sin(θ[n]), θ[n+1] = θ[n] + 2πf/rate.
/// θ is wrapped into [0, 2π) once per rendered block.
#[derive(Debug, Clone)]
pub struct SineOscillator {
    delta_theta: f32,
    level: Level,
    theta: f32,
}

impl SineOscillator {
    pub fn new(frequency: Frequency, level: Level, rate: SampleRate) -> Self {
        Self {
            delta_theta: TAU * frequency.hz() / rate.as_f32(),
            level,
            theta: 0.0,
        }
    }

    pub fn phase(&self) -> f32 {
        self.theta
    }
}

impl SignalGenerator for SineOscillator {
    fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.level.value() * self.theta.sin();
            self.theta += self.delta_theta;
        }

        self.theta = self.theta.rem_euclid(TAU);
    }
}

/// Triangle oscillator
///
/// A linear integrator bouncing between -1 and +1. The value moves by
/// `1 / half_period_samples` per sample and turns around at each bound.
#[derive(Debug, Clone)]
pub struct TriangleOscillator {
    slope: f32,
    level: Level,
    value: f32,
    rising: bool,
}

impl TriangleOscillator {
    pub fn new(frequency: Frequency, level: Level, rate: SampleRate) -> Self {
        let half_period_samples = frequency.half_period().value() * rate.as_f32();
        Self {
            slope: 1.0 / half_period_samples,
            level,
            value: 0.0,
            rising: true,
        }
    }
}

impl SignalGenerator for TriangleOscillator {
    fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.level.value() * self.value;

            if self.rising {
                self.value += self.slope;
                if self.value >= 1.0 {
                    self.value = (2.0 - self.value).max(-1.0);
                    self.rising = false;
                }
            } else {
                self.value -= self.slope;
                if self.value <= -1.0 {
                    self.value = (-2.0 - self.value).min(1.0);
                    self.rising = true;
                }
            }
        }
    }
}

/// Oscillator waveform, as named in song files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    #[default]
    Sine,
    Triangle,
}

impl Waveform {
    pub fn oscillator(self, frequency: Frequency, level: Level, rate: SampleRate) -> Oscillator {
        match self {
            Waveform::Sine => Oscillator::Sine(SineOscillator::new(frequency, level, rate)),
            Waveform::Triangle => {
                Oscillator::Triangle(TriangleOscillator::new(frequency, level, rate))
            }
        }
    }
}

/// Any of the built-in oscillators.
#[derive(Debug, Clone)]
pub enum Oscillator {
    Sine(SineOscillator),
    Triangle(TriangleOscillator),
}

impl SignalGenerator for Oscillator {
    fn render(&mut self, buffer: &mut [f32]) {
        match self {
            Oscillator::Sine(osc) => osc.render(buffer),
            Oscillator::Triangle(osc) => osc.render(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate() -> SampleRate {
        SampleRate::new(8000).unwrap()
    }

    #[test]
    fn test_sine_quarter_rate_hits_peak() {
        // f = rate/4 -> θ advances by π/2 per sample
        let mut osc = SineOscillator::new(Frequency::new(2000.0).unwrap(), Level::new(0.5), rate());
        let mut buffer = [0.0f32; 4];
        osc.render(&mut buffer);

        assert_eq!(buffer[0], 0.0);
        assert_eq!(buffer[1], 0.5);
        assert!(buffer[2].abs() < 1e-6);
        assert!((buffer[3] + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_sine_phase_wraps_once_per_block() {
        let mut osc = SineOscillator::new(Frequency::new(3000.0).unwrap(), Level::FULL, rate());
        let mut buffer = [0.0f32; 100];
        for _ in 0..10 {
            osc.render(&mut buffer);
            assert!(osc.phase() >= 0.0 && osc.phase() < TAU);
            assert!(buffer.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn test_sine_continuous_across_blocks() {
        let freq = Frequency::new(440.0).unwrap();
        let mut whole = SineOscillator::new(freq, Level::FULL, rate());
        let mut split = SineOscillator::new(freq, Level::FULL, rate());

        let mut one = [0.0f32; 64];
        whole.render(&mut one);

        let mut first = [0.0f32; 32];
        let mut second = [0.0f32; 32];
        split.render(&mut first);
        split.render(&mut second);

        for (a, b) in one.iter().zip(first.iter().chain(second.iter())) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_triangle_shape() {
        // 1000 Hz at 8000 Hz: half period = 4 samples, slope 0.25
        let mut osc = TriangleOscillator::new(Frequency::new(1000.0).unwrap(), Level::FULL, rate());
        let mut buffer = [0.0f32; 10];
        osc.render(&mut buffer);

        let expected = [0.0, 0.25, 0.5, 0.75, 1.0, 0.75, 0.5, 0.25, 0.0, -0.25];
        for (got, want) in buffer.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-6, "{buffer:?}");
        }
    }

    #[test]
    fn test_triangle_bounded_and_scaled() {
        let freq = Frequency::new(261.6).unwrap();
        let mut osc = TriangleOscillator::new(freq, Level::new(0.25), rate());
        let mut buffer = [0.0f32; 1024];
        osc.render(&mut buffer);
        assert!(buffer.iter().all(|s| s.abs() <= 0.25 + 1e-6));
        assert!(buffer.iter().any(|&s| s > 0.2));
        assert!(buffer.iter().any(|&s| s < -0.2));
    }

    #[test]
    fn test_waveform_builds_matching_oscillator() {
        let freq = Frequency::new(100.0).unwrap();
        assert!(matches!(
            Waveform::Sine.oscillator(freq, Level::FULL, rate()),
            Oscillator::Sine(_)
        ));
        assert!(matches!(
            Waveform::Triangle.oscillator(freq, Level::FULL, rate()),
            Oscillator::Triangle(_)
        ));
    }
}
