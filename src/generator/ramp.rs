use crate::units::{Level, SampleRate, Seconds};

/// A linear ramp segment: a fixed per-sample increment toward a target level.
///
/// The ramp is stateless; the caller owns the running level. Upward ramps
/// finish once the level is `>=` the target, downward ramps once it is `<=`.
/// A flat ramp (zero increment) finishes on its first step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ramp {
    increment: f32,
    target: f32,
}

impl Ramp {
    /// A ramp that holds `target` and never moves.
    pub const fn hold(target: f32) -> Self {
        Self {
            increment: 0.0,
            target,
        }
    }

    /// Ramp from `start` to `target` over `time`.
    ///
    /// A duration shorter than one sample reaches the target in one step.
    pub fn between(start: f32, target: f32, time: Seconds, rate: SampleRate) -> Self {
        let samples = time.to_samples(rate).max(1);
        Self {
            increment: (target - start) / samples as f32,
            target,
        }
    }

    pub fn between_levels(start: Level, target: Level, time: Seconds, rate: SampleRate) -> Self {
        Self::between(start.value(), target.value(), time, rate)
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Advance `level` by one sample.
    ///
    /// Returns true once the target has been reached; the level is then
    /// clamped to exactly the target.
    pub fn step(&self, level: &mut f32) -> bool {
        *level += self.increment;

        let reached = if self.increment >= 0.0 {
            *level >= self.target
        } else {
            *level <= self.target
        };

        if reached {
            *level = self.target;
        }
        reached
    }
}
