use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Per-oscillator micro-detune, drawn once per note-on.
///
/// Slightly detuned partials keep the additive patch from sounding
/// perfectly phase-locked.
pub trait DetuneSource {
    /// Cents to detune the next oscillator by, or `None` to leave it exact.
    fn next_detune(&mut self) -> Option<f32>;
}

/// Detunes each oscillator with probability `probability`, by a uniform
/// amount in `[-max_cents, max_cents]`.
#[derive(Debug, Clone)]
pub struct RandomDetune {
    rng: SmallRng,
    probability: f64,
    max_cents: f32,
}

impl RandomDetune {
    pub fn new(seed: u64, probability: f64, max_cents: f32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            probability: probability.clamp(0.0, 1.0),
            max_cents: max_cents.abs(),
        }
    }
}

impl DetuneSource for RandomDetune {
    fn next_detune(&mut self) -> Option<f32> {
        if !self.rng.random_bool(self.probability) {
            return None;
        }
        if self.max_cents == 0.0 {
            return Some(0.0);
        }
        Some(self.rng.random_range(-self.max_cents..=self.max_cents))
    }
}

/// Never detunes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetune;

impl DetuneSource for NoDetune {
    fn next_detune(&mut self) -> Option<f32> {
        None
    }
}
