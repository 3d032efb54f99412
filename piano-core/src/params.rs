use serde::{Deserialize, Serialize};

/// Oscillator waveforms used by the additive patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl Waveform {
    pub fn name(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Triangle => "triangle",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

/// One harmonic of the additive patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    /// Multiple of the fundamental.
    pub ratio: f32,
    pub waveform: Waveform,
    /// Level of this partial's own gain stage.
    pub gain: f32,
}

impl Partial {
    pub const fn new(ratio: f32, waveform: Waveform, gain: f32) -> Self {
        Self {
            ratio,
            waveform,
            gain,
        }
    }
}

/// Four-partial piano-ish patch: bright fundamental, falling harmonics,
/// a triangle on the third for a little edge.
pub const PIANO_PARTIALS: [Partial; 4] = [
    Partial::new(1.0, Waveform::Sine, 0.6),
    Partial::new(2.0, Waveform::Sine, 0.3),
    Partial::new(3.0, Waveform::Triangle, 0.15),
    Partial::new(4.0, Waveform::Sine, 0.08),
];
