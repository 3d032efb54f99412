use serde::{Deserialize, Serialize};

use crate::detune::RandomDetune;
use crate::envelope::EnvelopeShape;
use crate::note::FrequencyTable;
use crate::params::{Partial, PIANO_PARTIALS};

/// Characters bound to white keys, left to right.
pub const WHITE_KEY_CHARS: &[char] = &[
    'a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\'', 'z', 'x', 'c', 'v', 'b', 'n', 'm',
    ',', '.', '/',
];

/// Characters bound to black keys, left to right.
pub const BLACK_KEY_CHARS: &[char] = &[
    'w', 'e', 't', 'y', 'u', 'o', 'p', '[', ']', '2', '3', '5', '6', '7', '9', '0', '-', '=',
];

/// Everything tunable about the piano. `Default` is the stock instrument;
/// any field left out of a deserialized config keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PianoConfig {
    /// Frequency of A4 in Hz.
    pub reference_pitch: f32,
    pub lowest_octave: i8,
    /// Last full octave; the keyboard closes on the C above it.
    pub highest_octave: i8,
    pub envelope: EnvelopeShape,
    pub partials: Vec<Partial>,
    /// Chance that any one oscillator gets detuned on note-on.
    pub detune_probability: f64,
    pub max_detune_cents: f32,
    /// Fixes the detune sequence; drawn from the host when absent.
    pub detune_seed: Option<u64>,
    pub white_key_width: f32,
    pub white_key_height: f32,
    pub black_key_width: f32,
    pub black_key_height: f32,
    pub white_key_chars: Vec<char>,
    pub black_key_chars: Vec<char>,
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            reference_pitch: 440.0,
            lowest_octave: 3,
            highest_octave: 6,
            envelope: EnvelopeShape::default(),
            partials: PIANO_PARTIALS.to_vec(),
            detune_probability: 0.5,
            max_detune_cents: 1.0,
            detune_seed: None,
            white_key_width: 40.0,
            white_key_height: 160.0,
            black_key_width: 24.0,
            black_key_height: 100.0,
            white_key_chars: WHITE_KEY_CHARS.to_vec(),
            black_key_chars: BLACK_KEY_CHARS.to_vec(),
        }
    }
}

impl PianoConfig {
    pub fn frequency_table(&self) -> FrequencyTable {
        FrequencyTable::new(self.lowest_octave, self.highest_octave, self.reference_pitch)
    }

    /// Detune source seeded from `detune_seed`, or from `host_seed` when the
    /// config leaves it open.
    pub fn detune_source(&self, host_seed: u64) -> RandomDetune {
        RandomDetune::new(
            self.detune_seed.unwrap_or(host_seed),
            self.detune_probability,
            self.max_detune_cents,
        )
    }
}
