use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The twelve chromatic pitch classes, in table order starting from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
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
    pub const ALL: [PitchClass; 12] = [
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

    /// 0-based position in `ALL` (C = 0, A = 9).
    pub fn index(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
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

    /// Sharps are the black keys.
    pub fn is_black(self) -> bool {
        matches!(
            self,
            PitchClass::CSharp
                | PitchClass::DSharp
                | PitchClass::FSharp
                | PitchClass::GSharp
                | PitchClass::ASharp
        )
    }

    /// Whether a black key sits immediately above this white key.
    /// E and B are the two white keys without one.
    pub fn has_black_after(self) -> bool {
        !self.is_black() && !matches!(self, PitchClass::E | PitchClass::B)
    }
}

/// A note name such as `C#4`: pitch class plus octave.
///
/// Ordered by pitch, so sorting notes walks the keyboard left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Note {
    octave: i8,
    pitch: PitchClass,
}

impl Note {
    pub const A4: Note = Note {
        octave: 4,
        pitch: PitchClass::A,
    };

    pub const fn new(pitch: PitchClass, octave: i8) -> Self {
        Self { octave, pitch }
    }

    pub fn pitch(&self) -> PitchClass {
        self.pitch
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Signed distance in semitones from A4.
    pub fn semitones_from_a4(&self) -> i32 {
        (self.octave as i32 - 4) * 12 + (self.pitch.index() - 9)
    }

    /// Equal-tempered frequency relative to `reference_hz` at A4.
    pub fn frequency(&self, reference_hz: f32) -> f32 {
        reference_hz * 2.0f32.powf(self.semitones_from_a4() as f32 / 12.0)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch.name(), self.octave)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseNoteError {
    #[error("empty note name")]
    Empty,
    #[error("unknown pitch class in {0:?}")]
    Pitch(String),
    #[error("invalid octave in {0:?}")]
    Octave(String),
}

impl FromStr for Note {
    type Err = ParseNoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseNoteError::Empty);
        }
        // Longest match first so "C#4" is not read as "C" + "#4".
        let (pitch, rest) = PitchClass::ALL
            .iter()
            .rev()
            .filter(|p| p.name().len() == 2)
            .chain(PitchClass::ALL.iter().filter(|p| p.name().len() == 1))
            .find_map(|p| s.strip_prefix(p.name()).map(|rest| (*p, rest)))
            .ok_or_else(|| ParseNoteError::Pitch(s.to_string()))?;
        let octave = rest
            .parse::<i8>()
            .map_err(|_| ParseNoteError::Octave(s.to_string()))?;
        Ok(Note::new(pitch, octave))
    }
}

/// Note name → fundamental frequency for a contiguous keyboard range.
///
/// Built once and never mutated. Covers every pitch class of
/// `lowest_octave..=highest_octave` plus the C that closes the range.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    entries: BTreeMap<Note, f32>,
}

impl FrequencyTable {
    pub fn new(lowest_octave: i8, highest_octave: i8, reference_hz: f32) -> Self {
        let entries = keyboard_notes(lowest_octave, highest_octave)
            .map(|note| (note, note.frequency(reference_hz)))
            .collect();
        Self { entries }
    }

    /// C3..C7 at A4 = 440 Hz.
    pub fn standard() -> Self {
        Self::new(3, 6, 440.0)
    }

    /// `None` for notes outside the range; callers treat that as a no-op.
    pub fn frequency(&self, note: Note) -> Option<f32> {
        self.entries.get(&note).copied()
    }

    pub fn contains(&self, note: Note) -> bool {
        self.entries.contains_key(&note)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Notes in ascending pitch order.
    pub fn notes(&self) -> impl Iterator<Item = Note> + '_ {
        self.entries.keys().copied()
    }
}

/// Every note of the keyboard from C of `lowest_octave` up to and including
/// C of `highest_octave + 1`.
pub fn keyboard_notes(lowest_octave: i8, highest_octave: i8) -> impl Iterator<Item = Note> {
    let body = (lowest_octave..=highest_octave)
        .flat_map(|octave| PitchClass::ALL.into_iter().map(move |p| Note::new(p, octave)));
    let top = (lowest_octave <= highest_octave)
        .then(|| Note::new(PitchClass::C, highest_octave.saturating_add(1)));
    body.chain(top)
}
