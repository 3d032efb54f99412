use crate::config::PianoConfig;
use crate::note::{keyboard_notes, Note, PitchClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// Geometry and binding of one key, in CSS pixels relative to the
/// keyboard's left edge.
#[derive(Debug, Clone, PartialEq)]
pub struct KeySpec {
    pub note: Note,
    pub color: KeyColor,
    pub left: f32,
    pub width: f32,
    pub height: f32,
    /// Physical keyboard character that plays this key.
    pub binding: Option<char>,
}

impl KeySpec {
    pub fn is_black(&self) -> bool {
        self.color == KeyColor::Black
    }
}

/// Keys in creation order: each white key followed by the black key above
/// it, if any.
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    keys: Vec<KeySpec>,
    white_key_width: f32,
    white_count: usize,
}

impl KeyboardLayout {
    pub fn build(config: &PianoConfig) -> Self {
        let notes: Vec<Note> = keyboard_notes(config.lowest_octave, config.highest_octave).collect();
        let mut white_chars = config.white_key_chars.iter().copied();
        let mut black_chars = config.black_key_chars.iter().copied();

        let white_w = config.white_key_width;
        let black_w = config.black_key_width;

        let mut keys = Vec::with_capacity(notes.len());
        let mut white_idx = 0usize;
        for note in notes.iter().filter(|n| !n.pitch().is_black()) {
            keys.push(KeySpec {
                note: *note,
                color: KeyColor::White,
                left: white_idx as f32 * white_w,
                width: white_w,
                height: config.white_key_height,
                binding: white_chars.next(),
            });

            let sharp = sharp_above(*note);
            if let Some(sharp) = sharp.filter(|s| notes.contains(s)) {
                // Centred on the boundary with the next white key
                keys.push(KeySpec {
                    note: sharp,
                    color: KeyColor::Black,
                    left: white_idx as f32 * white_w + (white_w - black_w / 2.0),
                    width: black_w,
                    height: config.black_key_height,
                    binding: black_chars.next(),
                });
            }
            white_idx += 1;
        }

        Self {
            keys,
            white_key_width: white_w,
            white_count: white_idx,
        }
    }

    pub fn keys(&self) -> &[KeySpec] {
        &self.keys
    }

    pub fn key(&self, note: Note) -> Option<&KeySpec> {
        self.keys.iter().find(|k| k.note == note)
    }

    pub fn white_count(&self) -> usize {
        self.white_count
    }

    /// Width spanned by the white keys.
    pub fn total_width(&self) -> f32 {
        self.white_count as f32 * self.white_key_width
    }
}

/// The black key immediately above a white key, if the pattern has one.
fn sharp_above(note: Note) -> Option<Note> {
    let pitch = note.pitch();
    if !pitch.has_black_after() {
        return None;
    }
    let sharp = PitchClass::ALL[pitch.index() as usize + 1];
    Some(Note::new(sharp, note.octave()))
}
