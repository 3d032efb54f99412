use std::cell::RefCell;
use std::collections::HashMap;

use crate::device::{AudioDevice, Timer};
use crate::layout::KeyboardLayout;
use crate::note::Note;
use crate::piano::Piano;

/// The rendered keyboard, as far as input routing cares: each key can be
/// shown pressed or released.
pub trait KeySurface {
    fn set_active(&self, note: Note, active: bool);
}

/// Physical keyboard character → note, built once from the layout.
#[derive(Debug, Clone, Default)]
pub struct KeyBindings {
    by_char: HashMap<char, Note>,
}

impl KeyBindings {
    pub fn from_layout(layout: &KeyboardLayout) -> Self {
        let by_char = layout
            .keys()
            .iter()
            .filter_map(|key| Some((key.binding?.to_ascii_lowercase(), key.note)))
            .collect();
        Self { by_char }
    }

    /// Resolve a DOM `KeyboardEvent.key` value. Only single printable
    /// characters bind; matching ignores case.
    pub fn resolve(&self, key: &str) -> Option<Note> {
        let mut chars = key.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        self.by_char.get(&c.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.by_char.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_char.is_empty()
    }
}

/// What is holding a key down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    Keyboard,
}

/// Turns pointer, touch and keyboard events into note-on/note-off calls
/// and keeps the visual key state in step.
pub struct InputRouter<D: AudioDevice, T: Timer, S: KeySurface> {
    piano: Piano<D, T>,
    bindings: KeyBindings,
    surface: S,
    held: RefCell<HashMap<Note, InputSource>>,
}

impl<D: AudioDevice + 'static, T: Timer, S: KeySurface> InputRouter<D, T, S> {
    pub fn new(piano: Piano<D, T>, bindings: KeyBindings, surface: S) -> Self {
        Self {
            piano,
            bindings,
            surface,
            held: RefCell::new(HashMap::new()),
        }
    }

    pub fn piano(&self) -> &Piano<D, T> {
        &self.piano
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn held_by(&self, note: Note) -> Option<InputSource> {
        self.held.borrow().get(&note).copied()
    }

    /// Auto-repeat key-downs never start a note.
    pub async fn key_down(&self, key: &str, repeat: bool) -> bool {
        if repeat {
            return false;
        }
        let Some(note) = self.bindings.resolve(key) else {
            return false;
        };
        self.press(note, InputSource::Keyboard).await
    }

    /// Always attempts the note-off, whatever the repeat state.
    pub fn key_up(&self, key: &str) -> bool {
        match self.bindings.resolve(key) {
            Some(note) => self.release(note),
            None => false,
        }
    }

    /// Pointer-down and touch-start.
    pub async fn pointer_down(&self, note: Note) -> bool {
        self.press(note, InputSource::Pointer).await
    }

    /// Pointer-up, touch-end and touch-cancel.
    pub fn pointer_up(&self, note: Note) -> bool {
        self.release(note)
    }

    /// Leaving a key releases it only if the pointer was what held it.
    pub fn pointer_leave(&self, note: Note) -> bool {
        if self.held_by(note) == Some(InputSource::Pointer) {
            self.release(note)
        } else {
            false
        }
    }

    async fn press(&self, note: Note, source: InputSource) -> bool {
        self.held.borrow_mut().insert(note, source);
        self.surface.set_active(note, true);

        let started = self.piano.note_on(note).await;

        // Released while the device was resuming
        if started && !self.held.borrow().contains_key(&note) {
            self.piano.note_off(note);
        }
        started
    }

    fn release(&self, note: Note) -> bool {
        self.held.borrow_mut().remove(&note);
        self.surface.set_active(note, false);
        self.piano.note_off(note).is_some()
    }
}
