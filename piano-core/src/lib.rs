pub mod config;
pub mod detune;
pub mod device;
pub mod envelope;
pub mod error;
pub mod input;
pub mod layout;
pub mod note;
pub mod params;
pub mod piano;
pub mod tone;

#[cfg(test)]
mod mock;

pub use config::PianoConfig;
pub use device::{AudioDevice, DeviceAccessor, DeviceState, Timer};
pub use error::{DeviceError, PianoError};
pub use input::{InputRouter, KeyBindings, KeySurface};
pub use layout::{KeyColor, KeySpec, KeyboardLayout};
pub use note::{FrequencyTable, Note, PitchClass};
pub use piano::Piano;
