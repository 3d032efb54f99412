use thiserror::Error;

use crate::note::Note;

/// A host audio primitive failed (context creation, node creation, connect,
/// param automation, start/stop).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct DeviceError {
    message: String,
}

impl DeviceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Failures caught at the note-on / note-off boundary. None of these reach
/// an input handler; they are logged where they are caught.
#[derive(Debug, Error)]
pub enum PianoError {
    #[error("audio device unavailable: {0}")]
    Device(#[source] DeviceError),

    #[error("failed to synthesize {note}: {source}")]
    Synthesis {
        note: Note,
        #[source]
        source: DeviceError,
    },

    #[error("failed to schedule envelope for {note}: {source}")]
    Schedule {
        note: Note,
        #[source]
        source: DeviceError,
    },

    #[error("failed to tear down {note}: {source}")]
    Teardown {
        note: Note,
        #[source]
        source: DeviceError,
    },
}
