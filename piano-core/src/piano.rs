use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::config::PianoConfig;
use crate::detune::DetuneSource;
use crate::device::{AudioDevice, AudioParam, DeviceAccessor, GainNode, Timer};
use crate::envelope::{schedule, EnvelopeShape, NoteStage};
use crate::error::PianoError;
use crate::note::{FrequencyTable, Note};
use crate::params::Partial;
use crate::tone::{synthesize, ToneHandle};

/// A sounding note: its tone graph plus when and as which generation it
/// started.
pub struct ActiveNote<D: AudioDevice> {
    tone: ToneHandle<D>,
    started_at: f64,
    generation: u64,
}

impl<D: AudioDevice> ActiveNote<D> {
    pub fn tone(&self) -> &ToneHandle<D> {
        &self.tone
    }

    pub fn frequency(&self) -> f32 {
        self.tone.frequency()
    }

    /// Device time of the note-on.
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Identifies one released tone waiting for its deferred teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TeardownTicket {
    pub note: Note,
    pub generation: u64,
}

type Parked<D> = Rc<RefCell<HashMap<TeardownTicket, ToneHandle<D>>>>;

/// The note engine: one tone per held note, envelope on, envelope off,
/// deferred teardown.
///
/// All methods take `&self`; state sits in `RefCell`s that are never held
/// across an `.await`, so the engine can be shared through an `Rc` by every
/// input handler on the page.
pub struct Piano<D: AudioDevice, T: Timer> {
    table: FrequencyTable,
    envelope: EnvelopeShape,
    partials: Vec<Partial>,
    device: DeviceAccessor<D>,
    timer: T,
    detune: RefCell<Box<dyn DetuneSource>>,
    active: RefCell<HashMap<Note, ActiveNote<D>>>,
    generations: RefCell<HashMap<Note, u64>>,
    releasing: Parked<D>,
}

impl<D: AudioDevice + 'static, T: Timer> Piano<D, T> {
    pub fn new(
        config: &PianoConfig,
        device: DeviceAccessor<D>,
        timer: T,
        detune: Box<dyn DetuneSource>,
    ) -> Self {
        Self {
            table: config.frequency_table(),
            envelope: config.envelope,
            partials: config.partials.clone(),
            device,
            timer,
            detune: RefCell::new(detune),
            active: RefCell::new(HashMap::new()),
            generations: RefCell::new(HashMap::new()),
            releasing: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    pub fn frequency_table(&self) -> &FrequencyTable {
        &self.table
    }

    pub fn device(&self) -> &DeviceAccessor<D> {
        &self.device
    }

    pub fn is_active(&self, note: Note) -> bool {
        self.active.borrow().contains_key(&note)
    }

    /// Currently held notes, lowest first.
    pub fn active_notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.active.borrow().keys().copied().collect();
        notes.sort();
        notes
    }

    pub fn with_active<R>(&self, note: Note, f: impl FnOnce(&ActiveNote<D>) -> R) -> Option<R> {
        self.active.borrow().get(&note).map(f)
    }

    /// Released tones whose teardown has not run yet.
    pub fn releasing_count(&self) -> usize {
        self.releasing.borrow().len()
    }

    pub fn stage(&self, note: Note) -> NoteStage {
        if let Some(started_at) = self.with_active(note, |a| a.started_at) {
            let now = self.device.existing().map_or(started_at, |d| d.current_time());
            return self.envelope.stage_at(now - started_at);
        }
        if self.releasing.borrow().keys().any(|t| t.note == note) {
            NoteStage::Releasing
        } else if self.generations.borrow().contains_key(&note) {
            NoteStage::Stopped
        } else {
            NoteStage::Idle
        }
    }

    /// Start `note`, replacing it if it is already sounding.
    ///
    /// Waits for the device to be running first. Returns whether a tone was
    /// started; notes outside the keyboard and any failure along the way
    /// are logged and leave the engine unchanged.
    pub async fn note_on(&self, note: Note) -> bool {
        let Some(frequency) = self.table.frequency(note) else {
            log::debug!("ignoring note-on for {} outside the keyboard", note);
            return false;
        };

        let device = match self.device.ensure_ready().await {
            Ok(device) => device,
            Err(e) => {
                log::error!("{}", PianoError::Device(e));
                return false;
            }
        };

        // Last press wins
        self.note_off(note);

        match self.start_tone(device, note, frequency) {
            Ok(active) => {
                log::debug!("note on {} ({:.2} Hz)", note, frequency);
                self.active.borrow_mut().insert(note, active);
                true
            }
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    /// Release `note`: ramp it down and schedule its teardown. Returns the
    /// teardown ticket, or `None` if the note was not sounding.
    pub fn note_off(&self, note: Note) -> Option<TeardownTicket> {
        let device = self.device.existing()?;
        let active = self.active.borrow_mut().remove(&note)?;
        let ticket = TeardownTicket {
            note,
            generation: active.generation,
        };

        let gain = active.tone.output().gain();
        let events = self
            .envelope
            .note_off_events(device.current_time(), gain.value());
        if let Err(source) = schedule(&gain, &events) {
            log::error!("{}", PianoError::Schedule { note, source });
        }

        self.releasing.borrow_mut().insert(ticket, active.tone);
        let parked = Rc::clone(&self.releasing);
        self.timer.defer(
            self.envelope.release,
            Box::new(move || {
                teardown_parked(&parked, ticket);
            }),
        );
        log::debug!("note off {}", note);
        Some(ticket)
    }

    /// Tear down the tone parked under `ticket` now. Returns `false` for a
    /// stale ticket whose tone is already gone.
    pub fn teardown(&self, ticket: TeardownTicket) -> bool {
        teardown_parked(&self.releasing, ticket)
    }

    fn start_tone(&self, device: &D, note: Note, frequency: f32) -> Result<ActiveNote<D>, PianoError> {
        let mut detune = self.detune.borrow_mut();
        let tone = synthesize(device, frequency, &self.partials, &mut **detune)
            .map_err(|source| PianoError::Synthesis { note, source })?;
        drop(detune);

        let t0 = device.current_time();
        let wired = schedule(&tone.output().gain(), &self.envelope.note_on_events(t0))
            .map_err(|source| PianoError::Schedule { note, source })
            .and_then(|()| {
                device
                    .connect_to_destination(tone.output())
                    .map_err(|source| PianoError::Synthesis { note, source })
            });
        if let Err(e) = wired {
            if let Err(cleanup) = tone.teardown() {
                log::debug!("cleanup after failed note-on {}: {}", note, cleanup);
            }
            return Err(e);
        }

        Ok(ActiveNote {
            tone,
            started_at: t0,
            generation: self.next_generation(note),
        })
    }

    fn next_generation(&self, note: Note) -> u64 {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(note).or_insert(0);
        *generation += 1;
        *generation
    }
}

fn teardown_parked<D: AudioDevice>(parked: &Parked<D>, ticket: TeardownTicket) -> bool {
    let Some(tone) = parked.borrow_mut().remove(&ticket) else {
        log::debug!(
            "stale teardown for {} generation {}",
            ticket.note,
            ticket.generation
        );
        return false;
    };
    if let Err(source) = tone.teardown() {
        log::warn!(
            "{}",
            PianoError::Teardown {
                note: ticket.note,
                source
            }
        );
    }
    true
}
