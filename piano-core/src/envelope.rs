use serde::{Deserialize, Serialize};

use crate::device::AudioParam;
use crate::error::DeviceError;

/// ADSR envelope realized as parameter automation on a note's output gain.
///
/// Unlike a per-sample generator, the whole attack/decay/sustain shape is
/// scheduled in one go at note-on, and the release is scheduled at
/// note-off starting from whatever level the gain has reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeShape {
    /// Seconds from silence to `peak`.
    pub attack: f64,
    /// Seconds from `peak` down to `sustain`.
    pub decay: f64,
    pub peak: f32,
    pub sustain: f32, // level, not time
    /// Seconds from the release point down to `floor`.
    pub release: f64,
    /// Exponential ramps cannot reach zero, so release aims here.
    pub floor: f32,
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            peak: 0.5,
            sustain: 0.4,
            release: 0.3,
            floor: 0.001,
        }
    }
}

/// Lifecycle of one note.
/// Idle → Attacking → Decaying → Sustaining → Releasing → Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStage {
    Idle,
    Attacking,
    Decaying,
    Sustaining,
    Releasing,
    Stopped,
}

/// One automation call against an [`AudioParam`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamEvent {
    SetValue { value: f32, time: f64 },
    LinearRamp { value: f32, time: f64 },
    ExponentialRamp { value: f32, time: f64 },
    Cancel { from: f64 },
}

impl ParamEvent {
    pub fn time(&self) -> f64 {
        match *self {
            ParamEvent::SetValue { time, .. }
            | ParamEvent::LinearRamp { time, .. }
            | ParamEvent::ExponentialRamp { time, .. } => time,
            ParamEvent::Cancel { from } => from,
        }
    }

    pub fn apply<P: AudioParam>(&self, param: &P) -> Result<(), DeviceError> {
        match *self {
            ParamEvent::SetValue { value, time } => param.set_value_at_time(value, time),
            ParamEvent::LinearRamp { value, time } => {
                param.linear_ramp_to_value_at_time(value, time)
            }
            ParamEvent::ExponentialRamp { value, time } => {
                param.exponential_ramp_to_value_at_time(value, time)
            }
            ParamEvent::Cancel { from } => param.cancel_scheduled_values(from),
        }
    }
}

/// Apply `events` in order, stopping at the first failure.
pub fn schedule<P: AudioParam>(param: &P, events: &[ParamEvent]) -> Result<(), DeviceError> {
    events.iter().try_for_each(|event| event.apply(param))
}

impl EnvelopeShape {
    /// Seconds after note-on at which the sustain level is reached.
    pub fn sustain_start(&self) -> f64 {
        self.attack + self.decay
    }

    /// Attack, decay and the sustain hold point, all relative to `t0`.
    pub fn note_on_events(&self, t0: f64) -> [ParamEvent; 4] {
        let sustain_at = t0 + self.sustain_start();
        [
            ParamEvent::SetValue {
                value: 0.0,
                time: t0,
            },
            ParamEvent::LinearRamp {
                value: self.peak,
                time: t0 + self.attack,
            },
            ParamEvent::LinearRamp {
                value: self.sustain,
                time: sustain_at,
            },
            ParamEvent::SetValue {
                value: self.sustain,
                time: sustain_at,
            },
        ]
    }

    /// Drop whatever is still scheduled, pin `current` at `now` and fall
    /// exponentially to the floor.
    pub fn note_off_events(&self, now: f64, current: f32) -> [ParamEvent; 3] {
        [
            ParamEvent::Cancel { from: now },
            ParamEvent::SetValue {
                value: current,
                time: now,
            },
            ParamEvent::ExponentialRamp {
                value: self.floor,
                time: now + self.release,
            },
        ]
    }

    /// Stage of a held note `elapsed` seconds after its note-on.
    pub fn stage_at(&self, elapsed: f64) -> NoteStage {
        if elapsed < 0.0 {
            NoteStage::Idle
        } else if elapsed < self.attack {
            NoteStage::Attacking
        } else if elapsed < self.sustain_start() {
            NoteStage::Decaying
        } else {
            NoteStage::Sustaining
        }
    }
}

/// Evaluates a parameter's automation timeline the way Web Audio does for
/// the subset of calls the envelope makes.
#[derive(Debug, Clone, Default)]
pub struct Automation {
    initial: f32,
    events: Vec<ParamEvent>,
}

impl Automation {
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Intrinsic value used before the first event.
    pub fn set_initial(&mut self, value: f32) {
        self.initial = value;
    }

    pub fn push(&mut self, event: ParamEvent) {
        match event {
            ParamEvent::Cancel { from } => self.events.retain(|e| e.time() < from),
            _ => {
                // Events at equal times keep insertion order.
                let at = self
                    .events
                    .iter()
                    .position(|e| e.time() > event.time())
                    .unwrap_or(self.events.len());
                self.events.insert(at, event);
            }
        }
    }

    pub fn events(&self) -> &[ParamEvent] {
        &self.events
    }

    pub fn value_at(&self, t: f64) -> f32 {
        let mut prev_value = self.initial;
        let mut prev_time = 0.0f64;

        for event in &self.events {
            let (value, time) = match *event {
                ParamEvent::SetValue { value, time }
                | ParamEvent::LinearRamp { value, time }
                | ParamEvent::ExponentialRamp { value, time } => (value, time),
                ParamEvent::Cancel { .. } => continue,
            };

            if time <= t {
                prev_value = value;
                prev_time = time;
                continue;
            }

            let progress = (t - prev_time) / (time - prev_time);
            return match event {
                ParamEvent::LinearRamp { .. } => {
                    let (v0, v1) = (prev_value as f64, value as f64);
                    (v0 + (v1 - v0) * progress) as f32
                }
                ParamEvent::ExponentialRamp { .. } => {
                    let (v0, v1) = (prev_value as f64, value as f64);
                    if v0 == 0.0 || v0.signum() != v1.signum() {
                        prev_value
                    } else {
                        (v0 * (v1 / v0).powf(progress)) as f32
                    }
                }
                _ => prev_value,
            };
        }

        prev_value
    }
}
