use std::cell::OnceCell;

use crate::error::DeviceError;
use crate::params::Waveform;

/// Run state of an audio context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Suspended,
    Running,
    Closed,
}

/// An automatable parameter (gain, frequency, detune).
///
/// Times are in seconds on the device clock.
pub trait AudioParam {
    fn value(&self) -> f32;
    fn set_value(&self, value: f32) -> Result<(), DeviceError>;
    fn set_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError>;
    fn linear_ramp_to_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError>;
    fn exponential_ramp_to_value_at_time(&self, value: f32, time: f64)
        -> Result<(), DeviceError>;
    fn cancel_scheduled_values(&self, from: f64) -> Result<(), DeviceError>;
}

pub trait OscillatorNode {
    type Param: AudioParam;

    fn set_waveform(&self, waveform: Waveform);
    fn frequency(&self) -> Self::Param;
    /// Detune in cents.
    fn detune(&self) -> Self::Param;
    fn start(&self) -> Result<(), DeviceError>;
    fn stop(&self) -> Result<(), DeviceError>;
    fn disconnect(&self) -> Result<(), DeviceError>;
}

pub trait GainNode {
    type Param: AudioParam;

    fn gain(&self) -> Self::Param;
    fn disconnect(&self) -> Result<(), DeviceError>;
}

/// The audio-processing context: clock, node factory and graph wiring.
///
/// The engine never touches a concrete audio API; the web crate implements
/// this over `web_sys::AudioContext`.
#[allow(async_fn_in_trait)]
pub trait AudioDevice {
    type Oscillator: OscillatorNode + 'static;
    type Gain: GainNode + 'static;

    fn state(&self) -> DeviceState;
    /// Resolves once the context is running again.
    async fn resume(&self) -> Result<(), DeviceError>;
    fn current_time(&self) -> f64;

    fn create_oscillator(&self) -> Result<Self::Oscillator, DeviceError>;
    fn create_gain(&self) -> Result<Self::Gain, DeviceError>;

    fn connect_oscillator(&self, from: &Self::Oscillator, to: &Self::Gain)
        -> Result<(), DeviceError>;
    fn connect_gain(&self, from: &Self::Gain, to: &Self::Gain) -> Result<(), DeviceError>;
    fn connect_to_destination(&self, from: &Self::Gain) -> Result<(), DeviceError>;
}

/// Deferred execution on the host's event loop.
pub trait Timer {
    fn defer(&self, delay_secs: f64, task: Box<dyn FnOnce()>);
}

type DeviceFactory<D> = Box<dyn Fn() -> Result<D, DeviceError>>;

/// Lazily constructs the audio device on first use and keeps it for the
/// rest of the session.
pub struct DeviceAccessor<D> {
    slot: OnceCell<D>,
    factory: DeviceFactory<D>,
}

impl<D: AudioDevice> DeviceAccessor<D> {
    pub fn new(factory: impl Fn() -> Result<D, DeviceError> + 'static) -> Self {
        Self {
            slot: OnceCell::new(),
            factory: Box::new(factory),
        }
    }

    /// The device, creating it on the first call. A failed construction is
    /// not memoized, so the next call tries again.
    pub fn get_device(&self) -> Result<&D, DeviceError> {
        if let Some(device) = self.slot.get() {
            return Ok(device);
        }
        let device = (self.factory)()?;
        log::debug!("audio device created");
        Ok(self.slot.get_or_init(|| device))
    }

    /// The device if it has already been created.
    pub fn existing(&self) -> Option<&D> {
        self.slot.get()
    }

    /// Like [`get_device`](Self::get_device), but resumes a suspended
    /// context and waits for it before returning.
    pub async fn ensure_ready(&self) -> Result<&D, DeviceError> {
        let device = self.get_device()?;
        if device.state() == DeviceState::Suspended {
            log::debug!("resuming suspended audio device");
            device.resume().await?;
        }
        Ok(device)
    }
}
