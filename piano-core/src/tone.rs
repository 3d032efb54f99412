use crate::detune::DetuneSource;
use crate::device::{AudioDevice, AudioParam, GainNode, OscillatorNode};
use crate::error::DeviceError;
use crate::params::Partial;

/// One oscillator and the gain stage it feeds.
pub struct PartialVoice<D: AudioDevice> {
    pub oscillator: D::Oscillator,
    pub gain: D::Gain,
    /// Detune applied to this oscillator, in cents.
    pub detune: Option<f32>,
}

/// The audio graph of one sounding note: every partial summed into a shared
/// output gain, which the envelope drives.
pub struct ToneHandle<D: AudioDevice> {
    output: D::Gain,
    partials: Vec<PartialVoice<D>>,
    frequency: f32,
}

impl<D: AudioDevice> ToneHandle<D> {
    pub fn output(&self) -> &D::Gain {
        &self.output
    }

    pub fn partials(&self) -> &[PartialVoice<D>] {
        &self.partials
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Stop and disconnect every partial, then disconnect the output. Keeps
    /// going past individual failures and reports the first one.
    pub fn teardown(&self) -> Result<(), DeviceError> {
        let mut first_error = None;
        for voice in &self.partials {
            let steps = [
                voice.oscillator.stop(),
                voice.oscillator.disconnect(),
                voice.gain.disconnect(),
            ];
            for e in steps.into_iter().filter_map(Result::err) {
                first_error.get_or_insert(e);
            }
        }
        if let Err(e) = self.output.disconnect() {
            first_error.get_or_insert(e);
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Build and start the additive oscillator bank for `frequency`.
///
/// Oscillators run from the moment they are created; the output gain is
/// left at its default and must be shaped by the envelope before the
/// output is connected to the destination. If construction fails half-way,
/// whatever was already started is stopped again before returning.
pub fn synthesize<D: AudioDevice>(
    device: &D,
    frequency: f32,
    patch: &[Partial],
    detune: &mut dyn DetuneSource,
) -> Result<ToneHandle<D>, DeviceError> {
    let output = device.create_gain()?;
    let mut tone = ToneHandle {
        output,
        partials: Vec::with_capacity(patch.len()),
        frequency,
    };

    for partial in patch {
        match build_partial(device, &tone.output, frequency, partial, detune) {
            Ok(voice) => tone.partials.push(voice),
            Err(e) => {
                if let Err(cleanup) = tone.teardown() {
                    log::debug!("cleanup after failed synthesis: {}", cleanup);
                }
                return Err(e);
            }
        }
    }

    Ok(tone)
}

fn build_partial<D: AudioDevice>(
    device: &D,
    output: &D::Gain,
    fundamental: f32,
    partial: &Partial,
    detune: &mut dyn DetuneSource,
) -> Result<PartialVoice<D>, DeviceError> {
    let oscillator = device.create_oscillator()?;
    oscillator.set_waveform(partial.waveform);
    oscillator.frequency().set_value(fundamental * partial.ratio)?;

    let cents = detune.next_detune();
    if let Some(cents) = cents {
        oscillator.detune().set_value(cents)?;
    }

    let gain = device.create_gain()?;
    gain.gain().set_value(partial.gain)?;

    device.connect_oscillator(&oscillator, &gain)?;
    device.connect_gain(&gain, output)?;
    oscillator.start()?;

    Ok(PartialVoice {
        oscillator,
        gain,
        detune: cents,
    })
}
