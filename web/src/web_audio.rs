use piano_core::device::{AudioDevice, AudioParam, DeviceState, GainNode, OscillatorNode};
use piano_core::params::Waveform;
use piano_core::DeviceError;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AudioContext, AudioContextState, AudioNode, AudioScheduledSourceNode, OscillatorType};

pub(crate) fn js_error(value: JsValue) -> DeviceError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{:?}", value));
    DeviceError::new(message)
}

/// The page's `AudioContext`. Created on first use so the browser sees it
/// come out of a user gesture.
pub struct WebAudioDevice {
    context: AudioContext,
}

impl WebAudioDevice {
    pub fn create() -> Result<Self, DeviceError> {
        let context = AudioContext::new().map_err(js_error)?;
        log::info!("audio context created at {} Hz", context.sample_rate());
        Ok(Self { context })
    }
}

impl AudioDevice for WebAudioDevice {
    type Oscillator = WebOscillator;
    type Gain = WebGain;

    fn state(&self) -> DeviceState {
        match self.context.state() {
            AudioContextState::Running => DeviceState::Running,
            AudioContextState::Closed => DeviceState::Closed,
            _ => DeviceState::Suspended,
        }
    }

    async fn resume(&self) -> Result<(), DeviceError> {
        let promise = self.context.resume().map_err(js_error)?;
        JsFuture::from(promise).await.map_err(js_error)?;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.context.current_time()
    }

    fn create_oscillator(&self) -> Result<WebOscillator, DeviceError> {
        let node = self.context.create_oscillator().map_err(js_error)?;
        Ok(WebOscillator { node })
    }

    fn create_gain(&self) -> Result<WebGain, DeviceError> {
        let node = self.context.create_gain().map_err(js_error)?;
        Ok(WebGain { node })
    }

    fn connect_oscillator(&self, source: &WebOscillator, target: &WebGain) -> Result<(), DeviceError> {
        connect(&source.node, &target.node)
    }

    fn connect_gain(&self, source: &WebGain, target: &WebGain) -> Result<(), DeviceError> {
        connect(&source.node, &target.node)
    }

    fn connect_to_destination(&self, source: &WebGain) -> Result<(), DeviceError> {
        connect(&source.node, &self.context.destination())
    }
}

fn connect(source: &AudioNode, target: &AudioNode) -> Result<(), DeviceError> {
    source.connect_with_audio_node(target).map_err(js_error)?;
    Ok(())
}

pub struct WebParam {
    param: web_sys::AudioParam,
}

impl AudioParam for WebParam {
    fn value(&self) -> f32 {
        self.param.value()
    }

    fn set_value(&self, value: f32) -> Result<(), DeviceError> {
        self.param.set_value(value);
        Ok(())
    }

    fn set_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError> {
        self.param.set_value_at_time(value, time).map_err(js_error)?;
        Ok(())
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError> {
        self.param
            .linear_ramp_to_value_at_time(value, time)
            .map_err(js_error)?;
        Ok(())
    }

    fn exponential_ramp_to_value_at_time(&self, value: f32, time: f64) -> Result<(), DeviceError> {
        self.param
            .exponential_ramp_to_value_at_time(value, time)
            .map_err(js_error)?;
        Ok(())
    }

    fn cancel_scheduled_values(&self, from: f64) -> Result<(), DeviceError> {
        self.param.cancel_scheduled_values(from).map_err(js_error)?;
        Ok(())
    }
}

pub struct WebOscillator {
    node: web_sys::OscillatorNode,
}

impl WebOscillator {
    fn source(&self) -> &AudioScheduledSourceNode {
        self.node.as_ref()
    }
}

impl OscillatorNode for WebOscillator {
    type Param = WebParam;

    fn set_waveform(&self, waveform: Waveform) {
        self.node.set_type(oscillator_type(waveform));
    }

    fn frequency(&self) -> WebParam {
        WebParam {
            param: self.node.frequency(),
        }
    }

    fn detune(&self) -> WebParam {
        WebParam {
            param: self.node.detune(),
        }
    }

    fn start(&self) -> Result<(), DeviceError> {
        self.source().start().map_err(js_error)
    }

    fn stop(&self) -> Result<(), DeviceError> {
        self.source().stop().map_err(js_error)
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        let node: &AudioNode = self.node.as_ref();
        node.disconnect().map_err(js_error)
    }
}

pub struct WebGain {
    node: web_sys::GainNode,
}

impl GainNode for WebGain {
    type Param = WebParam;

    fn gain(&self) -> WebParam {
        WebParam {
            param: self.node.gain(),
        }
    }

    fn disconnect(&self) -> Result<(), DeviceError> {
        let node: &AudioNode = self.node.as_ref();
        node.disconnect().map_err(js_error)
    }
}

fn oscillator_type(waveform: Waveform) -> OscillatorType {
    match waveform {
        Waveform::Sine => OscillatorType::Sine,
        Waveform::Triangle => OscillatorType::Triangle,
        Waveform::Square => OscillatorType::Square,
        Waveform::Sawtooth => OscillatorType::Sawtooth,
    }
}
