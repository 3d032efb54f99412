use std::rc::Rc;

use piano_core::{DeviceAccessor, InputRouter, KeyBindings, KeyboardLayout, Piano};
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::dom::DomKeyboard;
use crate::events;
use crate::logger;
use crate::markup;
use crate::options::WebOptions;
use crate::timer::WindowTimer;
use crate::web_audio::WebAudioDevice;

pub type WebRouter = InputRouter<WebAudioDevice, WindowTimer, DomKeyboard>;

/// Renders the keyboard into `container_id` and wires every input to it.
/// The audio context is not created until the first key is played.
pub fn mount(container_id: &str, options: JsValue) -> Result<(), JsValue> {
    let options: WebOptions = if options.is_undefined() || options.is_null() {
        WebOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)?
    };
    logger::init(options.level_filter());
    let config = options.piano;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = document
        .get_element_by_id(container_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id '{}'", container_id)))?;

    let layout = KeyboardLayout::build(&config);
    let keyboard = DomKeyboard::render(&document, &container, &layout)?;
    let elements: Vec<(_, HtmlElement)> = keyboard
        .elements()
        .map(|(note, element)| (note, element.clone()))
        .collect();

    let detune = config.detune_source(markup::seed_from_unit(js_sys::Math::random()));
    let piano = Piano::new(
        &config,
        DeviceAccessor::new(WebAudioDevice::create),
        WindowTimer::new(window.clone()),
        Box::new(detune),
    );
    let router = Rc::new(InputRouter::new(
        piano,
        KeyBindings::from_layout(&layout),
        keyboard,
    ));

    for (note, element) in &elements {
        events::bind_key(&router, *note, element)?;
    }
    events::bind_keyboard(&router, &window)?;

    log::info!(
        "piano mounted on #{}: {} keys, {} bound to the keyboard",
        container_id,
        layout.keys().len(),
        router.bindings().len()
    );
    Ok(())
}
