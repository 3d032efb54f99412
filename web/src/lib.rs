#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod events;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod markup;
mod options;
#[cfg(target_arch = "wasm32")]
mod timer;
#[cfg(target_arch = "wasm32")]
mod web_audio;

pub use options::WebOptions;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
/// Runs when the module loads: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
    Ok(())
}

/// `mount(containerId, options?)` from JavaScript.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn mount(container_id: &str, options: JsValue) -> Result<(), JsValue> {
    app::mount(container_id, options)
}
