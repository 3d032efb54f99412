use piano_core::Timer;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::markup::timeout_millis;

/// `setTimeout` on the page's window.
pub struct WindowTimer {
    window: Window,
}

impl WindowTimer {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Timer for WindowTimer {
    fn defer(&self, delay_secs: f64, task: Box<dyn FnOnce()>) {
        let callback = Closure::once_into_js(move || task());
        let scheduled = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                timeout_millis(delay_secs),
            );
        if let Err(err) = scheduled {
            log::warn!("setTimeout failed: {:?}", err);
        }
    }
}
