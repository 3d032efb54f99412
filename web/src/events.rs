use std::rc::Rc;

use piano_core::Note;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent, Window};

use crate::app::WebRouter;

/// Adds a listener that lives as long as the page.
fn listen(
    target: &EventTarget,
    kind: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
    callback.forget();
    Ok(())
}

/// Mouse and touch on one key. Touch handlers cancel the default so the
/// browser does not follow up with emulated mouse events.
pub fn bind_key(router: &Rc<WebRouter>, note: Note, element: &HtmlElement) -> Result<(), JsValue> {
    for (kind, cancel) in [("mousedown", false), ("touchstart", true)] {
        let router = router.clone();
        listen(element, kind, move |event| {
            if cancel {
                event.prevent_default();
            }
            let router = router.clone();
            wasm_bindgen_futures::spawn_local(async move {
                router.pointer_down(note).await;
            });
        })?;
    }

    for (kind, cancel) in [("mouseup", false), ("touchend", true), ("touchcancel", true)] {
        let router = router.clone();
        listen(element, kind, move |event| {
            if cancel {
                event.prevent_default();
            }
            router.pointer_up(note);
        })?;
    }

    let router = router.clone();
    listen(element, "mouseleave", move |_| {
        router.pointer_leave(note);
    })
}

/// Window-level keydown/keyup. Chords with a modifier belong to the browser.
pub fn bind_keyboard(router: &Rc<WebRouter>, window: &Window) -> Result<(), JsValue> {
    let down = router.clone();
    listen(window, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        if event.ctrl_key() || event.meta_key() || event.alt_key() {
            return;
        }
        let key = event.key();
        if down.bindings().resolve(&key).is_none() {
            return;
        }
        event.prevent_default();
        let repeat = event.repeat();
        let router = down.clone();
        wasm_bindgen_futures::spawn_local(async move {
            router.key_down(&key, repeat).await;
        });
    })?;

    let up = router.clone();
    listen(window, "keyup", move |event| {
        if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
            up.key_up(&event.key());
        }
    })
}
