use std::collections::HashMap;

use piano_core::{KeySurface, KeyboardLayout, Note};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::markup;

/// The rendered key elements, addressable by note.
pub struct DomKeyboard {
    keys: HashMap<Note, HtmlElement>,
}

impl DomKeyboard {
    /// Appends one element per key to `container`, in layout order so each
    /// black key stacks over the white key before it.
    pub fn render(
        document: &Document,
        container: &Element,
        layout: &KeyboardLayout,
    ) -> Result<Self, JsValue> {
        if let Some(container) = container.dyn_ref::<HtmlElement>() {
            let style = container.style();
            style.set_property("position", "relative")?;
            style.set_property("width", &markup::px(layout.total_width()))?;
        }

        let mut keys = HashMap::with_capacity(layout.keys().len());
        for key in layout.keys() {
            let element: HtmlElement = document.create_element("div")?.dyn_into()?;
            element.set_class_name(markup::key_class(key.color));
            element.set_attribute(markup::NOTE_ATTRIBUTE, &key.note.to_string())?;
            let style = element.style();
            style.set_property("position", "absolute")?;
            for (property, value) in markup::key_style(key) {
                style.set_property(property, &value)?;
            }

            if let Some(label) = markup::key_label(key) {
                let span = document.create_element("span")?;
                span.set_class_name("key-label");
                span.set_text_content(Some(&label));
                element.append_child(&span)?;
            }

            container.append_child(&element)?;
            keys.insert(key.note, element);
        }
        log::debug!("rendered {} keys", keys.len());
        Ok(Self { keys })
    }

    pub fn elements(&self) -> impl Iterator<Item = (Note, &HtmlElement)> {
        self.keys.iter().map(|(note, element)| (*note, element))
    }
}

impl KeySurface for DomKeyboard {
    fn set_active(&self, note: Note, active: bool) {
        let Some(element) = self.keys.get(&note) else {
            return;
        };
        if let Err(err) = element
            .class_list()
            .toggle_with_force(markup::ACTIVE_CLASS, active)
        {
            log::warn!("could not mark {} {}: {:?}", note, active, err);
        }
    }
}
