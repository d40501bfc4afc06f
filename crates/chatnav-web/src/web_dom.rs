//! `web-sys` implementation of [`HostDom`].

use std::cell::RefCell;
use std::rc::Weak;

use chatnav_core::dom::{ClickAction, HostDom};
use chatnav_core::error::DomError;
use chatnav_core::selector::Selector;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, HtmlElement, NodeList, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

use crate::keep_listener;
use crate::wasm::{Runtime, with_runtime};

type ClickClosure = Closure<dyn FnMut(Event)>;

/// Overlay controls whose detached nodes the host may re-attach.
const OWNER_SELECTOR: &str = "#chatnav-toggle, #chatnav-panel";

/// The live document, plus the click closures registered on overlay nodes.
///
/// Closures stay owned here while their element is connected, or while it
/// sits in a detached toggle or panel that nothing has replaced yet. The
/// runtime calls [`sweep_listeners`](Self::sweep_listeners) after every pass
/// so rebuilt rows do not leak their predecessors' callbacks.
pub(crate) struct WebDom {
    document: Document,
    runtime: Weak<RefCell<Runtime>>,
    listeners: Vec<(Element, ClickClosure)>,
}

impl WebDom {
    pub(crate) fn new(document: Document, runtime: Weak<RefCell<Runtime>>) -> Self {
        Self {
            document,
            runtime,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn document(&self) -> &Document {
        &self.document
    }

    pub(crate) fn runtime(&self) -> &Weak<RefCell<Runtime>> {
        &self.runtime
    }

    /// Drop click closures whose element can no longer be clicked.
    pub(crate) fn sweep_listeners(&mut self) {
        let document = &self.document;
        self.listeners.retain(|(element, _)| {
            let connected = element.is_connected();
            if connected {
                return true;
            }
            let owner_id = element.closest(OWNER_SELECTOR).ok().flatten().map(|owner| owner.id());
            let taken = owner_id
                .as_deref()
                .is_some_and(|id| document.get_element_by_id(id).is_some());
            keep_listener(connected, owner_id.as_deref(), taken)
        });
    }
}

fn host_error(err: JsValue) -> DomError {
    DomError::Host(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

pub(crate) fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl HostDom for WebDom {
    type Element = Element;

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn query_all(&self, selector: &Selector) -> Vec<Element> {
        match self.document.query_selector_all(&selector.to_css()) {
            Ok(list) => elements(&list),
            Err(_) => Vec::new(),
        }
    }

    fn has_class(&self, element: &Element, class: &str) -> bool {
        element.class_list().contains(class)
    }

    fn text_content(&self, element: &Element) -> String {
        element.text_content().unwrap_or_default()
    }

    fn subtree_contains_id(&self, root: &Element, id: &str) -> bool {
        root.id() == id
            || root
                .query_selector(&format!("#{id}"))
                .ok()
                .flatten()
                .is_some()
    }

    fn create_element(&mut self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(host_error)
    }

    fn set_id(&mut self, element: &Element, id: &str) -> Result<(), DomError> {
        element.set_id(id);
        Ok(())
    }

    fn set_text(&mut self, element: &Element, text: &str) -> Result<(), DomError> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn append_text(&mut self, parent: &Element, text: &str) -> Result<(), DomError> {
        let node = self.document.create_text_node(text);
        parent.append_child(&node).map(drop).map_err(host_error)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child).map(drop).map_err(host_error)
    }

    fn clear_children(&mut self, element: &Element) -> Result<(), DomError> {
        while let Some(child) = element.first_child() {
            element.remove_child(&child).map_err(host_error)?;
        }
        Ok(())
    }

    fn set_class(&mut self, element: &Element, class: &str, on: bool) -> Result<(), DomError> {
        element
            .class_list()
            .toggle_with_force(class, on)
            .map(drop)
            .map_err(host_error)
    }

    fn listen_click(
        &mut self,
        element: &Element,
        action: ClickAction<Element>,
    ) -> Result<(), DomError> {
        let runtime = self.runtime.clone();
        let callback = ClickClosure::new(move |_event: Event| {
            with_runtime(&runtime, |rt| rt.click(action.clone()));
        });
        element
            .add_event_listener_with_callback("click", callback.as_ref().unchecked_ref())
            .map_err(host_error)?;
        self.listeners.push((element.clone(), callback));
        Ok(())
    }

    fn scroll_into_view(&mut self, element: &Element) -> Result<(), DomError> {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
        Ok(())
    }

    fn force_layout(&mut self, element: &Element) {
        // Reading a layout property flushes pending style changes so the
        // highlight animation restarts.
        match element.dyn_ref::<HtmlElement>() {
            Some(html) => {
                let _ = html.offset_width();
            }
            None => {
                let _ = element.client_width();
            }
        }
    }
}
