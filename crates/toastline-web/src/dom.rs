#![forbid(unsafe_code)]

//! DOM-backed surface and live region.
//!
//! Only compiled on `wasm32` targets.

use std::rc::Rc;

use toastline::{Announcer, ItemId, Politeness, QueueItem, ToastSurface};
use toastline_core::logging::WEB_TARGET;
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, Event, HtmlElement};

use crate::error::DomError;
use crate::host_core::{
    EXIT_EVENT, SHOW_CLASS, TOAST_ROLE, VISUALLY_HIDDEN_STYLE, toast_class_name,
};

type ExitListener = Closure<dyn FnMut(Event)>;

/// The document of the current window.
pub fn document() -> Result<Document, DomError> {
    web_sys::window()
        .ok_or(DomError::NoWindow)?
        .document()
        .ok_or(DomError::NoDocument)
}

struct Mounted {
    id: ItemId,
    element: Element,
    listener: Option<ExitListener>,
}

impl Mounted {
    fn drop_listener(&mut self) -> Option<ExitListener> {
        let listener = self.listener.take()?;
        if let Err(err) = self
            .element
            .remove_event_listener_with_callback(EXIT_EVENT, listener.as_ref().unchecked_ref())
        {
            warn!(target: WEB_TARGET, error = ?err, "failed to remove exit listener");
        }
        Some(listener)
    }
}

/// Toast elements appended to a container (by default `document.body`).
pub struct DomSurface {
    document: Document,
    container: HtmlElement,
    on_exit: Rc<dyn Fn(ItemId)>,
    active: Option<Mounted>,
    // A listener may be the caller of `detach`; it is dropped on the next mount.
    retired: Vec<ExitListener>,
}

impl DomSurface {
    /// Surface that appends toasts to `document.body`.
    pub fn new(document: Document) -> Result<Self, DomError> {
        let container = document.body().ok_or(DomError::NoBody)?;
        Ok(Self::with_container(document, container))
    }

    #[must_use]
    pub fn with_container(document: Document, container: HtmlElement) -> Self {
        Self {
            document,
            container,
            on_exit: Rc::new(|_| {}),
            active: None,
            retired: Vec::new(),
        }
    }

    /// Callback run when a toast's exit animation ends.
    #[must_use]
    pub fn on_exit(mut self, handler: impl Fn(ItemId) + 'static) -> Self {
        self.on_exit = Rc::new(handler);
        self
    }

    /// The element of the toast currently mounted.
    #[must_use]
    pub fn element(&self) -> Option<&Element> {
        self.active.as_ref().map(|m| &m.element)
    }

    fn mounted(&mut self, id: ItemId) -> Result<&mut Mounted, DomError> {
        self.active
            .as_mut()
            .filter(|m| m.id == id)
            .ok_or(DomError::NotMounted(id))
    }
}

impl ToastSurface for DomSurface {
    type Error = DomError;

    fn mount(&mut self, item: &QueueItem) -> Result<(), Self::Error> {
        self.retired.clear();
        if let Some(mut stale) = self.active.take() {
            self.retired.extend(stale.drop_listener());
            stale.element.remove();
        }

        let element = self.document.create_element("div")?;
        element.set_class_name(&toast_class_name(item.category));
        element.set_attribute("role", TOAST_ROLE)?;
        element.set_attribute("aria-live", item.category.politeness().as_aria_live())?;
        element.set_text_content(Some(&item.message));
        self.container.append_child(&element)?;

        self.active = Some(Mounted {
            id: item.id,
            element,
            listener: None,
        });
        Ok(())
    }

    fn show(&mut self, id: ItemId) -> Result<(), Self::Error> {
        self.mounted(id)?.element.class_list().add_1(SHOW_CLASS)?;
        Ok(())
    }

    fn hide(&mut self, id: ItemId) -> Result<(), Self::Error> {
        let on_exit = Rc::clone(&self.on_exit);
        let mounted = self.mounted(id)?;
        mounted.element.class_list().remove_1(SHOW_CLASS)?;

        let listener = ExitListener::new(move |_event: Event| {
            trace!(target: WEB_TARGET, item = %id, "exit transition ended");
            on_exit(id);
        });
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        mounted
            .element
            .add_event_listener_with_callback_and_add_event_listener_options(
                EXIT_EVENT,
                listener.as_ref().unchecked_ref(),
                &options,
            )?;
        mounted.listener = Some(listener);
        Ok(())
    }

    fn detach(&mut self, id: ItemId) -> Result<(), Self::Error> {
        let mut mounted = match self.active.take() {
            Some(m) if m.id == id => m,
            other => {
                self.active = other;
                return Err(DomError::NotMounted(id));
            }
        };
        self.retired.extend(mounted.drop_listener());
        mounted.element.remove();
        Ok(())
    }
}

impl Drop for DomSurface {
    fn drop(&mut self) {
        if let Some(mut mounted) = self.active.take() {
            drop(mounted.drop_listener());
            mounted.element.remove();
        }
    }
}

/// Visually hidden element mirrored to assistive technology.
pub struct LiveRegion {
    element: Element,
}

impl LiveRegion {
    /// Reuse the element with `id`, or create and append it to `body`.
    pub fn ensure(document: &Document, id: &str) -> Result<Self, DomError> {
        let element = match document.get_element_by_id(id) {
            Some(existing) => existing,
            None => {
                let element = document.create_element("div")?;
                element.set_id(id);
                element.set_attribute("style", VISUALLY_HIDDEN_STYLE)?;
                document
                    .body()
                    .ok_or(DomError::NoBody)?
                    .append_child(&element)?;
                element
            }
        };
        element.set_attribute("aria-live", Politeness::Polite.as_aria_live())?;
        element.set_attribute("aria-atomic", "true")?;
        Ok(Self { element })
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.element
    }
}

impl Announcer for LiveRegion {
    /// The region stays `polite`; urgency is carried by the toast element.
    fn announce(&mut self, message: &str, _politeness: Politeness) {
        // Cleared first so an identical message is read again.
        self.element.set_text_content(None);
        self.element.set_text_content(Some(message));
    }
}
