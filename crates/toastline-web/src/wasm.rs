#![forbid(unsafe_code)]

//! `wasm-bindgen` exports for the toaster.
//!
//! [`WebToaster`] owns a [`NotificationQueue`] over a [`DomSurface`] and
//! keeps exactly one `setTimeout` and at most one `requestAnimationFrame`
//! outstanding, re-planned after every call into the queue. Only compiled
//! on `wasm32` targets.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use toastline::{Category, ItemId, NotificationQueue, SystemClock};
use toastline_core::logging::WEB_TARGET;
use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, Window};

use crate::dom::{DomSurface, LiveRegion};
use crate::error::DomError;
use crate::host_core::{LIVE_REGION_ID, WakePlan, parse_config};

type Queue = NotificationQueue<DomSurface, SystemClock>;

struct Inner {
    window: Window,
    queue: RefCell<Queue>,
    timer: Cell<Option<i32>>,
    frame: Cell<Option<i32>>,
    on_timer: Closure<dyn FnMut()>,
    on_frame: Closure<dyn FnMut(f64)>,
    connectivity: RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>>,
}

impl Inner {
    /// Run `f` against the queue, then re-plan browser callbacks.
    fn with_queue<R>(&self, f: impl FnOnce(&mut Queue) -> R) -> Option<R> {
        let result = match self.queue.try_borrow_mut() {
            Ok(mut queue) => f(&mut queue),
            Err(_) => {
                warn!(target: WEB_TARGET, "queue re-entered from a surface callback");
                return None;
            }
        };
        self.schedule();
        Some(result)
    }

    fn enqueue(&self, message: String, category: Category) -> Option<ItemId> {
        self.with_queue(|queue| queue.enqueue(message, category))
    }

    fn schedule(&self) {
        let plan = match self.queue.try_borrow() {
            Ok(queue) => WakePlan::for_queue(&queue),
            Err(_) => return,
        };

        if let Some(handle) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some(ms) = plan.timeout_ms {
            match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
                self.on_timer.as_ref().unchecked_ref(),
                ms,
            ) {
                Ok(handle) => self.timer.set(Some(handle)),
                Err(err) => warn!(target: WEB_TARGET, error = ?err, "setTimeout failed"),
            }
        }

        if plan.frame && self.frame.get().is_none() {
            match self
                .window
                .request_animation_frame(self.on_frame.as_ref().unchecked_ref())
            {
                Ok(handle) => self.frame.set(Some(handle)),
                Err(err) => {
                    warn!(target: WEB_TARGET, error = ?err, "requestAnimationFrame failed");
                }
            }
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            self.window.clear_timeout_with_handle(handle);
        }
        if let Some(handle) = self.frame.take() {
            let _ = self.window.cancel_animation_frame(handle);
        }
        for (event, listener) in self.connectivity.take() {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
    }
}

/// Browser toaster: one toast at a time, in arrival order.
#[wasm_bindgen]
pub struct WebToaster {
    inner: Rc<Inner>,
}

#[wasm_bindgen]
impl WebToaster {
    /// Create a toaster on `document.body`.
    ///
    /// `config_json` may set `toast_duration_ms`, `queue_delay_ms` and
    /// `settle_timeout_ms`; missing keys take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebToaster, JsValue> {
        let config = parse_config(config_json.as_deref())?;
        let window = web_sys::window().ok_or(DomError::NoWindow)?;
        let document = window.document().ok_or(DomError::NoDocument)?;
        let live_region = LiveRegion::ensure(&document, LIVE_REGION_ID)?;
        let surface = DomSurface::new(document)?;

        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let on_exit = weak.clone();
            let surface = surface.on_exit(move |id| {
                if let Some(inner) = on_exit.upgrade() {
                    inner.with_queue(|queue| queue.exit_complete(id));
                }
            });

            let on_timer = weak.clone();
            let on_timer = Closure::<dyn FnMut()>::new(move || {
                if let Some(inner) = on_timer.upgrade() {
                    inner.timer.set(None);
                    inner.with_queue(Queue::tick);
                }
            });

            let on_frame = weak.clone();
            let on_frame = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
                if let Some(inner) = on_frame.upgrade() {
                    inner.frame.set(None);
                    inner.with_queue(Queue::frame);
                }
            });

            Inner {
                window,
                queue: RefCell::new(
                    NotificationQueue::new(config, surface, SystemClock::new())
                        .with_announcer(live_region),
                ),
                timer: Cell::new(None),
                frame: Cell::new(None),
                on_timer,
                on_frame,
                connectivity: RefCell::new(Vec::new()),
            }
        });

        debug!(
            target: WEB_TARGET,
            toast_duration_ms = u64::try_from(config.toast_duration.as_millis()).unwrap_or(u64::MAX),
            queue_delay_ms = u64::try_from(config.queue_delay.as_millis()).unwrap_or(u64::MAX),
            "toaster ready"
        );
        Ok(WebToaster { inner })
    }

    /// Queue a toast. `category` is one of `info`, `success`, `warning`,
    /// `error`; anything else shows as `info`. Returns the toast id.
    pub fn enqueue(&self, message: String, category: Option<String>) -> f64 {
        let category = category
            .as_deref()
            .map_or(Category::Info, Category::from_label);
        self.inner
            .enqueue(message, category)
            .map_or(0.0, |id| id.get() as f64)
    }

    #[wasm_bindgen(js_name = pendingCount)]
    pub fn pending_count(&self) -> u32 {
        self.inner
            .queue
            .try_borrow()
            .map_or(0, |q| u32::try_from(q.pending_count()).unwrap_or(u32::MAX))
    }

    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner.queue.try_borrow().is_ok_and(|q| q.is_active())
    }

    /// Announce network changes: `online` as a success toast, `offline`
    /// as a warning.
    #[wasm_bindgen(js_name = watchConnectivity)]
    pub fn watch_connectivity(
        &self,
        online_message: String,
        offline_message: String,
    ) -> Result<(), JsValue> {
        let notices = [
            ("online", online_message, Category::Success),
            ("offline", offline_message, Category::Warning),
        ];
        for (event, message, category) in notices {
            let weak = Rc::downgrade(&self.inner);
            let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
                if let Some(inner) = weak.upgrade() {
                    inner.enqueue(message.clone(), category);
                }
            });
            self.inner
                .window
                .add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())
                .map_err(DomError::from)?;
            self.inner
                .connectivity
                .borrow_mut()
                .push((event, listener));
        }
        Ok(())
    }
}

impl WebToaster {
    /// Run `f` against the queue from Rust, re-planning callbacks after.
    pub fn with_queue<R>(&self, f: impl FnOnce(&mut Queue) -> R) -> Option<R> {
        self.inner.with_queue(f)
    }

    /// Handle of the outstanding `setTimeout`, if one is scheduled.
    #[must_use]
    pub fn scheduled_timer(&self) -> Option<i32> {
        self.inner.timer.get()
    }

    /// Whether a `requestAnimationFrame` callback is outstanding.
    #[must_use]
    pub fn awaiting_frame(&self) -> bool {
        self.inner.frame.get().is_some()
    }
}
