use crate::error::EffectError;
use crate::navigation::SectionBounds;
use crate::particles::{Surface, FULL_CIRCLE};
use crate::scheduler::{Scheduler, TaskId};
use crate::telemetry::Logger;
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, Document, Event, EventTarget, HtmlElement};

pub fn dom_error(value: JsValue) -> EffectError {
    EffectError::Dom(format!("{value:?}"))
}

pub fn document() -> Result<Document, EffectError> {
    window()
        .and_then(|w| w.document())
        .ok_or(EffectError::MissingElement("document"))
}

pub fn viewport_size() -> (f64, f64) {
    let Some(win) = window() else {
        return (1280.0, 720.0);
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);

    (width, height)
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

/// Offsets of every `section[id]` in document order.
pub fn section_bounds() -> Result<Vec<SectionBounds>, EffectError> {
    let nodes = document()?
        .query_selector_all("section[id]")
        .map_err(dom_error)?;

    let mut sections = Vec::with_capacity(nodes.length() as usize);
    for index in 0..nodes.length() {
        let Some(section) = nodes
            .item(index)
            .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };

        sections.push(SectionBounds {
            id: section.id(),
            top: f64::from(section.offset_top()),
            height: f64::from(section.offset_height()),
        });
    }

    Ok(sections)
}

/// DOM event subscription removed again when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new(
        target: &EventTarget,
        event: &'static str,
        callback: impl FnMut(Event) + 'static,
    ) -> Result<Self, EffectError> {
        let callback = Closure::<dyn FnMut(Event)>::new(callback);
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(dom_error)?;

        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

pub struct CanvasSurface<'a> {
    context: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(context: &'a CanvasRenderingContext2d) -> Self {
        Self { context }
    }
}

impl Surface for CanvasSurface<'_> {
    fn clear(&mut self, width: f64, height: f64) {
        self.context.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str) {
        #[allow(deprecated)]
        self.context.set_fill_style(&JsValue::from_str(color));
        self.context.begin_path();
        let _ = self.context.arc(x, y, radius, 0.0, FULL_CIRCLE);
        self.context.fill();
    }
}

enum BrowserTask {
    Timeout {
        handle: i32,
        _callback: Closure<dyn FnMut()>,
    },
    Frame {
        handle: i32,
        _callback: Closure<dyn FnMut(f64)>,
    },
}

#[derive(Default)]
struct TaskRegistry {
    next_id: Cell<TaskId>,
    pending: RefCell<HashMap<TaskId, BrowserTask>>,
    // Callbacks that already ran. Freed on the next scheduling call, never
    // while they are still executing.
    retired: RefCell<Vec<BrowserTask>>,
}

impl TaskRegistry {
    fn allocate_id(&self) -> TaskId {
        self.retired.borrow_mut().clear();
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn retire(registry: &Weak<Self>, id: TaskId) {
        let Some(registry) = registry.upgrade() else {
            return;
        };

        let finished = registry.pending.borrow_mut().remove(&id);
        if let Some(finished) = finished {
            registry.retired.borrow_mut().push(finished);
        }
    }
}

/// [`Scheduler`] backed by `window.setTimeout` and
/// `window.requestAnimationFrame`.
pub struct BrowserScheduler {
    registry: Rc<TaskRegistry>,
    logger: Logger,
}

impl BrowserScheduler {
    pub fn new(logger: Logger) -> Self {
        Self {
            registry: Rc::new(TaskRegistry::default()),
            logger,
        }
    }

    fn report(&self, operation: &str, error: JsValue) {
        self.logger.warn(
            "effect_error",
            json!({ "operation": operation, "error": dom_error(error).to_string() }),
        );
    }
}

impl Scheduler for BrowserScheduler {
    fn now(&self) -> f64 {
        window()
            .and_then(|w| w.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn set_timeout(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> TaskId {
        let id = self.registry.allocate_id();
        let Some(win) = window() else {
            return id;
        };

        let registry = Rc::downgrade(&self.registry);
        let mut task = Some(task);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(task) = task.take() {
                task();
            }
            TaskRegistry::retire(&registry, id);
        });

        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        match win.set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(handle) => {
                self.registry.pending.borrow_mut().insert(
                    id,
                    BrowserTask::Timeout {
                        handle,
                        _callback: callback,
                    },
                );
            }
            Err(error) => self.report("set_timeout", error),
        }

        id
    }

    fn request_frame(&self, task: Box<dyn FnOnce(f64)>) -> TaskId {
        let id = self.registry.allocate_id();
        let Some(win) = window() else {
            return id;
        };

        let registry = Rc::downgrade(&self.registry);
        let mut task = Some(task);
        let callback = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            if let Some(task) = task.take() {
                task(timestamp);
            }
            TaskRegistry::retire(&registry, id);
        });

        match win.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.registry.pending.borrow_mut().insert(
                    id,
                    BrowserTask::Frame {
                        handle,
                        _callback: callback,
                    },
                );
            }
            Err(error) => self.report("request_animation_frame", error),
        }

        id
    }

    fn cancel(&self, id: TaskId) {
        let removed = self.registry.pending.borrow_mut().remove(&id);
        let Some(task) = removed else {
            return;
        };
        let Some(win) = window() else {
            return;
        };

        match task {
            BrowserTask::Timeout { handle, .. } => win.clear_timeout_with_handle(handle),
            BrowserTask::Frame { handle, .. } => {
                if let Err(error) = win.cancel_animation_frame(handle) {
                    self.report("cancel_animation_frame", error);
                }
            }
        }
    }
}
