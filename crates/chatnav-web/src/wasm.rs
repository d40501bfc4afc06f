//! Page wiring: boot, observers, timers and history hooks.
//!
//! Every host callback funnels into [`with_runtime`], which upgrades a weak
//! handle and takes the runtime mutably for the duration of one guardian
//! call. Time is measured from boot with `web_time::Instant`.

use core::fmt;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chatnav_core::frame_headers::{ResponseHeader, strip_frame_blockers};
use chatnav_core::{
    ClickAction, FrameContext, Guardian, HistorySignal, InitError, NavigatorConfig, info, warn,
};
use js_sys::{Array, Function, JSON, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Element, Event, History, MutationObserver, MutationObserverInit, MutationRecord,
    Window,
};
use web_time::Instant;

use crate::web_dom::{WebDom, elements};
use crate::{LOADED_FLAG, parse_options};

type SharedRuntime = Rc<RefCell<Runtime>>;

thread_local! {
    // Strong owner of the runtime; every callback holds a `Weak`.
    static RUNTIME: RefCell<Option<SharedRuntime>> = const { RefCell::new(None) };
}

pub(crate) struct Runtime {
    dom: WebDom,
    guardian: Guardian,
    origin: Instant,
    /// Deadline of the currently scheduled one-shot wakeup.
    wakeup_at: Option<Duration>,
    body_observer: Option<MutationObserver>,
    observed_body: Option<Element>,
}

/// Run `f` against the live runtime. Callbacks that arrive while the runtime
/// is already borrowed are dropped; the periodic tick covers anything missed.
pub(crate) fn with_runtime(runtime: &Weak<RefCell<Runtime>>, f: impl FnOnce(&mut Runtime)) {
    let Some(shared) = runtime.upgrade() else {
        return;
    };
    match shared.try_borrow_mut() {
        Ok(mut rt) => f(&mut rt),
        Err(_) => warn!("navigator callback re-entered; skipped"),
    };
}

/// Surface a host failure on the page console, where extension logs are read.
fn report(context: &str, err: &dyn fmt::Debug) {
    warn!(context, "navigator host failure");
    web_sys::console::warn_1(&JsValue::from_str(&format!("chatnav: {context}: {err:?}")));
}

fn js_error(message: impl Into<String>) -> JsValue {
    JsValue::from_str(&message.into())
}

/// Start the navigator on the current page.
///
/// `options` is an optional plain object of [`NavigatorConfig`] overrides.
/// Returns `false` when the page is not a supported site or the navigator
/// is already running here.
#[wasm_bindgen]
pub fn boot(options: JsValue) -> Result<bool, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    if is_loaded(&window) {
        return Ok(false);
    }
    Reflect::set(&window, &JsValue::from_str(LOADED_FLAG), &JsValue::TRUE)?;

    let config = read_options(&options)?;
    let hostname = window.location().hostname()?;
    let frame = frame_context(&window);
    let Some(guardian) = Guardian::boot(&hostname, frame, config) else {
        info!(%hostname, "unsupported host; staying inert");
        return Ok(false);
    };

    let shared: SharedRuntime = Rc::new_cyclic(|weak| {
        RefCell::new(Runtime {
            dom: WebDom::new(document.clone(), weak.clone()),
            guardian,
            origin: Instant::now(),
            wakeup_at: None,
            body_observer: None,
            observed_body: None,
        })
    });
    let weak = Rc::downgrade(&shared);
    RUNTIME.with(|slot| *slot.borrow_mut() = Some(shared));

    if document.ready_state() == "loading" {
        let ready = Closure::once_into_js(move || initialize(&weak));
        document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
    } else {
        initialize(&weak);
    }
    Ok(true)
}

fn is_loaded(window: &Window) -> bool {
    RUNTIME.with(|slot| slot.borrow().is_some())
        || Reflect::get(window, &JsValue::from_str(LOADED_FLAG)).is_ok_and(|flag| flag.is_truthy())
}

fn read_options(options: &JsValue) -> Result<NavigatorConfig, JsValue> {
    let json = if options.is_undefined() || options.is_null() {
        None
    } else {
        Some(String::from(JSON::stringify(options)?))
    };
    parse_options(json.as_deref()).map_err(|err| js_error(format!("invalid options: {err}")))
}

/// A frame whose `top` is another window (or cannot be read) is the
/// browser's side panel.
fn frame_context(window: &Window) -> FrameContext {
    match window.top() {
        Ok(Some(top)) if JsValue::from(top) != JsValue::from(window.clone()) => {
            FrameContext::Sidebar
        }
        Ok(_) => FrameContext::TopLevel,
        Err(_) => FrameContext::Sidebar,
    }
}

fn initialize(runtime: &Weak<RefCell<Runtime>>) {
    let mut retry = None;
    with_runtime(runtime, |rt| match rt.install() {
        Ok(()) => {}
        Err(InitError::BodyNotReady) => retry = Some(rt.guardian.config().init_retry()),
        Err(err) => report("install failed", &err),
    });
    if let Some(delay) = retry {
        let again = runtime.clone();
        let callback = Closure::once_into_js(move || initialize(&again));
        if let Err(err) = set_timeout(&callback, delay) {
            report("could not schedule install retry", &err);
        }
    }
}

fn set_timeout(callback: &JsValue, delay: Duration) -> Result<i32, JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
}

impl Runtime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn install(&mut self) -> Result<(), InitError> {
        let now = self.now();
        self.guardian.install(&mut self.dom, now)?;

        let wired = self
            .observe_root()
            .and_then(|()| self.hook_history())
            .and_then(|()| self.start_tick());
        if let Err(err) = wired {
            report("wiring incomplete", &err);
        }

        let profile = self.guardian.profile();
        web_sys::console::log_1(&JsValue::from_str(&format!(
            "Conversation navigator loaded for {} ({})",
            profile.title,
            self.guardian.frame().label(),
        )));
        self.after_pass();
        Ok(())
    }

    // --- host wiring ---------------------------------------------------

    fn observe_root(&mut self) -> Result<(), JsValue> {
        let root = self
            .dom
            .document()
            .document_element()
            .ok_or_else(|| js_error("no document element"))?;

        let runtime = self.dom.runtime().clone();
        let on_root = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |_records: Array, _observer: MutationObserver| {
                with_runtime(&runtime, Runtime::root_mutation);
            },
        );
        let root_observer = MutationObserver::new(on_root.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        root_observer.observe_with_options(&root, &init)?;
        on_root.forget();

        let runtime = self.dom.runtime().clone();
        let on_body = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let removed = removed_elements(&records);
                if !removed.is_empty() {
                    with_runtime(&runtime, |rt| rt.body_mutation(&removed));
                }
            },
        );
        self.body_observer = Some(MutationObserver::new(on_body.as_ref().unchecked_ref())?);
        on_body.forget();
        self.observe_current_body();
        Ok(())
    }

    /// (Re)attach the body observer when the host has swapped `<body>`.
    fn observe_current_body(&mut self) {
        let (Some(observer), Some(body)) = (&self.body_observer, self.dom.document().body()) else {
            return;
        };
        let body = Element::from(body);
        if self.observed_body.as_ref() == Some(&body) {
            return;
        }
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        match observer.observe_with_options(&body, &init) {
            Ok(()) => self.observed_body = Some(body),
            Err(err) => report("could not observe body", &err),
        }
    }

    fn hook_history(&mut self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let history = window.history()?;
        for signal in HistorySignal::WRAPPED {
            wrap_history_method(&history, signal, self.dom.runtime().clone())?;
        }

        let runtime = self.dom.runtime().clone();
        let on_pop = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            with_runtime(&runtime, |rt| rt.navigation(HistorySignal::PopState));
        });
        window.add_event_listener_with_callback("popstate", on_pop.as_ref().unchecked_ref())?;
        on_pop.forget();
        Ok(())
    }

    fn start_tick(&mut self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let interval = self.guardian.config().tick_interval(self.guardian.frame());
        let runtime = self.dom.runtime().clone();
        let on_tick = Closure::<dyn FnMut()>::new(move || with_runtime(&runtime, Runtime::tick));
        let millis = i32::try_from(interval.as_millis()).unwrap_or(i32::MAX);
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            on_tick.as_ref().unchecked_ref(),
            millis,
        )?;
        on_tick.forget();
        Ok(())
    }

    /// Arm a one-shot timer for the guardian's earliest pending deadline,
    /// unless an earlier wakeup is already scheduled.
    fn schedule_wakeup(&mut self) {
        let Some(deadline) = self.guardian.pending_deadline() else {
            return;
        };
        if self.wakeup_at.is_some_and(|at| at <= deadline) {
            return;
        }
        let delay = deadline.saturating_sub(self.now()) + Duration::from_millis(1);
        let runtime = self.dom.runtime().clone();
        let callback = Closure::once_into_js(move || with_runtime(&runtime, Runtime::wake));
        match set_timeout(&callback, delay) {
            Ok(_) => self.wakeup_at = Some(deadline),
            Err(err) => report("could not schedule wakeup", &err),
        }
    }

    fn after_pass(&mut self) {
        self.dom.sweep_listeners();
        self.observe_current_body();
        self.schedule_wakeup();
    }

    // --- signals -------------------------------------------------------

    pub(crate) fn click(&mut self, action: ClickAction<Element>) {
        self.guardian.handle_click(&mut self.dom, action);
        self.after_pass();
    }

    fn body_mutation(&mut self, removed: &[Element]) {
        let now = self.now();
        if self.guardian.on_body_mutation(&self.dom, removed, now) {
            self.schedule_wakeup();
        }
    }

    fn root_mutation(&mut self) {
        let now = self.now();
        if self.guardian.on_root_mutation(&self.dom, now) {
            self.schedule_wakeup();
        }
    }

    fn navigation(&mut self, signal: HistorySignal) {
        let now = self.now();
        self.guardian.on_navigation(signal, now);
        self.schedule_wakeup();
    }

    fn tick(&mut self) {
        let now = self.now();
        self.guardian.on_tick(&mut self.dom, now);
        self.after_pass();
    }

    fn wake(&mut self) {
        self.wakeup_at = None;
        let now = self.now();
        self.guardian.step(&mut self.dom, now);
        self.after_pass();
    }
}

fn removed_elements(records: &Array) -> Vec<Element> {
    records
        .iter()
        .filter_map(|record| record.dyn_into::<MutationRecord>().ok())
        .flat_map(|record| elements(&record.removed_nodes()))
        .collect()
}

/// Replace `history[method]` with a wrapper that calls the original and then
/// reports the navigation.
fn wrap_history_method(
    history: &History,
    signal: HistorySignal,
    runtime: Weak<RefCell<Runtime>>,
) -> Result<(), JsValue> {
    let Some(name) = signal.method_name() else {
        return Ok(());
    };
    let key = JsValue::from_str(name);
    let original: Function = Reflect::get(history, &key)?.dyn_into()?;
    let target = history.clone();
    let wrapper = Closure::<dyn FnMut(JsValue, JsValue, JsValue) -> Result<JsValue, JsValue>>::new(
        move |state: JsValue, title: JsValue, url: JsValue| {
            let result = original.call3(&target, &state, &title, &url);
            if result.is_ok() {
                with_runtime(&runtime, |rt| rt.navigation(signal));
            }
            result
        },
    );
    Reflect::set(history, &key, wrapper.as_ref())?;
    wrapper.forget();
    Ok(())
}

/// Strip frame-blocking response headers from a `webRequest` header list.
///
/// Returns the edited list, or the input untouched when nothing was removed.
#[wasm_bindgen(js_name = stripFrameBlockers)]
pub fn strip_frame_blockers_js(headers: JsValue) -> Result<JsValue, JsValue> {
    let json = String::from(JSON::stringify(&headers)?);
    let mut parsed: Vec<ResponseHeader> =
        serde_json::from_str(&json).map_err(|err| js_error(err.to_string()))?;
    if !strip_frame_blockers(&mut parsed) {
        return Ok(headers);
    }
    let edited = serde_json::to_string(&parsed).map_err(|err| js_error(err.to_string()))?;
    JSON::parse(&edited)
}
