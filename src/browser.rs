//! Browser host: DOM slots, computed tone colors, `setTimeout` timers and the
//! HanziWriter library as the recognition component.
//!
//! Sessions live in a thread-local registry keyed by id. Every JS callback
//! (timers, writer completions, reveal clicks) only carries a session id and a
//! [`QuizEvent`] and goes through [`dispatch`], so nothing on the JS side holds
//! a reference into Rust state.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use js_sys::{Function, Object, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, Window, window};

use crate::config::QuizConfig;
use crate::error::QuizError;
use crate::field;
use crate::host::{Generation, HintPolicy, Host, StrokeData, Timer, Writer, WriterOptions};
use crate::layout::Placement;
use crate::session::{QuizEvent, QuizSession};
use crate::tone::Tone;

/// DOM event fired on the target container once the last character is done.
pub const FINISHED_EVENT: &str = "quizfinished";

#[wasm_bindgen]
extern "C" {
    /// Global `HanziWriter` from hanzi-writer.js.
    type HanziWriter;

    #[wasm_bindgen(static_method_of = HanziWriter, js_name = create, catch)]
    fn create(element: &HtmlElement, character: &str, options: &JsValue) -> Result<HanziWriter, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn quiz(this: &HanziWriter, options: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = cancelQuiz, catch)]
    fn cancel_quiz(this: &HanziWriter) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = showOutline, catch)]
    fn show_outline(this: &HanziWriter) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = hideCharacter, catch)]
    fn hide_character(this: &HanziWriter) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = animateCharacter, catch)]
    fn animate_character(this: &HanziWriter, options: &JsValue) -> Result<(), JsValue>;
}

thread_local! {
    static SESSIONS: RefCell<HashMap<u32, QuizSession<BrowserHost>>> = RefCell::new(HashMap::new());
    static NEXT_SESSION_ID: Cell<u32> = const { Cell::new(1) };
}

fn js_err(context: &str, err: JsValue) -> QuizError {
    QuizError::Environment(format!("{context}: {err:?}"))
}

fn set(obj: &Object, key: &str, value: &JsValue) -> Result<(), QuizError> {
    Reflect::set(obj, &JsValue::from_str(key), value)
        .map(|_| ())
        .map_err(|e| js_err(key, e))
}

/// Deliver `event` to session `id`. If the registry is borrowed (a callback
/// fired synchronously from inside a session call) the event is re-queued on
/// the next tick.
fn dispatch(id: u32, event: QuizEvent) {
    let handled = SESSIONS.with(|cell| {
        let Ok(mut sessions) = cell.try_borrow_mut() else {
            return false;
        };
        match sessions.get_mut(&id) {
            Some(session) => {
                if let Err(e) = session.handle(event) {
                    log::error!("session {id}: {e}");
                }
            }
            None => log::debug!("event {event:?} for unknown session {id}"),
        }
        true
    });
    if !handled {
        log::debug!("session registry busy, deferring {event:?}");
        set_timeout(0, move || dispatch(id, event));
    }
}

fn set_timeout(delay_ms: u32, f: impl FnOnce() + 'static) {
    let Some(win) = window() else {
        log::error!("no window to schedule timer on");
        return;
    };
    let callback = Closure::once_into_js(f);
    let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
    if let Err(e) =
        win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
    {
        log::error!("setTimeout failed: {e:?}");
    }
}

// --- Host implementation ------------------------------------------------------

pub struct BrowserHost {
    session_id: u32,
    window: Window,
    document: Document,
    container: Element,
    reveal_button: Option<HtmlButtonElement>,
}

pub struct BrowserWriter {
    session_id: u32,
    writer: HanziWriter,
    // HanziWriter calls back into this while loading; dropped with the writer.
    _loader: Closure<dyn FnMut(JsValue, Function)>,
    // Completion callback of the latest quiz or demo. A cancelled quiz never
    // calls its callback, so each call replaces the previous one.
    on_complete: Option<Closure<dyn FnMut(JsValue)>>,
}

impl BrowserWriter {
    fn completion_options(&mut self, event: QuizEvent) -> Result<JsValue, QuizError> {
        let id = self.session_id;
        let options = Object::new();
        let on_complete = Closure::wrap(Box::new(move |_summary: JsValue| dispatch(id, event))
            as Box<dyn FnMut(JsValue)>);
        set(&options, "onComplete", on_complete.as_ref())?;
        self.on_complete = Some(on_complete);
        Ok(options.into())
    }

    fn call(&self, what: &str, result: Result<(), JsValue>) {
        if let Err(e) = result {
            log::error!("HanziWriter.{what} failed: {e:?}");
        }
    }
}

impl Writer for BrowserWriter {
    fn start_quiz(&mut self, generation: Generation) {
        match self.completion_options(QuizEvent::AttemptComplete { generation }) {
            Ok(options) => self.call("quiz", self.writer.quiz(&options)),
            Err(e) => log::error!("{e}"),
        }
    }

    fn cancel_quiz(&mut self) {
        self.call("cancelQuiz", self.writer.cancel_quiz());
    }

    fn show_outline(&mut self) {
        self.call("showOutline", self.writer.show_outline());
    }

    fn hide_character(&mut self) {
        self.call("hideCharacter", self.writer.hide_character());
    }

    fn animate_demo(&mut self, generation: Generation) {
        match self.completion_options(QuizEvent::DemoComplete { generation }) {
            Ok(options) => self.call("animateCharacter", self.writer.animate_character(&options)),
            Err(e) => log::error!("{e}"),
        }
    }
}

impl Host for BrowserHost {
    type Slot = HtmlElement;
    type Writer = BrowserWriter;

    fn create_slot(&mut self, position: usize) -> Result<HtmlElement, QuizError> {
        let slot: HtmlElement = self
            .document
            .create_element("div")
            .map_err(|e| js_err("create slot", e))?
            .dyn_into()
            .map_err(|_| QuizError::Environment("slot is not an HTML element".into()))?;
        slot.set_attribute("data-position", &position.to_string()).ok();
        self.container
            .append_child(&slot)
            .map_err(|e| js_err("append slot", e))?;
        Ok(slot)
    }

    fn place_slot(&mut self, slot: &HtmlElement, placement: Placement) {
        let style = slot.style();
        let result = match placement {
            Placement::Visible { offset_px, opacity } => style
                .set_property("margin-left", &format!("{offset_px}px"))
                .and_then(|_| style.set_property("opacity", &opacity.to_string())),
            Placement::Hidden => style.set_property("display", "none"),
        };
        if let Err(e) = result {
            log::warn!("could not place slot: {e:?}");
        }
    }

    fn release_slot(&mut self, slot: HtmlElement) {
        slot.remove();
    }

    fn probe_tone_color(&mut self, tone: Tone) -> Option<String> {
        let body = self.document.body()?;
        let probe = self.document.create_element("span").ok()?;
        probe.set_class_name(tone.class_name());
        body.append_child(&probe).ok()?;
        let color = self
            .window
            .get_computed_style(&probe)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("color").ok());
        body.remove_child(&probe).ok();
        color
    }

    fn create_writer(
        &mut self,
        slot: &HtmlElement,
        character: &str,
        strokes: &StrokeData,
        options: &WriterOptions,
    ) -> Result<BrowserWriter, QuizError> {
        let data = js_sys::JSON::parse(&strokes.0.to_string())
            .map_err(|e| js_err("parse stroke data", e))?;
        let loader = Closure::wrap(Box::new(move |_character: JsValue, on_loaded: Function| {
            if let Err(e) = on_loaded.call1(&JsValue::NULL, &data) {
                log::error!("stroke data loader failed: {e:?}");
            }
        }) as Box<dyn FnMut(JsValue, Function)>);

        let hint_after = match options.hint {
            HintPolicy::AfterMisses(n) => f64::from(n.get()),
            // `false` does not disable hints in HanziWriter
            HintPolicy::Never => js_sys::Number::MAX_SAFE_INTEGER,
        };
        let size = JsValue::from_f64(f64::from(options.size));
        let config = Object::new();
        set(&config, "width", &size)?;
        set(&config, "height", &size)?;
        set(&config, "padding", &JsValue::from_f64(0.0))?;
        set(&config, "showCharacter", &JsValue::FALSE)?;
        set(&config, "showOutline", &JsValue::FALSE)?;
        set(&config, "highlightOnComplete", &JsValue::TRUE)?;
        set(&config, "leniency", &JsValue::from_f64(options.leniency))?;
        set(
            &config,
            "delayBetweenStrokes",
            &JsValue::from_f64(f64::from(options.stroke_delay_ms)),
        )?;
        set(&config, "strokeColor", &JsValue::from_str(&options.stroke_color))?;
        set(&config, "showHintAfterMisses", &JsValue::from_f64(hint_after))?;
        set(&config, "charDataLoader", loader.as_ref())?;

        let writer = HanziWriter::create(slot, character, &config)
            .map_err(|e| js_err("HanziWriter.create", e))?;
        Ok(BrowserWriter {
            session_id: self.session_id,
            writer,
            _loader: loader,
            on_complete: None,
        })
    }

    fn schedule(&mut self, delay_ms: u32, timer: Timer) {
        let id = self.session_id;
        set_timeout(delay_ms, move || dispatch(id, QuizEvent::Timer(timer)));
    }

    fn session_finished(&mut self) {
        if let Some(button) = &self.reveal_button {
            button.set_disabled(true);
        }
        match web_sys::Event::new(FINISHED_EVENT) {
            Ok(event) => {
                self.container.dispatch_event(&event).ok();
            }
            Err(e) => log::warn!("could not create {FINISHED_EVENT} event: {e:?}"),
        }
    }
}

// --- Entry points -------------------------------------------------------------

/// Adds a button to the reveal holder element that triggers a reveal cycle.
/// The holder's `label` attribute wins over the configured label.
fn mount_reveal_button(
    document: &Document,
    holder_id: &str,
    label: &str,
    session_id: u32,
) -> Result<Option<HtmlButtonElement>, QuizError> {
    let Some(holder) = document.get_element_by_id(holder_id) else {
        log::warn!("reveal button holder not found: #{holder_id}");
        return Ok(None);
    };
    let label = holder.get_attribute("label").unwrap_or_else(|| label.to_string());
    let button: HtmlButtonElement = document
        .create_element("button")
        .map_err(|e| js_err("create reveal button", e))?
        .dyn_into()
        .map_err(|_| QuizError::Environment("reveal button is not a button".into()))?;
    button.set_text_content(Some(&label));
    holder
        .append_child(&button)
        .map_err(|e| js_err("append reveal button", e))?;

    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        dispatch(session_id, QuizEvent::RevealRequested);
    }) as Box<dyn FnMut(_)>);
    button
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .map_err(|e| js_err("reveal click listener", e))?;
    closure.forget();
    Ok(Some(button))
}

fn try_start(config_json: &str) -> Result<u32, QuizError> {
    let config = QuizConfig::from_json(config_json)?;
    let win = window().ok_or_else(|| QuizError::Environment("no window".into()))?;
    let document = win
        .document()
        .ok_or_else(|| QuizError::Environment("no document".into()))?;
    let container = document
        .get_element_by_id(&config.target_container_id)
        .ok_or_else(|| QuizError::MissingContainer(config.target_container_id.clone()))?;
    let lesson = config.lesson()?;
    let mut options = config.session_options()?;

    let id = NEXT_SESSION_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        id
    });
    let reveal_button = match &config.reveal_button_id {
        Some(holder) => mount_reveal_button(&document, holder, config.reveal_label(), id)?,
        None => None,
    };
    options.reveal = reveal_button.is_some();

    let host = BrowserHost {
        session_id: id,
        window: win,
        document,
        container,
        reveal_button: reveal_button.clone(),
    };
    let started = register(id, QuizSession::new(host, lesson, options));
    if started.is_err() {
        if let Some(button) = reveal_button {
            button.remove();
        }
    }
    started.map(|()| id)
}

/// Starts `session` and stores it under `id`. A session that fails to start
/// is never registered.
fn register(id: u32, mut session: QuizSession<BrowserHost>) -> Result<(), QuizError> {
    SESSIONS.with(|cell| {
        let mut sessions = cell
            .try_borrow_mut()
            .map_err(|_| QuizError::Environment("session registry busy".into()))?;
        session.start()?;
        sessions.insert(id, session);
        Ok(())
    })
}

/// Starts a quiz session from a JSON configuration and returns its id.
///
/// Never throws: a missing target container or invalid configuration is
/// logged and yields `undefined`.
#[wasm_bindgen]
pub fn start_quiz(config_json: &str) -> Option<u32> {
    match try_start(config_json) {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("quiz not started: {e}");
            None
        }
    }
}

/// Runs a reveal cycle on session `id`, as if its reveal button was clicked.
#[wasm_bindgen]
pub fn reveal_character(id: u32) {
    dispatch(id, QuizEvent::RevealRequested);
}

/// Drops session `id`. Late callbacks for it become no-ops.
#[wasm_bindgen]
pub fn discard_quiz(id: u32) -> bool {
    SESSIONS.with(|cell| {
        cell.try_borrow_mut()
            .map(|mut sessions| sessions.remove(&id).is_some())
            .unwrap_or(false)
    })
}

/// Splits a note field into characters and aligned tone classes, as JSON
/// `{"characters": [...], "tones": ["tone3", ...]}`.
#[wasm_bindgen(js_name = splitField)]
pub fn split_field_json(html: &str) -> Result<String, JsValue> {
    field::split_field(html)
        .and_then(|f| serde_json::to_string(&f).map_err(QuizError::from))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
