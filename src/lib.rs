//! Hanzi Quiz core crate.
//!
//! Walks a learner through a sequence of characters, one handwriting quiz at
//! a time. Stroke capture and grading are delegated to HanziWriter; this crate
//! owns the sequencing, the archive of completed characters, optional reveal
//! cycles and tone-dependent stroke colors. The session logic is host-agnostic
//! (see [`host::Host`]) and runs natively under `cargo test`; the browser
//! bindings live in `browser`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod field;
pub mod host;
pub mod layout;
pub mod lesson;
pub mod reveal;
pub mod session;
pub mod tone;

mod browser;

pub use browser::{FINISHED_EVENT, discard_quiz, reveal_character, split_field_json, start_quiz};
pub use config::{QuizConfig, SessionOptions, Timing};
pub use error::QuizError;
pub use host::{Generation, HintPolicy, Host, StrokeData, Timer, Writer, WriterOptions};
pub use lesson::Lesson;
pub use session::{Phase, Progress, QuizEvent, QuizSession};
pub use tone::{NEUTRAL_COLOR, Tone, ToneColorTable};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
