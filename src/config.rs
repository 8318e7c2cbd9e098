//! Session configuration as supplied by the embedding page (JSON, camelCase).

use serde::Deserialize;

use crate::error::QuizError;
use crate::host::{HintPolicy, StrokeData};
use crate::lesson::Lesson;
use crate::tone::Tone;

pub const DEFAULT_SIZE: u32 = 200;
pub const DEFAULT_LENIENCY: f64 = 1.0;
pub const DEFAULT_HINT_AFTER_MISSES: u32 = 3;
pub const DEFAULT_STROKE_DELAY_MS: u32 = 200;
pub const DEFAULT_REVEAL_LABEL: &str = "Reveal";

/// Delays used to sequence visual effects. All in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timing {
    /// Between inserting an entering slot and laying out all slots, so the
    /// initial style is committed before the transition starts.
    pub pre_layout_ms: u32,
    /// Between a completed attempt and the advance (writer's own completion
    /// animation).
    pub advance_delay_ms: u32,
    /// Between the end of a demonstration and resuming the quiz.
    pub reveal_linger_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            pre_layout_ms: 50,
            advance_delay_ms: 200,
            reveal_linger_ms: 1000,
        }
    }
}

/// Everything about a session except its lesson.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOptions {
    pub size: u32,
    pub leniency: f64,
    pub hint: HintPolicy,
    pub stroke_delay_ms: u32,
    pub timing: Timing,
    /// Whether a reveal affordance is offered.
    pub reveal: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            leniency: DEFAULT_LENIENCY,
            hint: HintPolicy::from_misses(DEFAULT_HINT_AFTER_MISSES),
            stroke_delay_ms: DEFAULT_STROKE_DELAY_MS,
            timing: Timing::default(),
            reveal: false,
        }
    }
}

/// `hintAfterMisses` accepts a miss count (`0` disables hints) or `"never"`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HintSetting {
    Misses(u32),
    Keyword(String),
}

impl TryFrom<HintSetting> for HintPolicy {
    type Error = QuizError;

    fn try_from(value: HintSetting) -> Result<Self, Self::Error> {
        match value {
            HintSetting::Misses(n) => Ok(HintPolicy::from_misses(n)),
            HintSetting::Keyword(k) if k.eq_ignore_ascii_case("never") => Ok(HintPolicy::Never),
            HintSetting::Keyword(k) => Err(QuizError::InvalidHint(k)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    pub character_sequence: Vec<String>,
    pub stroke_data_by_position: Vec<StrokeData>,
    #[serde(default)]
    pub tone_by_position: Option<Vec<String>>,
    pub target_container_id: String,
    #[serde(default)]
    pub reveal_button_id: Option<String>,
    #[serde(default)]
    pub reveal_label: Option<String>,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_leniency")]
    pub leniency: f64,
    /// Deck-style leniency on a 0..=200 percent scale; overrides `leniency`.
    #[serde(default)]
    pub leniency_percent: Option<u32>,
    #[serde(default = "default_hint")]
    pub hint_after_misses: Option<HintSetting>,
    #[serde(default = "default_stroke_delay")]
    pub stroke_delay_ms: u32,
    #[serde(default)]
    pub timing: Timing,
}

fn default_size() -> u32 {
    DEFAULT_SIZE
}

fn default_leniency() -> f64 {
    DEFAULT_LENIENCY
}

fn default_hint() -> Option<HintSetting> {
    Some(HintSetting::Misses(DEFAULT_HINT_AFTER_MISSES))
}

fn default_stroke_delay() -> u32 {
    DEFAULT_STROKE_DELAY_MS
}

/// Percent scale used by deck settings (100 = default tolerance).
pub fn leniency_from_percent(percent: u32) -> f64 {
    f64::from(percent) / 100.0
}

impl QuizConfig {
    pub fn from_json(json: &str) -> Result<Self, QuizError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the lesson. Unknown tone classes drop the whole tone assignment.
    pub fn lesson(&self) -> Result<Lesson, QuizError> {
        let tones = self.tone_by_position.as_ref().and_then(|raw| {
            raw.iter()
                .map(|t| t.parse::<Tone>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| log::warn!("ignoring tone assignment: {e}"))
                .ok()
        });
        Lesson::new(
            self.character_sequence.clone(),
            self.stroke_data_by_position.clone(),
            tones,
        )
    }

    pub fn session_options(&self) -> Result<SessionOptions, QuizError> {
        let hint = match self.hint_after_misses.clone() {
            Some(setting) => HintPolicy::try_from(setting)?,
            None => HintPolicy::Never,
        };
        let leniency = self
            .leniency_percent
            .map_or(self.leniency, leniency_from_percent);
        Ok(SessionOptions {
            size: self.size,
            leniency,
            hint,
            stroke_delay_ms: self.stroke_delay_ms,
            timing: self.timing,
            reveal: self.reveal_button_id.is_some(),
        })
    }

    pub fn reveal_label(&self) -> &str {
        self.reveal_label.as_deref().unwrap_or(DEFAULT_REVEAL_LABEL)
    }
}
