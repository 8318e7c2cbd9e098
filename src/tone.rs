//! Tone categories and the per-session tone color table.
//!
//! Tone numbers follow pinyin convention: 1–4 are the contour tones and 5
//! denotes the neutral tone. Each category maps to a CSS class (`tone1` ..
//! `tone5`) whose computed color is read back once when a session starts.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::QuizError;

/// Stroke color used when no tone assignment exists or a lookup fails.
pub const NEUTRAL_COLOR: &str = "#555555";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tone {
    First,
    Second,
    Third,
    Fourth,
    Neutral,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::First,
        Tone::Second,
        Tone::Third,
        Tone::Fourth,
        Tone::Neutral,
    ];

    /// Pinyin tone number (1..=5).
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    pub fn from_number(n: u8) -> Option<Tone> {
        match n {
            1..=5 => Some(Tone::ALL[n as usize - 1]),
            _ => None,
        }
    }

    /// CSS class carrying this tone's color, e.g. `tone3`.
    pub fn class_name(self) -> &'static str {
        match self {
            Tone::First => "tone1",
            Tone::Second => "tone2",
            Tone::Third => "tone3",
            Tone::Fourth => "tone4",
            Tone::Neutral => "tone5",
        }
    }

    fn index(self) -> usize {
        match self {
            Tone::First => 0,
            Tone::Second => 1,
            Tone::Third => 2,
            Tone::Fourth => 3,
            Tone::Neutral => 4,
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

impl Serialize for Tone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.class_name())
    }
}

impl FromStr for Tone {
    type Err = QuizError;

    /// Accepts the class form (`tone2`) or a bare tone number (`2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("tone").unwrap_or(trimmed);
        digits
            .parse::<u8>()
            .ok()
            .and_then(Tone::from_number)
            .ok_or_else(|| QuizError::UnknownTone(s.to_string()))
    }
}

/// Resolved display color for each of the five tone categories.
///
/// Built once per session and never recomputed.
#[derive(Clone, Debug, PartialEq)]
pub struct ToneColorTable {
    colors: [String; 5],
}

impl ToneColorTable {
    /// Query `probe` once per category. A failed or empty lookup degrades to
    /// [`NEUTRAL_COLOR`] for that category.
    pub fn resolve(mut probe: impl FnMut(Tone) -> Option<String>) -> Self {
        let colors = Tone::ALL.map(|tone| match probe(tone) {
            Some(color) if !color.trim().is_empty() => color,
            _ => {
                log::warn!("could not resolve color for {tone}, using neutral default");
                NEUTRAL_COLOR.to_string()
            }
        });
        Self { colors }
    }

    pub fn color(&self, tone: Tone) -> &str {
        &self.colors[tone.index()]
    }

    /// Color for an optional tone assignment; `None` yields the neutral default.
    pub fn color_for(&self, tone: Option<Tone>) -> &str {
        tone.map_or(NEUTRAL_COLOR, |t| self.color(t))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tone, &str)> {
        Tone::ALL.into_iter().zip(self.colors.iter().map(String::as_str))
    }
}

impl Default for ToneColorTable {
    fn default() -> Self {
        Self::resolve(|_| None)
    }
}
