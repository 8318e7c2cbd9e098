//! The immutable per-session inputs: characters, their stroke data, and an
//! optional tone assignment, all indexed by sequence position.

use crate::error::QuizError;
use crate::host::StrokeData;
use crate::tone::Tone;

#[derive(Clone, Debug, PartialEq)]
pub struct Lesson {
    characters: Vec<String>,
    strokes: Vec<StrokeData>,
    tones: Option<Vec<Tone>>,
}

impl Lesson {
    /// Fails when there is nothing to quiz or stroke data does not cover every
    /// position. A tone assignment of the wrong length is dropped so the
    /// session falls back to neutral styling.
    pub fn new(
        characters: Vec<String>,
        strokes: Vec<StrokeData>,
        tones: Option<Vec<Tone>>,
    ) -> Result<Self, QuizError> {
        if characters.is_empty() {
            return Err(QuizError::EmptySequence);
        }
        if strokes.len() != characters.len() {
            return Err(QuizError::StrokeDataMismatch {
                characters: characters.len(),
                strokes: strokes.len(),
            });
        }
        let tones = match tones {
            Some(t) if t.is_empty() => None,
            Some(t) if t.len() != characters.len() => {
                log::warn!(
                    "ignoring tone assignment: {} tones for {} characters",
                    t.len(),
                    characters.len()
                );
                None
            }
            other => other,
        };
        Ok(Self {
            characters,
            strokes,
            tones,
        })
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn character(&self, position: usize) -> Option<&str> {
        self.characters.get(position).map(String::as_str)
    }

    pub fn strokes(&self, position: usize) -> Option<&StrokeData> {
        self.strokes.get(position)
    }

    /// Character and stroke data at `position`.
    pub fn entry(&self, position: usize) -> Option<(&str, &StrokeData)> {
        self.character(position).zip(self.strokes(position))
    }

    /// Tone at `position`, or `None` when the lesson carries no tone assignment.
    pub fn tone(&self, position: usize) -> Option<Tone> {
        self.tones.as_ref().and_then(|t| t.get(position).copied())
    }

    pub fn has_tones(&self) -> bool {
        self.tones.is_some()
    }

    pub fn characters(&self) -> impl Iterator<Item = &str> {
        self.characters.iter().map(String::as_str)
    }
}
