//! Extraction of quiz characters from a flashcard field.
//!
//! Fields may be plain text or tone-colored markup such as
//! `<span class="tone3">你</span><span class="tone3">好</span>`. Only CJK
//! unified ideographs are kept; tones are taken from the markup only when
//! there is exactly one per character.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::QuizError;
use crate::tone::Tone;

/// Range of characters a writer has stroke data for.
const HANZI: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FD0}';

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldCharacters {
    pub characters: Vec<String>,
    /// Empty when the field carried no usable tone markup.
    pub tones: Vec<Tone>,
}

impl FieldCharacters {
    /// Tone classes (`tone1`..`tone5`) aligned with `characters`.
    pub fn tone_classes(&self) -> Vec<&'static str> {
        self.tones.iter().map(|t| t.class_name()).collect()
    }
}

pub fn split_field(html: &str) -> Result<FieldCharacters, QuizError> {
    let text = strip_markup(html);
    let mut tones = if html.contains("span") {
        tone_classes(html)
    } else {
        Vec::new()
    };
    let chars: Vec<char> = text.chars().collect();
    if tones.len() != chars.len() {
        tones.clear();
    }

    let mut out = FieldCharacters::default();
    for (idx, c) in chars.into_iter().enumerate() {
        if !HANZI.contains(&c) {
            continue;
        }
        out.characters.push(c.to_string());
        if let Some(&tone) = tones.get(idx) {
            out.tones.push(tone);
        }
    }
    if out.characters.is_empty() {
        return Err(QuizError::EmptyField);
    }
    Ok(out)
}

/// Every `toneN` class mention in document order.
fn tone_classes(html: &str) -> Vec<Tone> {
    static TONE_RE: OnceLock<Regex> = OnceLock::new();
    let re = TONE_RE.get_or_init(|| Regex::new(r"tone([1-5])").expect("valid tone regex"));
    re.captures_iter(html)
        .filter_map(|caps| caps[1].parse::<u8>().ok())
        .filter_map(Tone::from_number)
        .collect()
}

/// Drops comments, style and script bodies and tags, then decodes every
/// HTML entity (named and numeric).
fn strip_markup(html: &str) -> String {
    static MARKUP_RE: OnceLock<Regex> = OnceLock::new();
    let re = MARKUP_RE.get_or_init(|| {
        Regex::new(r"(?is)<!--.*?-->|<style\b.*?</style\s*>|<script\b.*?</script\s*>|<[^>]*>")
            .expect("valid markup regex")
    });
    let text = re.replace_all(html, "");
    html_escape::decode_html_entities(&text).into_owned()
}
