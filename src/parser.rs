//! Timedtext XML parsing
//!
//! YouTube serves captions as `<transcript><text start=".." dur="..">..</text></transcript>`
//! where the text content is itself HTML-escaped.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Deserialize;

use crate::transcript::TranscriptItem;

const FORMATTING_TAGS: &[&str] = &[
    "strong", "em", "b", "i", "mark", "small", "del", "ins", "sub", "sup",
];

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?\s*([a-z][a-z0-9]*)\b[^>]*>").expect("valid tag regex")
});

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(rename = "text", default)]
    entries: Vec<TimedTextEntry>,
}

#[derive(Debug, Deserialize)]
struct TimedTextEntry {
    #[serde(rename = "@start")]
    start: f64,
    #[serde(rename = "@dur", default)]
    duration: f64,
    #[serde(rename = "$text", default)]
    text: String,
}

pub struct TranscriptParser {
    preserve_formatting: bool,
}

impl TranscriptParser {
    pub fn new(preserve_formatting: bool) -> Self {
        Self {
            preserve_formatting,
        }
    }

    pub fn parse(&self, xml: &str) -> Result<Vec<TranscriptItem>, quick_xml::de::DeError> {
        let timed_text: TimedText = quick_xml::de::from_str(xml)?;

        Ok(timed_text
            .entries
            .into_iter()
            .map(|entry| TranscriptItem {
                text: self.clean_text(&entry.text),
                start: entry.start,
                duration: entry.duration,
            })
            .collect())
    }

    fn clean_text(&self, raw: &str) -> String {
        let decoded = html_escape::decode_html_entities(raw);
        let stripped = HTML_TAG.replace_all(&decoded, |caps: &Captures| {
            let tag = caps[1].to_ascii_lowercase();
            if self.preserve_formatting && FORMATTING_TAGS.contains(&tag.as_str()) {
                caps[0].to_string()
            } else {
                String::new()
            }
        });
        stripped.into_owned()
    }
}
