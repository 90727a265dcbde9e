//! Passage files
//!
//! A passage file lists a bass and a melody voice as TOML (or JSON when the
//! file ends in `.json`):
//!
//! ```toml
//! title = "Lonely Child"
//! composer = "Claude Vivier"
//!
//! [[bass]]
//! pitch = "a,"
//! duration = "1/2"
//!
//! [[melody]]
//! tuplet = "2/3"
//! events = [
//!     { pitch = "a'", duration = "1/8", tie = true },
//!     { pitch = "a'", duration = "1/8" },
//!     { rest = true, duration = "1/8" },
//! ]
//! ```
//!
//! Pitches are LilyPond names or numbers; numbers are read as hertz or MIDI
//! depending on the [`PitchInput`] passed to the loader.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::duration::{Duration, TupletRatio};
use crate::error::Result;
use crate::passage::Passage;
use crate::pitch::{Pitch, PitchInput};
use crate::voice::{RhythmicEvent, Voice, VoiceBuilder};

#[derive(Debug, Deserialize)]
struct PassageFile {
    title: Option<String>,
    composer: Option<String>,
    #[serde(default)]
    bass: Vec<VoiceItem>,
    #[serde(default)]
    melody: Vec<VoiceItem>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VoiceItem {
    Tuplet { tuplet: TupletRatio, events: Vec<VoiceItem> },
    Event(EventItem),
}

#[derive(Debug, Deserialize)]
struct EventItem {
    pitch: Option<PitchValue>,
    duration: Duration,
    #[serde(default)]
    tie: bool,
    #[serde(default)]
    rest: bool,
    #[serde(default)]
    multi_measure_rest: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PitchValue {
    Number(f64),
    Text(String),
}

impl PitchValue {
    fn resolve(&self, input: PitchInput) -> Result<Pitch> {
        match self {
            Self::Number(number) => Pitch::parse(&number.to_string(), input),
            Self::Text(text) => Pitch::parse(text, input),
        }
    }
}

/// Voice items with pitches resolved
enum Resolved {
    Event(RhythmicEvent),
    Tuplet(TupletRatio, Vec<Resolved>),
}

fn resolve(items: &[VoiceItem], input: PitchInput) -> Result<Vec<Resolved>> {
    items
        .iter()
        .map(|item| match item {
            VoiceItem::Tuplet { tuplet, events } => Ok(Resolved::Tuplet(*tuplet, resolve(events, input)?)),
            VoiceItem::Event(event) => resolve_event(event, input).map(Resolved::Event),
        })
        .collect()
}

fn resolve_event(event: &EventItem, input: PitchInput) -> Result<RhythmicEvent> {
    let resolved = if event.multi_measure_rest {
        RhythmicEvent::multi_measure_rest(event.duration)
    } else {
        match (&event.pitch, event.rest) {
            (Some(pitch), false) => RhythmicEvent::note(pitch.resolve(input)?, event.duration),
            _ => RhythmicEvent::rest(event.duration),
        }
    };
    Ok(resolved.with_tie(event.tie))
}

fn fill(mut builder: VoiceBuilder, items: Vec<Resolved>) -> VoiceBuilder {
    for item in items {
        builder = match item {
            Resolved::Event(event) => builder.event(event),
            Resolved::Tuplet(ratio, inner) => builder.tuplet(ratio, |t| fill(t, inner)),
        };
    }
    builder
}

fn build_voice(name: &str, items: &[VoiceItem], input: PitchInput) -> Result<Voice> {
    let resolved = resolve(items, input)?;
    fill(Voice::builder(name), resolved).build()
}

impl PassageFile {
    fn into_passage(self, input: PitchInput) -> Result<Passage> {
        let passage = Passage {
            title: self.title,
            composer: self.composer,
            bass: build_voice("bass", &self.bass, input)?,
            melody: build_voice("melody", &self.melody, input)?,
        };
        debug!(
            title = passage.title.as_deref().unwrap_or(""),
            bass_events = passage.bass.len(),
            melody_events = passage.melody.len(),
            "Loaded passage"
        );
        Ok(passage)
    }
}

pub fn parse_toml(text: &str, input: PitchInput) -> Result<Passage> {
    toml::from_str::<PassageFile>(text)?.into_passage(input)
}

pub fn parse_json(text: &str, input: PitchInput) -> Result<Passage> {
    serde_json::from_str::<PassageFile>(text)?.into_passage(input)
}

/// Read a passage file, choosing the format from the extension
pub fn load(path: &Path, input: PitchInput) -> Result<Passage> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        parse_json(&text, input)
    } else {
        parse_toml(&text, input)
    }
}
