//! Materialized voices: flat event lists with a tuplet table
//!
//! A voice is stored as an arena. Events live in one `Vec`, tuplet groups in
//! another, and `tuplet_of[i]` points each event at its enclosing group. The
//! cursor never has to walk a notation tree to find a tuplet.

use serde::{Deserialize, Serialize};

use crate::duration::{Duration, TupletRatio};
use crate::error::{AgniError, Result};
use crate::pitch::Pitch;

/// What sounds during an event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    Note(Pitch),
    Rest,
    MultiMeasureRest,
}

/// One leaf of a voice as written
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RhythmicEvent {
    pub kind: EventKind,
    /// Notated value, before any tuplet scaling
    pub written_duration: Duration,
    /// Tied into the following event
    pub tied: bool,
}

impl RhythmicEvent {
    pub fn note(pitch: Pitch, written_duration: Duration) -> Self {
        Self { kind: EventKind::Note(pitch), written_duration, tied: false }
    }

    pub fn rest(written_duration: Duration) -> Self {
        Self { kind: EventKind::Rest, written_duration, tied: false }
    }

    pub fn multi_measure_rest(written_duration: Duration) -> Self {
        Self { kind: EventKind::MultiMeasureRest, written_duration, tied: false }
    }

    pub fn with_tie(mut self, tied: bool) -> Self {
        self.tied = tied;
        self
    }

    pub fn pitch(&self) -> Option<Pitch> {
        match self.kind {
            EventKind::Note(pitch) => Some(pitch),
            EventKind::Rest | EventKind::MultiMeasureRest => None,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self.kind, EventKind::Note(_))
    }

    pub fn is_multi_measure_rest(&self) -> bool {
        self.kind == EventKind::MultiMeasureRest
    }
}

/// A tuplet group: a ratio and the first event it encloses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuplet {
    pub ratio: TupletRatio,
    pub first_event: usize,
    /// Enclosing group for nested tuplets
    pub parent: Option<usize>,
}

/// A voice ready for synchronization
#[derive(Debug, Clone, Default)]
pub struct Voice {
    events: Vec<RhythmicEvent>,
    tuplets: Vec<Tuplet>,
    tuplet_of: Vec<Option<usize>>,
}

impl Voice {
    pub fn builder(name: impl Into<String>) -> VoiceBuilder {
        VoiceBuilder::new(name)
    }

    /// A voice without tuplets
    pub fn from_events(name: &str, events: Vec<RhythmicEvent>) -> Result<Self> {
        let mut builder = VoiceBuilder::new(name);
        for event in events {
            builder = builder.event(event);
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[RhythmicEvent] {
        &self.events
    }

    pub fn event(&self, index: usize) -> Option<&RhythmicEvent> {
        self.events.get(index)
    }

    pub fn tuplet(&self, index: usize) -> Option<&Tuplet> {
        let tuplet = (*self.tuplet_of.get(index)?)?;
        self.tuplets.get(tuplet)
    }

    /// Sounding duration of an event: written value scaled by every
    /// enclosing tuplet
    pub fn duration(&self, index: usize) -> Option<Duration> {
        let mut duration = self.events.get(index)?.written_duration;
        let mut group = *self.tuplet_of.get(index)?;
        while let Some(tuplet) = group.and_then(|g| self.tuplets.get(g)) {
            duration = duration * tuplet.ratio;
            group = tuplet.parent;
        }
        Some(duration)
    }

    pub fn total_duration(&self) -> Duration {
        (0..self.len()).filter_map(|i| self.duration(i)).sum()
    }
}

/// Incremental construction of a [`Voice`]
#[derive(Debug, Clone)]
pub struct VoiceBuilder {
    name: String,
    voice: Voice,
    open_tuplet: Option<usize>,
}

impl VoiceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), voice: Voice::default(), open_tuplet: None }
    }

    pub fn event(mut self, event: RhythmicEvent) -> Self {
        self.voice.events.push(event);
        self.voice.tuplet_of.push(self.open_tuplet);
        self
    }

    pub fn note(self, pitch: Pitch, duration: Duration) -> Self {
        self.event(RhythmicEvent::note(pitch, duration))
    }

    /// A note tied into the next event
    pub fn tied_note(self, pitch: Pitch, duration: Duration) -> Self {
        self.event(RhythmicEvent::note(pitch, duration).with_tie(true))
    }

    pub fn rest(self, duration: Duration) -> Self {
        self.event(RhythmicEvent::rest(duration))
    }

    pub fn multi_measure_rest(self, duration: Duration) -> Self {
        self.event(RhythmicEvent::multi_measure_rest(duration))
    }

    /// Add the events produced by `fill` inside one tuplet group
    pub fn tuplet(mut self, ratio: TupletRatio, fill: impl FnOnce(Self) -> Self) -> Self {
        let outer = self.open_tuplet;
        self.voice.tuplets.push(Tuplet {
            ratio,
            first_event: self.voice.events.len(),
            parent: outer,
        });
        self.open_tuplet = Some(self.voice.tuplets.len() - 1);
        let mut builder = fill(self);
        builder.open_tuplet = outer;
        builder
    }

    /// Validate and finish. Every event must have a positive duration.
    pub fn build(self) -> Result<Voice> {
        if let Some(index) = (0..self.voice.len()).find(|&i| {
            self.voice.duration(i).is_none_or(|d| d.is_zero())
        }) {
            return Err(AgniError::ZeroDuration { voice: self.name, index });
        }
        Ok(self.voice)
    }
}
