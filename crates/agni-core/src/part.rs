//! Voice cursor: a forward-only reader over one voice
//!
//! The cursor tracks the event currently in progress and how much of it is
//! still to be consumed. The synchronizer shortens the current event as the
//! other voice moves past it and advances once it is used up.

use crate::duration::{Duration, TupletRatio};
use crate::error::{AgniError, Result};
use crate::pitch::Pitch;
use crate::voice::{RhythmicEvent, Tuplet, Voice};

/// Saved cursor position, restored after speculative lookahead
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorSnapshot {
    position: usize,
    current: Option<usize>,
    remaining: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct VoiceCursor<'a> {
    voice: &'a Voice,
    /// Index of the next event to read
    position: usize,
    current: Option<usize>,
    remaining: Option<Duration>,
}

impl<'a> VoiceCursor<'a> {
    /// Create a cursor positioned on the first event
    pub fn new(voice: &'a Voice) -> Self {
        let mut cursor = Self {
            voice,
            position: 0,
            current: None,
            remaining: None,
        };
        cursor.step();
        cursor
    }

    /// Move to the next event, resetting the remaining duration to its full
    /// length.
    ///
    /// Stepping past the last event returns `Ok(None)` and leaves the cursor
    /// exhausted. Advancing an exhausted cursor is an error.
    pub fn advance(&mut self) -> Result<Option<&'a RhythmicEvent>> {
        if self.current.is_none() {
            return Err(AgniError::Exhausted);
        }
        Ok(self.step())
    }

    fn step(&mut self) -> Option<&'a RhythmicEvent> {
        let voice = self.voice;
        let index = self.position;
        match voice.event(index) {
            Some(event) => {
                self.position += 1;
                self.current = Some(index);
                self.remaining = voice.duration(index);
                Some(event)
            }
            None => {
                self.position = voice.len();
                self.current = None;
                self.remaining = None;
                None
            }
        }
    }

    /// Consume `by` from the current event.
    ///
    /// Shortening to exactly zero keeps the current event until the next
    /// [`advance`](Self::advance). Shortening past the end of the current
    /// event consumes whole following events; landing exactly on an event
    /// boundary moves on to the next event. Running out of voice before `by`
    /// is consumed is an error and leaves the cursor where it was.
    pub fn shorten(&mut self, by: Duration) -> Result<()> {
        let start = self.snapshot();
        let mut left = by;
        let mut consumed = Duration::ZERO;
        loop {
            let remaining = self.remaining.ok_or(AgniError::Exhausted)?;
            if let Some(rest) = remaining.checked_sub(left) {
                self.remaining = Some(rest);
                return Ok(());
            }
            consumed += remaining;
            left = left.checked_sub(remaining).unwrap_or(Duration::ZERO);
            if self.step().is_none() {
                self.restore(start);
                return Err(AgniError::Overshortened { by, remaining: consumed });
            }
            if self.remaining == Some(left) {
                self.step();
                return Ok(());
            }
        }
    }

    /// Look at an event without moving.
    ///
    /// With a `duration` that ends inside the current event this is the
    /// current event; otherwise it is the event after it.
    pub fn peek(&self, duration: Option<Duration>) -> Option<&'a RhythmicEvent> {
        if let (Some(duration), Some(remaining)) = (duration, self.remaining) {
            if duration < remaining {
                return self.current_event();
            }
        }
        self.voice.event(self.position)
    }

    /// Make the event at `index` current with its full duration
    pub fn seek(&mut self, index: usize) -> Result<()> {
        if index > self.voice.len() {
            return Err(AgniError::SeekOutOfRange { index, len: self.voice.len() });
        }
        self.position = index;
        self.step();
        Ok(())
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            position: self.position,
            current: self.current,
            remaining: self.remaining,
        }
    }

    pub fn restore(&mut self, snapshot: CursorSnapshot) {
        self.position = snapshot.position;
        self.current = snapshot.current;
        self.remaining = snapshot.remaining;
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_event(&self) -> Option<&'a RhythmicEvent> {
        self.voice.event(self.current?)
    }

    pub fn remaining_duration(&self) -> Option<Duration> {
        self.remaining
    }

    pub fn current_pitch(&self) -> Option<Pitch> {
        self.current_event()?.pitch()
    }

    pub fn current_is_note(&self) -> bool {
        self.current_event().is_some_and(RhythmicEvent::is_note)
    }

    pub fn current_tie(&self) -> bool {
        self.current_event().is_some_and(|e| e.tied)
    }

    /// Enclosing tuplet of the current event, if any time remains in it
    pub fn current_tuplet(&self) -> Option<&'a Tuplet> {
        if self.remaining.is_none_or(|r| r.is_zero()) {
            return None;
        }
        self.voice.tuplet(self.current?)
    }

    pub fn current_tuplet_ratio(&self) -> Option<TupletRatio> {
        self.current_tuplet().map(|t| t.ratio)
    }

    pub fn is_start_of_tuplet(&self) -> bool {
        match (self.current_tuplet(), self.current) {
            (Some(tuplet), Some(index)) => tuplet.first_event == index,
            _ => false,
        }
    }

    pub fn is_multi_measure_rest(&self) -> bool {
        self.current_event().is_some_and(RhythmicEvent::is_multi_measure_rest)
    }

    pub fn written_duration(&self) -> Option<Duration> {
        Some(self.current_event()?.written_duration)
    }

    /// True while nothing of the current event has been consumed
    pub fn is_start_of_written_note(&self) -> bool {
        self.remaining.is_some() && self.remaining == self.written_duration()
    }

    /// Duration a derived matrix note should be notated with.
    ///
    /// Inside a tuplet, or when the remainder of a note cannot be written as
    /// a single note value, this is the written duration of the event.
    pub fn matrix_duration(&self) -> Option<Duration> {
        let remaining = self.remaining?;
        if self.current_tuplet().is_some() || (self.current_is_note() && !remaining.is_assignable()) {
            return self.written_duration();
        }
        Some(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch(hertz: f64) -> Pitch {
        Pitch::from_hertz(hertz)
    }

    fn quarter() -> Duration {
        Duration::new(1, 4)
    }

    fn three_notes() -> Voice {
        Voice::builder("melody")
            .note(pitch(440.0), quarter())
            .note(pitch(466.0), Duration::new(1, 2))
            .rest(quarter())
            .build()
            .unwrap()
    }

    #[test]
    fn test_advance_until_exhausted() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        assert_eq!(cursor.current_pitch(), Some(pitch(440.0)));
        assert_eq!(cursor.remaining_duration(), Some(quarter()));
        assert!(cursor.advance().unwrap().is_some());
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 2)));
        assert!(cursor.advance().unwrap().is_some());
        assert_eq!(cursor.current_pitch(), None);
        assert!(cursor.has_current());
        assert!(cursor.advance().unwrap().is_none());
        assert!(!cursor.has_current());
        assert!(matches!(cursor.advance(), Err(AgniError::Exhausted)));
        assert!(!cursor.has_current());
    }

    #[test]
    fn test_empty_voice_starts_exhausted() {
        let voice = Voice::default();
        let cursor = VoiceCursor::new(&voice);
        assert!(!cursor.has_current());
        assert_eq!(cursor.matrix_duration(), None);
        assert!(matches!(cursor.clone().advance(), Err(AgniError::Exhausted)));
    }

    #[test]
    fn test_shorten_within_event() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        cursor.advance().unwrap();
        cursor.shorten(Duration::new(1, 8)).unwrap();
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(3, 8)));
        assert!(!cursor.is_start_of_written_note());
        cursor.shorten(Duration::new(3, 8)).unwrap();
        assert_eq!(cursor.remaining_duration(), Some(Duration::ZERO));
        assert_eq!(cursor.current_pitch(), Some(pitch(466.0)));
    }

    #[test]
    fn test_shorten_across_events() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        cursor.shorten(Duration::new(1, 2)).unwrap();
        assert_eq!(cursor.current_index(), Some(1));
        assert_eq!(cursor.remaining_duration(), Some(quarter()));

        let mut cursor = VoiceCursor::new(&voice);
        cursor.shorten(Duration::new(3, 4)).unwrap();
        assert_eq!(cursor.current_index(), Some(2));
        assert_eq!(cursor.remaining_duration(), Some(quarter()));
    }

    #[test]
    fn test_overshortening_fails() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        cursor.shorten(Duration::new(1, 8)).unwrap();
        let before = cursor.snapshot();
        let result = cursor.shorten(Duration::new(2, 1));
        assert!(matches!(result, Err(AgniError::Overshortened { .. })));
        assert_eq!(cursor.snapshot(), before);
        assert_eq!(cursor.current_index(), Some(0));
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 8)));

        let empty = Voice::default();
        let mut cursor = VoiceCursor::new(&empty);
        assert!(matches!(cursor.shorten(quarter()), Err(AgniError::Exhausted)));
    }

    #[test]
    fn test_peek_does_not_move() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        cursor.advance().unwrap();
        let peeked = cursor.peek(Some(Duration::new(1, 4))).unwrap();
        assert_eq!(peeked.pitch(), Some(pitch(466.0)));
        let peeked = cursor.peek(Some(Duration::new(1, 2))).unwrap();
        assert_eq!(peeked.pitch(), None);
        let peeked = cursor.peek(None).unwrap();
        assert_eq!(peeked.pitch(), None);
        assert_eq!(cursor.current_index(), Some(1));
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 2)));
    }

    #[test]
    fn test_seek_and_restore() {
        let voice = three_notes();
        let mut cursor = VoiceCursor::new(&voice);
        cursor.shorten(Duration::new(1, 8)).unwrap();
        let snapshot = cursor.snapshot();

        cursor.seek(1).unwrap();
        assert_eq!(cursor.current_pitch(), Some(pitch(466.0)));
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 2)));
        cursor.seek(3).unwrap();
        assert!(!cursor.has_current());
        assert!(cursor.seek(4).is_err());

        cursor.restore(snapshot);
        assert_eq!(cursor.current_index(), Some(0));
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 8)));
    }

    #[test]
    fn test_matrix_duration() {
        let voice = Voice::builder("bass")
            .note(pitch(110.0), Duration::new(5, 8))
            .tuplet(TupletRatio::new(2, 3), |t| {
                t.note(pitch(110.0), Duration::new(1, 8))
                    .note(pitch(110.0), Duration::new(1, 8))
                    .note(pitch(110.0), Duration::new(1, 8))
            })
            .build()
            .unwrap();
        let mut cursor = VoiceCursor::new(&voice);
        // 5/8 cannot be written as one note value
        assert_eq!(cursor.matrix_duration(), Some(Duration::new(5, 8)));
        cursor.shorten(Duration::new(1, 8)).unwrap();
        assert_eq!(cursor.matrix_duration(), Some(Duration::new(1, 2)));
        cursor.shorten(Duration::new(3, 16)).unwrap();
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(5, 16)));
        assert_eq!(cursor.matrix_duration(), Some(Duration::new(5, 8)));

        cursor.advance().unwrap();
        assert_eq!(cursor.remaining_duration(), Some(Duration::new(1, 12)));
        assert_eq!(cursor.matrix_duration(), Some(Duration::new(1, 8)));
        assert!(cursor.is_start_of_tuplet());
        assert_eq!(cursor.current_tuplet_ratio(), Some(TupletRatio::new(2, 3)));
        cursor.advance().unwrap();
        assert!(!cursor.is_start_of_tuplet());
        assert!(cursor.current_tuplet().is_some());
    }

    #[test]
    fn test_multi_measure_rest_and_tie() {
        let voice = Voice::builder("melody")
            .multi_measure_rest(Duration::new(2, 1))
            .tied_note(pitch(440.0), quarter())
            .build()
            .unwrap();
        let mut cursor = VoiceCursor::new(&voice);
        assert!(cursor.is_multi_measure_rest());
        assert!(!cursor.current_tie());
        cursor.advance().unwrap();
        assert!(!cursor.is_multi_measure_rest());
        assert!(cursor.current_tie());
    }
}
