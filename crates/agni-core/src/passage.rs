//! Two-voice passages and their synchronization into matrix leaves
//!
//! The synchronizer walks a bass cursor and a melody cursor side by side and
//! emits one [`MatrixLeaf`] for every stretch of time in which the pair of
//! sounding pitches stays the same.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AgniConfig;
use crate::duration::{Duration, TupletRatio};
use crate::error::Result;
use crate::matrix::{self, FrequencyMatrix, MatrixPitch};
use crate::part::VoiceCursor;
use crate::pitch::Pitch;
use crate::sequence;
use crate::voice::{RhythmicEvent, Voice};

/// One synchronized slice of the bass/melody timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixLeaf {
    pub bass: Option<Pitch>,
    pub melody: Option<Pitch>,
    /// Notated duration of the derived matrix note
    pub duration: Duration,
    /// Time actually covered by this slice
    pub elapsed: Duration,
    /// Both voices are in a multi-measure rest
    pub is_rest: bool,
    /// Tied into the next leaf
    pub tie: bool,
    pub tuplet: Option<TupletRatio>,
    pub is_first_in_tuplet: bool,
}

impl MatrixLeaf {
    pub fn contains_pitches(&self) -> bool {
        self.bass.is_some() && self.melody.is_some()
    }

    /// The leaf's matrix, or `None` unless both voices sound
    pub fn matrix(&self, multiples: usize) -> Result<Option<FrequencyMatrix>> {
        match (self.bass, self.melody) {
            (Some(bass), Some(melody)) => FrequencyMatrix::from_pitches(bass, melody, multiples).map(Some),
            _ => Ok(None),
        }
    }

    /// Base multiples and generated tones, lowest first
    pub fn generated_pitches(&self, multiples: usize) -> Result<Vec<MatrixPitch>> {
        Ok(self
            .matrix(multiples)?
            .map(|m| m.sorted_derived_pitches())
            .unwrap_or_default())
    }

    pub fn instrument_names(&self, multiples: usize) -> Vec<String> {
        if self.contains_pitches() {
            matrix::instrument_names(multiples)
        } else {
            Vec::new()
        }
    }
}

/// Which cursor ends first in the current slice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shorter {
    Bass,
    Melody,
    Neither,
}

/// Merges a bass and a melody cursor into matrix leaves.
///
/// Iterating yields leaves in timeline order. An error ends the iteration.
#[derive(Debug, Clone)]
pub struct PassageSynchronizer<'a> {
    bass: VoiceCursor<'a>,
    melody: VoiceCursor<'a>,
    failed: bool,
}

impl<'a> PassageSynchronizer<'a> {
    pub fn new(bass: &'a Voice, melody: &'a Voice) -> Self {
        Self {
            bass: VoiceCursor::new(bass),
            melody: VoiceCursor::new(melody),
            failed: false,
        }
    }

    fn shorter(&self) -> Shorter {
        match (self.bass.remaining_duration(), self.melody.remaining_duration()) {
            (Some(bass), Some(melody)) if bass < melody => Shorter::Bass,
            (Some(bass), Some(melody)) if melody < bass => Shorter::Melody,
            (Some(_), None) => Shorter::Bass,
            (None, Some(_)) => Shorter::Melody,
            _ => Shorter::Neither,
        }
    }

    /// Produce the next leaf and move both cursors past it
    pub fn next_leaf(&mut self) -> Result<Option<MatrixLeaf>> {
        if !self.bass.has_current() && !self.melody.has_current() {
            return Ok(None);
        }
        let bass_pitch = self.bass.current_pitch();
        let melody_pitch = self.melody.current_pitch();
        let is_rest = self.bass.is_multi_measure_rest() && self.melody.is_multi_measure_rest();
        let before = sounding_set([bass_pitch, melody_pitch]);

        let shorter = self.shorter();
        let leaf = match shorter {
            Shorter::Neither => {
                let prefer_melody =
                    self.bass.current_tuplet().is_none() && self.melody.current_tuplet().is_some();
                let (primary, secondary) = if prefer_melody {
                    (&self.melody, &self.bass)
                } else {
                    (&self.bass, &self.melody)
                };
                let elapsed = primary.remaining_duration().unwrap_or(Duration::ZERO);
                let duration = primary.matrix_duration().unwrap_or(elapsed);
                let (tuplet, is_first_in_tuplet) = tuplet_of(primary, secondary);
                let after = sounding_set([peek_pitch(self.bass.peek(None)), peek_pitch(self.melody.peek(None))]);
                let both_tied = self.bass.current_tie() && self.melody.current_tie();
                let either_tied = self.bass.current_tie() || self.melody.current_tie();
                let tie = both_tied || (either_tied && before == after);

                self.bass.advance()?;
                self.melody.advance()?;
                MatrixLeaf {
                    bass: bass_pitch,
                    melody: melody_pitch,
                    duration,
                    elapsed,
                    is_rest,
                    tie,
                    tuplet,
                    is_first_in_tuplet,
                }
            }
            Shorter::Bass | Shorter::Melody => {
                let Self { bass, melody, .. } = self;
                let (shorter, longer) = if shorter == Shorter::Bass { (bass, melody) } else { (melody, bass) };
                let mut leaf = step_unequal(shorter, longer, &before)?;
                leaf.bass = bass_pitch;
                leaf.melody = melody_pitch;
                leaf.is_rest = is_rest;
                leaf
            }
        };
        debug!(
            bass = ?leaf.bass.map(|p| p.hertz),
            melody = ?leaf.melody.map(|p| p.hertz),
            duration = %leaf.duration,
            tie = leaf.tie,
            "Matrix leaf"
        );
        Ok(Some(leaf))
    }
}

impl Iterator for PassageSynchronizer<'_> {
    type Item = Result<MatrixLeaf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_leaf() {
            Ok(leaf) => leaf.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// One slice where `shorter` ends strictly before `longer`
fn step_unequal(
    shorter: &mut VoiceCursor<'_>,
    longer: &mut VoiceCursor<'_>,
    before: &[u64],
) -> Result<MatrixLeaf> {
    let consumed = shorter.remaining_duration().unwrap_or(Duration::ZERO);
    let long_case = tied_across_longer(shorter, longer);
    let (tuplet, is_first_in_tuplet) = tuplet_of(shorter, longer);
    let shorter_tied = shorter.current_tie();
    let both_tied = shorter_tied && longer.current_tie();

    let (duration, elapsed, after) = match (long_case, longer.written_duration()) {
        (true, Some(written)) => {
            let after = sounding_set([
                peek_pitch(shorter.peek(Some(written))),
                peek_pitch(longer.peek(None)),
            ]);
            (written, written, after)
        }
        _ => {
            let after = sounding_set([
                peek_pitch(shorter.peek(Some(consumed))),
                peek_pitch(longer.peek(Some(consumed))),
            ]);
            (shorter.matrix_duration().unwrap_or(consumed), consumed, after)
        }
    };
    let tie = both_tied || (shorter_tied && before == after.as_slice());

    if long_case {
        shorter.shorten(elapsed)?;
        longer.advance()?;
    } else {
        shorter.advance()?;
        if longer.has_current() {
            longer.shorten(consumed)?;
        }
    }

    Ok(MatrixLeaf {
        bass: None,
        melody: None,
        duration,
        elapsed,
        is_rest: false,
        tie,
        tuplet,
        is_first_in_tuplet,
    })
}

/// True when a run of tied notes in `shorter` covers the whole untouched
/// note in `longer`, so the longer note sets the slice.
///
/// The shorter cursor is restored before returning.
fn tied_across_longer(shorter: &mut VoiceCursor<'_>, longer: &VoiceCursor<'_>) -> bool {
    if !(shorter.current_is_note() && longer.current_is_note()) {
        return false;
    }
    if !shorter.current_tie() || longer.current_tie() {
        return false;
    }
    let Some(target) = longer.written_duration() else {
        return false;
    };
    let snapshot = shorter.snapshot();
    let mut span = shorter.remaining_duration().unwrap_or(Duration::ZERO);
    while span < target && shorter.current_tie() {
        match shorter.advance() {
            Ok(Some(_)) => span += shorter.remaining_duration().unwrap_or(Duration::ZERO),
            _ => break,
        }
    }
    shorter.restore(snapshot);
    let covers = longer.is_start_of_written_note() && span >= target;
    trace!(%span, %target, covers, "Tied lookahead");
    covers
}

/// Tuplet metadata from `first`, falling back to `second`
fn tuplet_of(first: &VoiceCursor<'_>, second: &VoiceCursor<'_>) -> (Option<TupletRatio>, bool) {
    if let Some(ratio) = first.current_tuplet_ratio() {
        return (Some(ratio), first.is_start_of_tuplet());
    }
    match second.current_tuplet_ratio() {
        Some(ratio) => (Some(ratio), second.is_start_of_tuplet()),
        None => (None, false),
    }
}

fn peek_pitch(event: Option<&RhythmicEvent>) -> Option<Pitch> {
    event.and_then(RhythmicEvent::pitch)
}

/// Distinct sounding frequencies, as exact bit patterns
fn sounding_set(pitches: [Option<Pitch>; 2]) -> Vec<u64> {
    let mut bits: Vec<u64> = pitches.iter().flatten().map(Pitch::bits).collect();
    bits.sort_unstable();
    bits.dedup();
    bits
}

/// A bass and a melody voice, optionally with header metadata
#[derive(Debug, Clone, Default)]
pub struct Passage {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub bass: Voice,
    pub melody: Voice,
}

impl Passage {
    pub fn new(bass: Voice, melody: Voice) -> Self {
        Self { bass, melody, ..Default::default() }
    }

    pub fn synchronizer(&self) -> PassageSynchronizer<'_> {
        PassageSynchronizer::new(&self.bass, &self.melody)
    }

    /// Every synchronized leaf in order
    pub fn leaves(&self) -> Result<Vec<MatrixLeaf>> {
        self.synchronizer().collect()
    }

    /// Matrices for the sounding leaves, deduplicated per `config`
    pub fn matrices(&self, config: &AgniConfig) -> Result<Vec<FrequencyMatrix>> {
        let leaves = self.leaves()?;
        sequence::build_matrices(&leaves, config.multiples, config.dedup)
    }
}
