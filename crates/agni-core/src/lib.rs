//! agni-core: Combination-tone matrices and two-voice synchronization

pub mod config;
pub mod display;
mod duration;
mod error;
pub mod matrix;
mod part;
pub mod passage;
pub mod passage_file;
pub mod pitch;
pub mod sequence;
mod voice;

pub use config::{AgniConfig, DisplayFormat};
pub use duration::{Duration, TupletRatio};
pub use error::{AgniError, Result};
pub use matrix::{FrequencyMatrix, MatrixPitch, PitchRole};
pub use part::{CursorSnapshot, VoiceCursor};
pub use passage::{MatrixLeaf, Passage, PassageSynchronizer};
pub use pitch::{Pitch, PitchInput, PitchType, Tuning};
pub use sequence::DedupMode;
pub use voice::{EventKind, RhythmicEvent, Tuplet, Voice, VoiceBuilder};
