//! Combination-tone matrices
//!
//! A matrix is built from a bass and a melody frequency. Cell `(i, j)` holds
//! `bass * i + melody * j` for `i, j` in `0..multiples`. The `(0, 0)` cell is
//! silent and never displayed.
//!
//! Two matrices are considered the same matrix when their base frequencies
//! match, whatever their size. Sequence deduplication relies on this.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{AgniError, Result};
use crate::pitch::{self, Pitch, PitchType, Tuning};

/// Default grid size
pub const DEFAULT_MULTIPLES: usize = 4;

pub type Grid = Vec<Vec<f64>>;

/// Build the raw frequency grid. `grid[i][j] = bass * i + melody * j`.
pub fn build(bass: f64, melody: f64, size: usize) -> Grid {
    (0..size)
        .map(|i| {
            let bass_multiple = bass * i as f64;
            (0..size).map(|j| bass_multiple + melody * j as f64).collect()
        })
        .collect()
}

/// Every non-zero cell ascending, with the element at sorted index 0 dropped
pub fn sorted_frequencies(grid: &Grid) -> Vec<f64> {
    let mut frequencies: Vec<f64> = grid
        .iter()
        .flatten()
        .copied()
        .filter(|f| *f != 0.0)
        .collect();
    frequencies.sort_by(f64::total_cmp);
    if !frequencies.is_empty() {
        frequencies.remove(0);
    }
    frequencies
}

/// Generated-tone cells only, ascending
pub fn sorted_generated_frequencies(grid: &Grid) -> Vec<f64> {
    let mut frequencies: Vec<f64> = grid
        .iter()
        .enumerate()
        .flat_map(|(i, row)| row.iter().enumerate().map(move |(j, f)| (i, j, *f)))
        .filter(|&(i, j, f)| f != 0.0 && PitchRole::classify(i, j) == Some(PitchRole::GeneratedTone))
        .map(|(_, _, f)| f)
        .collect();
    frequencies.sort_by(f64::total_cmp);
    frequencies
}

/// Classification of a non-zero cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchRole {
    /// `(1, 0)` or `(0, 1)`
    BaseFrequency,
    /// `(i, 0)` or `(0, j)` with a multiplier above 1
    BaseMultiple,
    /// Both voices contribute
    GeneratedTone,
}

impl PitchRole {
    /// `None` for the silent `(0, 0)` cell
    pub fn classify(bass_multiplier: usize, melody_multiplier: usize) -> Option<Self> {
        match (bass_multiplier, melody_multiplier) {
            (0, 0) => None,
            (1, 0) | (0, 1) => Some(Self::BaseFrequency),
            (_, 0) | (0, _) => Some(Self::BaseMultiple),
            _ => Some(Self::GeneratedTone),
        }
    }
}

/// One cell of a matrix, remembering which multiples produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatrixPitch {
    pub bass_multiplier: usize,
    pub melody_multiplier: usize,
    /// `None` when the sum is zero
    pub frequency: Option<f64>,
}

impl MatrixPitch {
    pub fn new(bass: f64, melody: f64, bass_multiplier: usize, melody_multiplier: usize) -> Self {
        let frequency = bass * bass_multiplier as f64 + melody * melody_multiplier as f64;
        Self {
            bass_multiplier,
            melody_multiplier,
            frequency: (frequency != 0.0).then_some(frequency),
        }
    }

    pub fn role(&self) -> Option<PitchRole> {
        self.frequency?;
        PitchRole::classify(self.bass_multiplier, self.melody_multiplier)
    }

    pub fn is_base_frequency(&self) -> bool {
        self.role() == Some(PitchRole::BaseFrequency)
    }

    fn sortable_frequency(&self) -> f64 {
        self.frequency.unwrap_or(0.0)
    }

    pub fn display(&self, pitch_type: PitchType, tuning: Tuning) -> String {
        self.frequency
            .and_then(|f| pitch::display(f, pitch_type, tuning))
            .unwrap_or_default()
    }

    /// `(2 x bass) + (1 x melody)`, or `2B + 1M` when abbreviated
    pub fn label(&self, abbreviated: bool) -> String {
        if abbreviated {
            format!("{}B + {}M", self.bass_multiplier, self.melody_multiplier)
        } else {
            format!(
                "({} x bass) + ({} x melody)",
                self.bass_multiplier, self.melody_multiplier
            )
        }
    }

    pub fn instrument_name(&self) -> String {
        instrument_name(self.bass_multiplier, self.melody_multiplier)
    }
}

fn part_label(multiple: usize, part: char) -> String {
    match multiple {
        0 => String::new(),
        1 => part.to_string(),
        n => format!("{n}{part}"),
    }
}

/// Short ensemble name for a cell: `B`, `2M`, `B + 2M`, `3B + 3M`
pub fn instrument_name(bass_multiplier: usize, melody_multiplier: usize) -> String {
    let bass = part_label(bass_multiplier, 'B');
    let melody = part_label(melody_multiplier, 'M');
    match (bass.is_empty(), melody.is_empty()) {
        (false, false) => format!("{bass} + {melody}"),
        (false, true) => bass,
        _ => melody,
    }
}

/// Names of every derived cell of a `multiples`-sized matrix, melody-major
pub fn instrument_names(multiples: usize) -> Vec<String> {
    (0..multiples)
        .flat_map(|melody| (0..multiples).map(move |bass| (bass, melody)))
        .filter(|&(bass, melody)| {
            !matches!(PitchRole::classify(bass, melody), None | Some(PitchRole::BaseFrequency))
        })
        .map(|(bass, melody)| instrument_name(bass, melody))
        .collect()
}

/// A combination-tone matrix for one bass/melody pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencyMatrix {
    pub bass: f64,
    pub melody: f64,
    pub multiples: usize,
}

impl FrequencyMatrix {
    pub fn new(bass: f64, melody: f64, multiples: usize) -> Result<Self> {
        if multiples == 0 {
            return Err(AgniError::InvalidMultiples(multiples));
        }
        Ok(Self { bass, melody, multiples })
    }

    pub fn from_pitches(bass: Pitch, melody: Pitch, multiples: usize) -> Result<Self> {
        Self::new(bass.hertz, melody.hertz, multiples)
    }

    pub fn grid(&self) -> Grid {
        build(self.bass, self.melody, self.multiples)
    }

    pub fn cell(&self, bass_multiplier: usize, melody_multiplier: usize) -> MatrixPitch {
        MatrixPitch::new(self.bass, self.melody, bass_multiplier, melody_multiplier)
    }

    /// Rows of cells indexed `[bass_multiplier][melody_multiplier]`
    pub fn rows(&self) -> Vec<Vec<MatrixPitch>> {
        (0..self.multiples)
            .map(|i| (0..self.multiples).map(|j| self.cell(i, j)).collect())
            .collect()
    }

    pub fn pitches(&self) -> impl Iterator<Item = MatrixPitch> + '_ {
        (0..self.multiples)
            .flat_map(move |i| (0..self.multiples).map(move |j| self.cell(i, j)))
    }

    pub fn sorted_frequencies(&self) -> Vec<f64> {
        sorted_frequencies(&self.grid())
    }

    pub fn sorted_generated_frequencies(&self) -> Vec<f64> {
        sorted_generated_frequencies(&self.grid())
    }

    /// All sounding cells ascending
    pub fn sorted_pitches(&self) -> Vec<MatrixPitch> {
        let mut pitches: Vec<MatrixPitch> = self.pitches().filter(|p| p.frequency.is_some()).collect();
        pitches.sort_by(|a, b| a.sortable_frequency().total_cmp(&b.sortable_frequency()));
        pitches
    }

    /// Base multiples and generated tones ascending; the ensemble view
    pub fn sorted_derived_pitches(&self) -> Vec<MatrixPitch> {
        self.sorted_pitches()
            .into_iter()
            .filter(|p| !p.is_base_frequency())
            .collect()
    }

    /// Identity used for deduplication
    pub fn base_pair(&self) -> (u64, u64) {
        (self.bass.to_bits(), self.melody.to_bits())
    }
}

impl PartialEq for FrequencyMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.base_pair() == other.base_pair()
    }
}

impl Eq for FrequencyMatrix {}

impl Hash for FrequencyMatrix {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_pair().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_build_grid() {
        let grid = build(440.0, 466.0, 4);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0][0], 0.0);
        assert_eq!(grid[1][0], 440.0);
        assert_eq!(grid[0][1], 466.0);
        assert_eq!(grid[2][3], 880.0 + 1398.0);
        assert_eq!(build(440.0, 466.0, 1), vec![vec![0.0]]);
    }

    #[test]
    fn test_sorted_frequencies_drops_lowest() {
        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        assert_eq!(
            matrix.sorted_frequencies(),
            vec![
                466.0, 880.0, 906.0, 932.0, 1320.0, 1346.0, 1372.0, 1398.0, 1786.0, 1812.0,
                1838.0, 2252.0, 2278.0, 2718.0
            ]
        );
    }

    #[test]
    fn test_sorted_frequencies_drops_one_duplicate() {
        // Unison bass and melody: both base cells are 440, only one is dropped
        let frequencies = FrequencyMatrix::new(440.0, 440.0, 2).unwrap().sorted_frequencies();
        assert_eq!(frequencies, vec![440.0, 880.0]);
        assert!(FrequencyMatrix::new(440.0, 466.0, 1).unwrap().sorted_frequencies().is_empty());
    }

    #[test]
    fn test_sorted_generated_frequencies() {
        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        let generated = matrix.sorted_generated_frequencies();
        assert_eq!(
            generated,
            vec![906.0, 1346.0, 1372.0, 1786.0, 1812.0, 1838.0, 2252.0, 2278.0, 2718.0]
        );
        assert!(!generated.contains(&440.0));
        assert!(!generated.contains(&466.0));
    }

    #[test]
    fn test_degenerate_bass_is_excluded() {
        let matrix = FrequencyMatrix::new(0.0, 100.0, 3).unwrap();
        assert_eq!(matrix.sorted_frequencies(), vec![100.0, 100.0, 200.0, 200.0, 200.0]);
        assert_eq!(matrix.sorted_generated_frequencies(), vec![100.0, 100.0, 200.0, 200.0]);
        assert!(FrequencyMatrix::new(440.0, 466.0, 0).is_err());
    }

    #[test]
    fn test_classification() {
        assert_eq!(PitchRole::classify(0, 0), None);
        assert_eq!(PitchRole::classify(1, 0), Some(PitchRole::BaseFrequency));
        assert_eq!(PitchRole::classify(0, 1), Some(PitchRole::BaseFrequency));
        assert_eq!(PitchRole::classify(3, 0), Some(PitchRole::BaseMultiple));
        assert_eq!(PitchRole::classify(0, 2), Some(PitchRole::BaseMultiple));
        assert_eq!(PitchRole::classify(1, 1), Some(PitchRole::GeneratedTone));
        assert_eq!(PitchRole::classify(2, 3), Some(PitchRole::GeneratedTone));

        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        assert_eq!(matrix.cell(3, 0).role(), Some(PitchRole::BaseMultiple));
        assert_eq!(matrix.cell(3, 0).instrument_name(), "3B");
        assert_eq!(matrix.cell(0, 2).role(), Some(PitchRole::BaseMultiple));
        assert_eq!(matrix.cell(0, 2).instrument_name(), "2M");
        assert_eq!(matrix.cell(1, 0).role(), Some(PitchRole::BaseFrequency));
        assert!(matrix.cell(0, 1).is_base_frequency());
        assert_eq!(matrix.cell(0, 0).role(), None);
    }

    #[test]
    fn test_sorted_derived_pitches_order() {
        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        let multipliers: Vec<(usize, usize)> = matrix
            .sorted_derived_pitches()
            .iter()
            .map(|p| (p.bass_multiplier, p.melody_multiplier))
            .collect();
        assert_eq!(
            multipliers,
            vec![
                (2, 0), (1, 1), (0, 2), (3, 0), (2, 1), (1, 2), (0, 3),
                (3, 1), (2, 2), (1, 3), (3, 2), (2, 3), (3, 3)
            ]
        );
    }

    #[test]
    fn test_equality_ignores_size() {
        let small = FrequencyMatrix::new(440.0, 466.0, 2).unwrap();
        let large = FrequencyMatrix::new(440.0, 466.0, 8).unwrap();
        let swapped = FrequencyMatrix::new(466.0, 440.0, 2).unwrap();
        assert_eq!(small, large);
        assert_ne!(small, swapped);
        let set: HashSet<FrequencyMatrix> = [small, large, swapped].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_instrument_names() {
        assert_eq!(instrument_name(1, 0), "B");
        assert_eq!(instrument_name(0, 1), "M");
        assert_eq!(instrument_name(1, 2), "B + 2M");
        assert_eq!(instrument_name(2, 3), "2B + 3M");
        assert_eq!(
            instrument_names(4),
            vec![
                "2B", "3B", "B + M", "2B + M", "3B + M", "2M", "B + 2M", "2B + 2M", "3B + 2M",
                "3M", "B + 3M", "2B + 3M", "3B + 3M"
            ]
        );
        assert_eq!(instrument_names(5).len(), 22);
        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        assert_eq!(matrix.cell(3, 1).instrument_name(), "3B + M");
    }

    #[test]
    fn test_labels() {
        let matrix = FrequencyMatrix::new(440.0, 466.0, 4).unwrap();
        let cell = matrix.cell(2, 1);
        assert_eq!(cell.label(false), "(2 x bass) + (1 x melody)");
        assert_eq!(cell.label(true), "2B + 1M");
        assert_eq!(cell.display(PitchType::Hertz, Tuning::Microtonal), "1,346.0");
        assert_eq!(matrix.cell(0, 0).display(PitchType::Hertz, Tuning::Microtonal), "");
    }
}
