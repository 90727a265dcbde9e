//! Matrix sequences built from synchronized leaves

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::matrix::FrequencyMatrix;
use crate::passage::MatrixLeaf;

/// Which repeated matrices are dropped from a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupMode {
    /// First occurrence of each bass/melody pair, in first-seen order
    AsSet,
    /// Drop a matrix only when it repeats the one just before it
    #[default]
    AdjacentSuppressed,
    /// Keep everything
    All,
}

/// One matrix per leaf that sounds in both voices, then deduplicated
pub fn build_matrices(leaves: &[MatrixLeaf], multiples: usize, mode: DedupMode) -> Result<Vec<FrequencyMatrix>> {
    let mut matrices = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        if let Some(matrix) = leaf.matrix(multiples)? {
            matrices.push(matrix);
        }
    }
    Ok(dedup(matrices, mode))
}

pub fn dedup(matrices: Vec<FrequencyMatrix>, mode: DedupMode) -> Vec<FrequencyMatrix> {
    let before = matrices.len();
    let kept: Vec<FrequencyMatrix> = match mode {
        DedupMode::All => matrices,
        DedupMode::AsSet => {
            let mut seen = HashSet::new();
            matrices.into_iter().filter(|m| seen.insert(m.base_pair())).collect()
        }
        DedupMode::AdjacentSuppressed => {
            let mut kept: Vec<FrequencyMatrix> = Vec::with_capacity(matrices.len());
            for matrix in matrices {
                if kept.last() != Some(&matrix) {
                    kept.push(matrix);
                }
            }
            kept
        }
    };
    debug!(?mode, before, after = kept.len(), "Deduplicated matrices");
    kept
}
