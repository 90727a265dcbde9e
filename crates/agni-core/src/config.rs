//! Matrix and display settings

use serde::{Deserialize, Serialize};

use crate::error::{AgniError, Result};
use crate::matrix::DEFAULT_MULTIPLES;
use crate::pitch::{PitchInput, PitchType, Tuning};
use crate::sequence::DedupMode;

/// How a matrix is laid out as text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayFormat {
    #[default]
    Table,
    List,
    Chord,
    Melody,
}

/// Settings shared by every matrix operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgniConfig {
    /// Grid size; multipliers run from 0 to `multiples - 1`
    pub multiples: usize,
    pub dedup: DedupMode,
    pub tuning: Tuning,
    pub pitch_type: PitchType,
    pub display_format: DisplayFormat,
    /// How numeric pitch arguments are read
    pub pitch_input: PitchInput,
}

impl Default for AgniConfig {
    fn default() -> Self {
        Self {
            multiples: DEFAULT_MULTIPLES,
            dedup: DedupMode::default(),
            tuning: Tuning::default(),
            pitch_type: PitchType::default(),
            display_format: DisplayFormat::default(),
            pitch_input: PitchInput::default(),
        }
    }
}

impl AgniConfig {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.multiples == 0 {
            return Err(AgniError::InvalidMultiples(self.multiples));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AgniConfig::default();
        assert_eq!(config.multiples, 4);
        assert_eq!(config.dedup, DedupMode::AdjacentSuppressed);
        assert_eq!(config.tuning, Tuning::Microtonal);
        assert_eq!(config.pitch_type, PitchType::Hertz);
        assert_eq!(config.display_format, DisplayFormat::Table);
        assert_eq!(config.pitch_input, PitchInput::Hertz);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AgniConfig::from_toml(
            r#"
            multiples = 6
            dedup = "as-set"
            tuning = "equal-tempered"
            "#,
        )
        .unwrap();
        assert_eq!(config.multiples, 6);
        assert_eq!(config.dedup, DedupMode::AsSet);
        assert_eq!(config.tuning, Tuning::EqualTempered);
        assert_eq!(config.display_format, DisplayFormat::Table);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(AgniConfig::from_toml("multiples = 0"), Err(AgniError::InvalidMultiples(0))));
        assert!(matches!(AgniConfig::from_toml("dedup = \"sometimes\""), Err(AgniError::Toml(_))));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AgniConfig { pitch_type: PitchType::Lilypond, ..Default::default() };
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("pitch_type = \"lilypond\""));
        assert_eq!(AgniConfig::from_toml(&text).unwrap(), config);
    }
}
