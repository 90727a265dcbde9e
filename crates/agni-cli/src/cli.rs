use std::path::PathBuf;

use agni_core::{AgniConfig, DedupMode, DisplayFormat, PitchInput, PitchType, Tuning};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "agni", version)]
#[command(about = "Combination-tone matrices for two-voice passages", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the matrix for one bass and melody pitch
    Matrix {
        /// Bass pitch: a number or a LilyPond name
        #[arg(allow_hyphen_values = true)]
        bass: String,

        /// Melody pitch: a number or a LilyPond name
        #[arg(allow_hyphen_values = true)]
        melody: String,

        /// Read numeric pitches as hertz or MIDI numbers
        #[arg(long, value_enum)]
        pitch_input: Option<PitchInputArg>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Synchronize a passage file and show its matrices
    Passage {
        /// TOML or JSON passage file
        file: PathBuf,

        /// Keep only the first matrix for each bass/melody pair
        #[arg(long, conflicts_with = "adjacent_duplicates")]
        as_set: bool,

        /// Keep repeated matrices, even back to back
        #[arg(long)]
        adjacent_duplicates: bool,

        /// Print the synchronized leaves instead of matrices
        #[arg(long)]
        leaves: bool,

        /// Read numeric pitches as hertz or MIDI numbers
        #[arg(long, value_enum)]
        pitch_input: Option<PitchInputArg>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Show or store the configuration file
    Config {
        /// Write the effective settings to the configuration file
        #[arg(long)]
        save: bool,

        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// Flags shared by every subcommand that renders matrices
#[derive(Args, Default)]
pub struct DisplayArgs {
    /// Matrix size (multipliers 0 to N-1)
    #[arg(short, long)]
    pub multiples: Option<usize>,

    #[arg(short, long, value_enum)]
    pub pitch_type: Option<PitchTypeArg>,

    #[arg(short, long, value_enum)]
    pub tuning: Option<TuningArg>,

    #[arg(short, long, value_enum)]
    pub display_format: Option<DisplayFormatArg>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl DisplayArgs {
    /// Apply any flags given on the command line over `config`
    pub fn apply(&self, config: &mut AgniConfig) {
        if let Some(multiples) = self.multiples {
            config.multiples = multiples;
        }
        if let Some(pitch_type) = self.pitch_type {
            config.pitch_type = pitch_type.into();
        }
        if let Some(tuning) = self.tuning {
            config.tuning = tuning.into();
        }
        if let Some(format) = self.display_format {
            config.display_format = format.into();
        }
    }
}

/// Dedup mode selected by the passage flags, if any
pub fn dedup_override(as_set: bool, adjacent_duplicates: bool) -> Option<DedupMode> {
    match (as_set, adjacent_duplicates) {
        (true, _) => Some(DedupMode::AsSet),
        (false, true) => Some(DedupMode::All),
        (false, false) => None,
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PitchInputArg {
    Hertz,
    Midi,
}

impl From<PitchInputArg> for PitchInput {
    fn from(arg: PitchInputArg) -> Self {
        match arg {
            PitchInputArg::Hertz => Self::Hertz,
            PitchInputArg::Midi => Self::Midi,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PitchTypeArg {
    Hertz,
    Midi,
    Lilypond,
    All,
}

impl From<PitchTypeArg> for PitchType {
    fn from(arg: PitchTypeArg) -> Self {
        match arg {
            PitchTypeArg::Hertz => Self::Hertz,
            PitchTypeArg::Midi => Self::Midi,
            PitchTypeArg::Lilypond => Self::Lilypond,
            PitchTypeArg::All => Self::All,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TuningArg {
    Microtonal,
    EqualTempered,
}

impl From<TuningArg> for Tuning {
    fn from(arg: TuningArg) -> Self {
        match arg {
            TuningArg::Microtonal => Self::Microtonal,
            TuningArg::EqualTempered => Self::EqualTempered,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DisplayFormatArg {
    Table,
    List,
    Chord,
    Melody,
}

impl From<DisplayFormatArg> for DisplayFormat {
    fn from(arg: DisplayFormatArg) -> Self {
        match arg {
            DisplayFormatArg::Table => Self::Table,
            DisplayFormatArg::List => Self::List,
            DisplayFormatArg::Chord => Self::Chord,
            DisplayFormatArg::Melody => Self::Melody,
        }
    }
}
