//! agni: command-line front end for agni-core

mod cli;
mod config;

use agni_core::{display, passage_file, AgniConfig, FrequencyMatrix, MatrixLeaf, MatrixPitch, Passage, Pitch};
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};

/// A matrix with its sorted views, for `--json`
#[derive(Serialize)]
struct MatrixReport {
    #[serde(flatten)]
    matrix: FrequencyMatrix,
    grid: Vec<Vec<f64>>,
    sorted_frequencies: Vec<f64>,
    sorted_generated_frequencies: Vec<f64>,
    pitches: Vec<MatrixPitch>,
}

impl From<FrequencyMatrix> for MatrixReport {
    fn from(matrix: FrequencyMatrix) -> Self {
        Self {
            grid: matrix.grid(),
            sorted_frequencies: matrix.sorted_frequencies(),
            sorted_generated_frequencies: matrix.sorted_generated_frequencies(),
            pitches: matrix.sorted_derived_pitches(),
            matrix,
        }
    }
}

#[derive(Serialize)]
struct PassageReport<'a, T> {
    title: Option<&'a str>,
    composer: Option<&'a str>,
    #[serde(flatten)]
    body: T,
}

fn report<T>(passage: &Passage, body: T) -> PassageReport<'_, T> {
    PassageReport {
        title: passage.title.as_deref(),
        composer: passage.composer.as_deref(),
        body,
    }
}

#[derive(Serialize)]
struct Leaves<'a> {
    leaves: &'a [MatrixLeaf],
}

#[derive(Serialize)]
struct Matrices {
    matrices: Vec<MatrixReport>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("agni=info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = config::load_config();

    match cli.command {
        Command::Matrix { bass, melody, pitch_input, display: args } => {
            if let Some(input) = pitch_input {
                config.pitch_input = input.into();
            }
            args.apply(&mut config);
            config.validate()?;
            run_matrix(&bass, &melody, &config, args.json)
        }
        Command::Passage { file, as_set, adjacent_duplicates, leaves, pitch_input, display: args } => {
            if let Some(input) = pitch_input {
                config.pitch_input = input.into();
            }
            if let Some(mode) = cli::dedup_override(as_set, adjacent_duplicates) {
                config.dedup = mode;
            }
            args.apply(&mut config);
            config.validate()?;
            let passage = passage_file::load(&file, config.pitch_input)
                .with_context(|| format!("reading passage {}", file.display()))?;
            run_passage(&passage, &config, leaves, args.json)
        }
        Command::Config { save, display: args } => {
            args.apply(&mut config);
            config.validate()?;
            if save {
                let path = config::save_config(&config)?;
                tracing::info!("Saved configuration to {}", path.display());
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("# {}", config::config_path().display());
                print!("{}", toml::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

fn run_matrix(bass: &str, melody: &str, config: &AgniConfig, json: bool) -> anyhow::Result<()> {
    let bass = Pitch::parse(bass, config.pitch_input).context("bass pitch")?;
    let melody = Pitch::parse(melody, config.pitch_input).context("melody pitch")?;
    let matrix = FrequencyMatrix::from_pitches(bass, melody, config.multiples)?;
    tracing::debug!(bass = bass.hertz, melody = melody.hertz, multiples = config.multiples, "Building matrix");
    if json {
        println!("{}", serde_json::to_string_pretty(&MatrixReport::from(matrix))?);
    } else {
        println!("{}", display::render(&matrix, config));
    }
    Ok(())
}

fn run_passage(passage: &Passage, config: &AgniConfig, show_leaves: bool, json: bool) -> anyhow::Result<()> {
    if show_leaves {
        let leaves = passage.leaves()?;
        tracing::info!("{} leaves", leaves.len());
        if json {
            println!("{}", serde_json::to_string_pretty(&report(passage, Leaves { leaves: &leaves }))?);
        } else {
            print_heading(passage);
            println!("{}", display::render_leaves(&leaves, config.pitch_type, config.tuning));
        }
        return Ok(());
    }

    let matrices = passage.matrices(config)?;
    tracing::info!("{} matrices", matrices.len());
    if json {
        let matrices = matrices.into_iter().map(MatrixReport::from).collect();
        println!("{}", serde_json::to_string_pretty(&report(passage, Matrices { matrices }))?);
    } else {
        print_heading(passage);
        println!("{}", display::render_all(&matrices, config));
    }
    Ok(())
}

fn print_heading(passage: &Passage) {
    let heading = match (passage.title.as_deref(), passage.composer.as_deref()) {
        (Some(title), Some(composer)) => format!("{title} ({composer})"),
        (Some(title), None) => title.to_string(),
        (None, Some(composer)) => composer.to_string(),
        (None, None) => return,
    };
    println!("{heading}\n");
}
