//! Plain-text rendering of matrices and leaves

use crate::config::{AgniConfig, DisplayFormat};
use crate::matrix::FrequencyMatrix;
use crate::passage::MatrixLeaf;
use crate::pitch::{self, Pitch, PitchType, Tuning};

const COLUMN_GAP: &str = "  ";

pub fn render(matrix: &FrequencyMatrix, config: &AgniConfig) -> String {
    match config.display_format {
        DisplayFormat::Table => render_table(matrix, config.pitch_type, config.tuning),
        DisplayFormat::List => render_list(matrix, config.pitch_type, config.tuning),
        DisplayFormat::Chord => render_chord(matrix, config.pitch_type, config.tuning),
        DisplayFormat::Melody => render_melody(matrix, config.pitch_type, config.tuning),
    }
}

/// Render every matrix, separated by blank lines
pub fn render_all(matrices: &[FrequencyMatrix], config: &AgniConfig) -> String {
    matrices
        .iter()
        .map(|m| render(m, config))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_table(matrix: &FrequencyMatrix, pitch_type: PitchType, tuning: Tuning) -> String {
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(matrix.multiples + 1);
    let header = std::iter::once(String::new())
        .chain((0..matrix.multiples).map(|j| format!("{j} x melody")))
        .collect();
    rows.push(header);
    for (i, cells) in matrix.rows().iter().enumerate() {
        let row = std::iter::once(format!("{i} x bass"))
            .chain(cells.iter().map(|cell| cell.display(pitch_type, tuning)))
            .collect();
        rows.push(row);
    }
    let title = format!("Combination-Tone Matrix ({})", pitch_type.title());
    format!("{title}\n\n{}", align_columns(&rows))
}

pub fn render_list(matrix: &FrequencyMatrix, pitch_type: PitchType, tuning: Tuning) -> String {
    matrix
        .sorted_frequencies()
        .into_iter()
        .filter_map(|f| pitch::display(f, pitch_type, tuning))
        .map(|text| single_line(&text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_chord(matrix: &FrequencyMatrix, pitch_type: PitchType, tuning: Tuning) -> String {
    matrix
        .sorted_pitches()
        .iter()
        .map(|p| format!("{} = {}", p.label(false), single_line(&p.display(pitch_type, tuning))))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_melody(matrix: &FrequencyMatrix, pitch_type: PitchType, tuning: Tuning) -> String {
    matrix
        .sorted_pitches()
        .iter()
        .map(|p| format!("{}: {}", p.label(true), single_line(&p.display(pitch_type, tuning))))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per leaf: duration, bass, melody and flags
pub fn render_leaves(leaves: &[MatrixLeaf], pitch_type: PitchType, tuning: Tuning) -> String {
    let describe = |pitch: Option<Pitch>| {
        pitch
            .and_then(|p| pitch::display(p.hertz, pitch_type, tuning))
            .map(|text| single_line(&text))
            .unwrap_or_else(|| "rest".to_string())
    };
    let mut rows = vec![vec![
        "duration".to_string(),
        "bass".to_string(),
        "melody".to_string(),
        "notes".to_string(),
    ]];
    for leaf in leaves {
        let mut notes = Vec::new();
        if leaf.is_rest {
            notes.push("multi-measure rest".to_string());
        }
        if leaf.tie {
            notes.push("tie".to_string());
        }
        if let Some(ratio) = leaf.tuplet {
            let start = if leaf.is_first_in_tuplet { " start" } else { "" };
            notes.push(format!("tuplet {}{start}", ratio.colon_string()));
        }
        rows.push(vec![
            leaf.duration.to_string(),
            describe(leaf.bass),
            describe(leaf.melody),
            notes.join(", "),
        ]);
    }
    align_columns(&rows)
}

fn single_line(text: &str) -> String {
    text.replace('\n', " ")
}

/// Left-align cells into columns. Multi-line cells make their row taller.
fn align_columns(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0; columns];
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            let cell_width = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
            *width = (*width).max(cell_width);
        }
    }

    let mut lines = Vec::new();
    for row in rows {
        let height = row.iter().map(|c| c.lines().count()).max().unwrap_or(0).max(1);
        for line_index in 0..height {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| {
                    let text = cell.lines().nth(line_index).unwrap_or("");
                    format!("{text:<width$}")
                })
                .collect::<Vec<_>>()
                .join(COLUMN_GAP);
            lines.push(line.trim_end().to_string());
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::{Duration, TupletRatio};

    fn matrix() -> FrequencyMatrix {
        FrequencyMatrix::new(440.0, 466.0, 2).unwrap()
    }

    #[test]
    fn test_table() {
        let text = render_table(&matrix(), PitchType::Hertz, Tuning::Microtonal);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Combination-Tone Matrix (Hertz)");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "          0 x melody  1 x melody");
        assert_eq!(lines[3], "0 x bass              466.0");
        assert_eq!(lines[4], "1 x bass  440.0       906.0");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_table_with_all_pitch_types() {
        let text = render_table(&matrix(), PitchType::All, Tuning::Microtonal);
        assert!(text.starts_with("Combination-Tone Matrix (All)"));
        // title, blank line, header, then three lines per bass row
        assert_eq!(text.lines().count(), 2 + 1 + 3 + 3);
        assert!(text.contains("a'"));
    }

    #[test]
    fn test_list() {
        let text = render_list(&matrix(), PitchType::Hertz, Tuning::Microtonal);
        assert_eq!(text, "466.0\n906.0");
    }

    #[test]
    fn test_chord_and_melody() {
        let chord = render_chord(&matrix(), PitchType::Hertz, Tuning::EqualTempered);
        assert_eq!(
            chord,
            "(1 x bass) + (0 x melody) = 440\n\
             (0 x bass) + (1 x melody) = 466\n\
             (1 x bass) + (1 x melody) = 906"
        );
        let melody = render_melody(&matrix(), PitchType::Midi, Tuning::EqualTempered);
        assert_eq!(melody.lines().next(), Some("1B + 0M: 69"));
    }

    #[test]
    fn test_render_follows_config() {
        let config = AgniConfig { display_format: DisplayFormat::List, ..Default::default() };
        let text = render_all(&[matrix(), matrix()], &config);
        assert_eq!(text, "466.0\n906.0\n\n466.0\n906.0");
    }

    #[test]
    fn test_leaves() {
        let leaves = vec![
            MatrixLeaf {
                bass: Some(Pitch::from_hertz(440.0)),
                melody: None,
                duration: Duration::new(1, 8),
                elapsed: Duration::new(1, 12),
                is_rest: false,
                tie: true,
                tuplet: Some(TupletRatio::new(2, 3)),
                is_first_in_tuplet: true,
            },
        ];
        let text = render_leaves(&leaves, PitchType::Hertz, Tuning::Microtonal);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("duration"));
        assert_eq!(lines[1], "1/8       440.0  rest    tie, tuplet 3:2 start");
    }
}
