//! Pitches, tunings and pitch display

use serde::{Deserialize, Serialize};

use crate::error::{AgniError, Result};

/// How numeric pitch text is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PitchInput {
    #[default]
    Hertz,
    Midi,
}

/// How derived frequencies are snapped when displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tuning {
    #[default]
    Microtonal,
    EqualTempered,
}

/// Which representation of a frequency to display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PitchType {
    #[default]
    Hertz,
    Midi,
    Lilypond,
    All,
}

impl PitchType {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Hertz => "Hertz",
            Self::Midi => "Midi",
            Self::Lilypond => "Lilypond",
            Self::All => "All",
        }
    }
}

const SEMITONE_NAMES: [&str; 12] = [
    "c", "cs", "d", "ef", "e", "f", "fs", "g", "af", "a", "bf", "b",
];

/// Names for the quarter-tone above each semitone
const QUARTER_TONE_NAMES: [&str; 12] = [
    "cqs", "dqf", "dqs", "eqf", "eqs", "fqs", "gqf", "gqs", "aqf", "aqs", "bqf", "bqs",
];

/// A sounding pitch, stored as its frequency in hertz
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Pitch {
    pub hertz: f64,
}

impl Pitch {
    pub fn from_hertz(hertz: f64) -> Self {
        Self { hertz }
    }

    pub fn from_midi(midi: f64) -> Self {
        Self { hertz: midi_to_hertz(midi) }
    }

    /// Parse pitch text. Numbers are hertz or MIDI numbers depending on
    /// `input`; anything else is read as a LilyPond note name.
    pub fn parse(text: &str, input: PitchInput) -> Result<Self> {
        let text = text.trim();
        if let Ok(number) = text.parse::<f64>() {
            if !number.is_finite() {
                return Err(AgniError::InvalidPitch(text.to_string()));
            }
            return Ok(match input {
                PitchInput::Hertz => Self::from_hertz(number),
                PitchInput::Midi => Self::from_midi(number),
            });
        }
        parse_lilypond_midi(text).map(Self::from_midi)
    }

    pub fn midi(&self) -> f64 {
        hertz_to_midi(self.hertz)
    }

    /// Key for exact comparisons and hashing
    pub(crate) fn bits(&self) -> u64 {
        self.hertz.to_bits()
    }

    pub fn lilypond_name(&self, tuning: Tuning) -> String {
        lilypond_name(self.hertz, tuning).unwrap_or_default()
    }
}

pub fn midi_to_hertz(midi: f64) -> f64 {
    2f64.powf((midi - 69.0) / 12.0) * 440.0
}

pub fn hertz_to_midi(hertz: f64) -> f64 {
    12.0 * (hertz / 440.0).log2() + 69.0
}

fn is_silent(frequency: f64) -> bool {
    frequency == 0.0 || !frequency.is_finite()
}

/// Hertz display: two decimals when microtonal, whole hertz when equal-tempered
pub fn hertz_display(frequency: f64, tuning: Tuning) -> Option<String> {
    if is_silent(frequency) {
        return None;
    }
    let text = match tuning {
        Tuning::Microtonal => {
            let rounded = (frequency * 100.0).round() / 100.0;
            let text = rounded.to_string();
            if text.contains('.') { text } else { format!("{text}.0") }
        }
        Tuning::EqualTempered => format!("{}", frequency.round() as i64),
    };
    Some(group_thousands(&text))
}

/// MIDI number display: nearest half step when microtonal, nearest step otherwise
pub fn midi_display(frequency: f64, tuning: Tuning) -> Option<String> {
    if is_silent(frequency) {
        return None;
    }
    let midi = hertz_to_midi(frequency);
    Some(match tuning {
        Tuning::Microtonal => format!("{:.1}", (midi * 2.0).round() / 2.0),
        Tuning::EqualTempered => format!("{}", midi.round() as i64),
    })
}

/// LilyPond note name for a frequency
pub fn lilypond_name(frequency: f64, tuning: Tuning) -> Option<String> {
    if is_silent(frequency) {
        return None;
    }
    let mut midi = quantize_quarter_tone(hertz_to_midi(frequency));
    if tuning == Tuning::EqualTempered {
        midi = midi.floor();
    }
    let semitone = midi.floor();
    let is_quarter_tone = midi > semitone;
    let semitone = semitone as i64;
    let pitch_class = semitone.rem_euclid(12) as usize;
    let octave = semitone.div_euclid(12) - 4;
    let mut name = if is_quarter_tone {
        QUARTER_TONE_NAMES[pitch_class].to_string()
    } else {
        SEMITONE_NAMES[pitch_class].to_string()
    };
    let mark = if octave > 0 { '\'' } else { ',' };
    for _ in 0..octave.unsigned_abs() {
        name.push(mark);
    }
    Some(name)
}

/// Hertz, name and MIDI number on separate lines
pub fn all_displays(frequency: f64, tuning: Tuning) -> Option<String> {
    let hertz = hertz_display(frequency, tuning)?;
    let name = lilypond_name(frequency, tuning)?;
    let midi = midi_display(frequency, tuning)?;
    Some(format!("{hertz}\n{name}\n{midi}"))
}

pub fn display(frequency: f64, pitch_type: PitchType, tuning: Tuning) -> Option<String> {
    match pitch_type {
        PitchType::Hertz => hertz_display(frequency, tuning),
        PitchType::Midi => midi_display(frequency, tuning),
        PitchType::Lilypond => lilypond_name(frequency, tuning),
        PitchType::All => all_displays(frequency, tuning),
    }
}

/// Snap to the nearest eighth-tone, then resolve eighth-tones to the
/// neighbouring semitone so only semitones and quarter-tones remain.
fn quantize_quarter_tone(midi: f64) -> f64 {
    let eighths = (midi * 4.0).round() / 4.0;
    let fraction = eighths - eighths.floor();
    if fraction == 0.25 {
        eighths.floor()
    } else if fraction == 0.75 {
        eighths.ceil()
    } else {
        eighths
    }
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Parse a LilyPond note name (`a'`, `bf,`, `cqs''`) into a MIDI number
fn parse_lilypond_midi(text: &str) -> Result<f64> {
    let invalid = || AgniError::InvalidPitch(text.to_string());
    let mut chars = text.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let step = match letter {
        'c' => 0.0,
        'd' => 2.0,
        'e' => 4.0,
        'f' => 5.0,
        'g' => 7.0,
        'a' => 9.0,
        'b' => 11.0,
        _ => return Err(invalid()),
    };
    let rest = chars.as_str();
    let marks_start = rest.find(['\'', ',']).unwrap_or(rest.len());
    let (accidental, marks) = rest.split_at(marks_start);
    let alteration = match accidental {
        "" => 0.0,
        "s" => 1.0,
        "f" => -1.0,
        "ss" => 2.0,
        "ff" => -2.0,
        "qs" => 0.5,
        "qf" => -0.5,
        "tqs" => 1.5,
        "tqf" => -1.5,
        _ => return Err(invalid()),
    };
    let mut octave = 0i32;
    for mark in marks.chars() {
        match mark {
            '\'' => octave += 1,
            ',' => octave -= 1,
            _ => return Err(invalid()),
        }
    }
    Ok(48.0 + 12.0 * octave as f64 + step + alteration)
}
