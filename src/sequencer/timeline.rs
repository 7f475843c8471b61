// Timeline - musical time parameters for step playback
// Time signature, playback resolution, and the step-length derivation

use std::fmt;

/// Time signature (numerator/denominator)
/// Example: 4/4 time = TimeSignature { numerator: 4, denominator: 4 }
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u8,   // Beats per bar (typically 3, 4, 5, 6, 7)
    pub denominator: u8, // Note value (4 = quarter note, 8 = eighth note)
}

impl TimeSignature {
    /// Creates a new time signature
    ///
    /// Values are taken as-is; degenerate host-reported signatures are
    /// rejected at the adoption site, not here.
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Common 4/4 time signature
    pub fn four_four() -> Self {
        Self::new(4, 4)
    }

    /// True when both fields are usable for timing math
    pub fn is_valid(&self) -> bool {
        self.numerator > 0 && self.denominator > 0
    }

    /// Bar length expressed in quarter notes
    /// Example: 4/4 = 4.0, 6/8 = 3.0
    pub fn quarters_per_bar(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::four_four()
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Playback resolution: scales step duration without changing pattern length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    HalfTime,
    NormalTime,
    DoubleTime,
}

impl Resolution {
    /// Multiplier applied to the step duration
    pub fn factor(&self) -> f64 {
        match self {
            Resolution::HalfTime => 2.0,
            Resolution::NormalTime => 1.0,
            Resolution::DoubleTime => 0.5,
        }
    }

    /// Persisted index (0 = half, 1 = normal, 2 = double)
    pub fn index(&self) -> u8 {
        match self {
            Resolution::HalfTime => 0,
            Resolution::NormalTime => 1,
            Resolution::DoubleTime => 2,
        }
    }

    /// Resolve a persisted index; None for unknown values
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Resolution::HalfTime),
            1 => Some(Resolution::NormalTime),
            2 => Some(Resolution::DoubleTime),
            _ => None,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution::NormalTime
    }
}

/// Duration of one step in samples
///
/// With `beats_per_bar` quarter notes per bar and the whole pattern
/// spanning one bar, `steps_per_beat = num_steps / beats_per_bar` and
/// `seconds_per_step = (60 / bpm) / steps_per_beat`, scaled by the
/// resolution factor.
///
/// Degenerate input never divides by zero: a non-positive sample rate
/// yields 0.0 (callers treat that as "no step length"), and a
/// non-positive bpm or empty pattern falls back to a quarter second.
pub fn samples_per_step(
    bpm: f64,
    time_signature: TimeSignature,
    num_steps: usize,
    resolution: Resolution,
    sample_rate: f64,
) -> f64 {
    if sample_rate <= 0.0 {
        return 0.0;
    }
    if bpm <= 0.0 || num_steps == 0 || !time_signature.is_valid() {
        return sample_rate / 4.0;
    }

    let beats_per_bar = time_signature.quarters_per_bar();
    let steps_per_beat = num_steps as f64 / beats_per_bar;
    let seconds_per_step = (60.0 / bpm) / steps_per_beat * resolution.factor();

    seconds_per_step * sample_rate
}

/// Length of one step in quarter-note (PPQ) units
///
/// Used to map a host PPQ position onto a step index. Returns 0.0 for
/// degenerate input.
pub fn ppq_per_step(
    time_signature: TimeSignature,
    num_steps: usize,
    resolution: Resolution,
) -> f64 {
    if num_steps == 0 || !time_signature.is_valid() {
        return 0.0;
    }

    time_signature.quarters_per_bar() * resolution.factor() / num_steps as f64
}
