//! Basic oscillator shapes.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Oscillator waveform used to voice a track.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// Sine wave.
    #[default]
    Sine,
    /// Square wave.
    Square,
    /// Sawtooth wave.
    Sawtooth,
    /// Triangle wave.
    Triangle,
}

impl Waveform {
    /// Value of the waveform at a phase measured in cycles.
    ///
    /// Every shape starts at zero (or, for the square, at +1) and has a peak
    /// amplitude of 1.
    pub fn sample_at(self, phase: f64) -> f64 {
        match self {
            Waveform::Sine => (TAU * phase).sin(),
            Waveform::Square => {
                if phase.rem_euclid(1.0) < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => 2.0 * (phase - (phase + 0.5).floor()),
            Waveform::Triangle => 4.0 * ((phase - 0.25).rem_euclid(1.0) - 0.5).abs() - 1.0,
        }
    }
}

/// Fills `out` with `waveform` at `frequency`, starting at phase zero.
pub fn fill(out: &mut [f64], waveform: Waveform, frequency: f64, sample_rate: f64) {
    let increment = frequency / sample_rate;
    for (i, sample) in out.iter_mut().enumerate() {
        *sample = waveform.sample_at(i as f64 * increment);
    }
}
