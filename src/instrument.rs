//! Instrument lookup tables.
//!
//! Tracks name their instrument with a free-form key ("piano", "bass", ...).
//! The MIDI encoder needs a General MIDI program for that key and the audio
//! renderer needs an oscillator shape. Both mappings are plain data so hosts
//! can extend them without touching either encoder.

use crate::audio::Waveform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Program used when an instrument key has no GM mapping (Acoustic Grand Piano).
pub const DEFAULT_PROGRAM: u8 = 0;

/// Built-in General MIDI programs, 0-indexed.
const GM_PROGRAMS: &[(&str, u8)] = &[
    ("piano", 0),
    ("grand-piano", 0),
    ("electric-piano", 4),
    ("keys", 4),
    ("organ", 19),
    ("guitar", 24),
    ("electric-guitar", 27),
    ("bass", 33),
    ("synth-bass", 38),
    ("violin", 40),
    ("strings", 48),
    ("choir", 52),
    ("trumpet", 56),
    ("brass", 61),
    ("saxophone", 65),
    ("flute", 73),
    ("lead", 80),
    ("synth", 81),
    ("pad", 88),
    ("drums", 0),
];

/// Built-in oscillator shapes.
const WAVEFORMS: &[(&str, Waveform)] = &[
    ("piano", Waveform::Triangle),
    ("grand-piano", Waveform::Triangle),
    ("electric-piano", Waveform::Sine),
    ("keys", Waveform::Sine),
    ("organ", Waveform::Square),
    ("guitar", Waveform::Triangle),
    ("electric-guitar", Waveform::Sawtooth),
    ("bass", Waveform::Square),
    ("synth-bass", Waveform::Sawtooth),
    ("strings", Waveform::Sawtooth),
    ("brass", Waveform::Sawtooth),
    ("lead", Waveform::Sawtooth),
    ("synth", Waveform::Sawtooth),
    ("pad", Waveform::Sine),
    ("flute", Waveform::Sine),
];

/// Instrument key → GM program and oscillator shape.
///
/// `InstrumentTable::default()` is empty; [`InstrumentTable::builtin`] holds
/// the stock mappings. Keys are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentTable {
    #[serde(default)]
    programs: HashMap<String, u8>,
    #[serde(default)]
    waveforms: HashMap<String, Waveform>,
}

impl InstrumentTable {
    /// The stock table shipped with the exporter.
    pub fn builtin() -> Self {
        let programs = GM_PROGRAMS
            .iter()
            .map(|&(key, program)| (key.to_string(), program))
            .collect();
        let waveforms = WAVEFORMS
            .iter()
            .map(|&(key, waveform)| (key.to_string(), waveform))
            .collect();
        Self {
            programs,
            waveforms,
        }
    }

    /// Adds or replaces a GM program mapping. Programs above 127 are clamped.
    pub fn with_program(mut self, key: &str, program: u8) -> Self {
        self.programs.insert(normalize_key(key), program.min(127));
        self
    }

    /// Adds or replaces a waveform mapping.
    pub fn with_waveform(mut self, key: &str, waveform: Waveform) -> Self {
        self.waveforms.insert(normalize_key(key), waveform);
        self
    }

    /// Overlays another table on top of this one; entries in `overrides` win.
    pub fn merged(mut self, overrides: &InstrumentTable) -> Self {
        for (key, &program) in &overrides.programs {
            self.programs.insert(normalize_key(key), program.min(127));
        }
        for (key, &waveform) in &overrides.waveforms {
            self.waveforms.insert(normalize_key(key), waveform);
        }
        self
    }

    /// GM program for an instrument key, if one is mapped. Clamped to 127.
    pub fn lookup_program(&self, instrument: &str) -> Option<u8> {
        self.programs
            .get(&normalize_key(instrument))
            .map(|&program| program.min(127))
    }

    /// GM program for an instrument key, falling back to piano.
    pub fn program_for(&self, instrument: &str) -> u8 {
        self.lookup_program(instrument).unwrap_or_else(|| {
            tracing::debug!("No GM program for instrument {:?}, using piano", instrument);
            DEFAULT_PROGRAM
        })
    }

    /// Oscillator shape for an instrument key, falling back to a sine.
    pub fn waveform_for(&self, instrument: &str) -> Waveform {
        self.waveforms
            .get(&normalize_key(instrument))
            .copied()
            .unwrap_or_default()
    }
}

fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}
