//! Export options and project snapshots.
//!
//! The editor hands over its tracks together with an options object. Both can
//! arrive as JSON, so every option has a default and out-of-range values
//! degrade to those defaults instead of failing.

use super::track::Track;
use super::DEFAULT_BPM;
use crate::audio::{render_master_mix_with, render_stems_with, AudioBuffer, Stem};
use crate::error::ExportError;
use crate::instrument::InstrumentTable;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default sample rate for audio exports.
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Project name used when none is given.
pub const DEFAULT_PROJECT_NAME: &str = "Untitled";

/// Time signature as written (numerator over denominator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Beats per measure.
    pub numerator: u8,
    /// Beat unit (4 = quarter note, 8 = eighth note, ...).
    pub denominator: u8,
}

impl TimeSignature {
    /// Creates a time signature.
    pub fn new(numerator: u8, denominator: u8) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Options for a single export call. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    /// Tempo in beats per minute.
    pub bpm: f64,

    /// Time signature written to the MIDI tempo track.
    pub time_signature: TimeSignature,

    /// Sample rate for audio renders, in Hz.
    pub sample_rate: u32,

    /// Used for the MIDI tempo track name and download filenames.
    pub project_name: String,

    /// Peak-normalize rendered audio after mixing.
    pub normalize: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            time_signature: TimeSignature::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            normalize: true,
        }
    }
}

impl ExportOptions {
    /// Tempo to export with; unusable values fall back to 120 BPM.
    pub fn effective_bpm(&self) -> f64 {
        if self.bpm.is_finite() && self.bpm > 0.0 {
            self.bpm
        } else {
            DEFAULT_BPM
        }
    }

    /// Sample rate to render at; zero falls back to 44.1 kHz.
    pub fn effective_sample_rate(&self) -> u32 {
        if self.sample_rate == 0 {
            DEFAULT_SAMPLE_RATE
        } else {
            self.sample_rate
        }
    }
}

/// A snapshot of the editor state taken for one export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Tracks in editor order.
    #[serde(default)]
    pub tracks: Vec<Track>,

    /// Export options.
    #[serde(default)]
    pub options: ExportOptions,

    /// Instrument mappings layered over the built-in table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<InstrumentTable>,
}

impl Project {
    /// Creates a project from tracks and options.
    pub fn new(tracks: Vec<Track>, options: ExportOptions) -> Self {
        Self {
            tracks,
            options,
            instruments: None,
        }
    }

    /// Parses a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not describe a list of tracks with
    /// options. Musical values inside are never rejected.
    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if file reading or parsing fails
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Built-in instruments with this project's overrides applied.
    pub fn instrument_table(&self) -> InstrumentTable {
        let builtin = InstrumentTable::builtin();
        match &self.instruments {
            Some(overrides) => builtin.merged(overrides),
            None => builtin,
        }
    }

    /// Encodes the project as Standard MIDI File bytes.
    pub fn encode_midi(&self) -> Vec<u8> {
        super::encode_midi_with(&self.tracks, &self.options, &self.instrument_table())
    }

    /// Writes the project to a Standard MIDI File (.mid).
    ///
    /// # Errors
    ///
    /// Returns error if file creation or writing fails
    pub fn export_to_midi<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        super::midi_export::write_midi_file(&self.encode_midi(), path)
    }

    /// Renders the master mix.
    pub fn render_master_mix(&self) -> AudioBuffer {
        render_master_mix_with(&self.tracks, &self.options, &self.instrument_table())
    }

    /// Renders one WAV stem per audible, non-empty track.
    ///
    /// # Errors
    ///
    /// Returns error if WAV encoding fails
    pub fn render_stems(&self) -> Result<Vec<Stem>, ExportError> {
        render_stems_with(&self.tracks, &self.options, &self.instrument_table())
    }
}
