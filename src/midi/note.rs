//! Note representation.
//!
//! A note is a pitch spelling plus octave, placed on the 16th-note step grid
//! with a length and a velocity. Values come straight from the editor and may
//! be out of range; the accessors here apply the clamping policy used by both
//! encoders.

use super::{midi_to_frequency_hz, note_to_midi_number};
use serde::{Deserialize, Serialize};

/// A single note as edited in the piano roll or step sequencer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Pitch class spelling such as "C", "F#" or "Bb".
    pub pitch_name: String,

    /// Octave number; C4 is middle C.
    pub octave: i32,

    /// Start position in 16th-note steps.
    pub step: f64,

    /// Length in steps.
    pub length: f64,

    /// Velocity (0-127).
    #[serde(default = "default_velocity")]
    pub velocity: i32,
}

fn default_velocity() -> i32 {
    100
}

impl Note {
    /// Creates a new note.
    ///
    /// # Examples
    ///
    /// ```
    /// use beatforge_export::midi::Note;
    ///
    /// // Middle C, quarter note on the first beat
    /// let note = Note::new("C", 4, 0.0, 4.0, 100);
    /// assert_eq!(note.midi_number(), 60);
    /// ```
    pub fn new(
        pitch_name: impl Into<String>,
        octave: i32,
        step: f64,
        length: f64,
        velocity: i32,
    ) -> Self {
        Self {
            pitch_name: pitch_name.into(),
            octave,
            step,
            length,
            velocity,
        }
    }

    /// MIDI note number, clamped into 0-127.
    pub fn midi_number(&self) -> u8 {
        note_to_midi_number(&self.pitch_name, self.octave).clamp(0, 127) as u8
    }

    /// Frequency in Hz, A4 = 440, of the clamped MIDI note.
    pub fn frequency_hz(&self) -> f64 {
        midi_to_frequency_hz(self.midi_number() as i64)
    }

    /// Start step, with negative positions moved to the beginning.
    pub fn start_step(&self) -> f64 {
        self.step.max(0.0)
    }

    /// Length in steps, never negative.
    pub fn length_steps(&self) -> f64 {
        self.length.max(0.0)
    }

    /// End position in steps (start + length).
    pub fn end_step(&self) -> f64 {
        self.start_step() + self.length_steps()
    }

    /// Whether the note has any duration to render or emit.
    pub fn is_sounding(&self) -> bool {
        self.length > 0.0
    }

    /// Velocity clamped into the valid MIDI range.
    pub fn clamped_velocity(&self) -> u8 {
        self.velocity.clamp(0, 127) as u8
    }

    /// MIDI note-on velocity after folding in a track volume (0-100).
    ///
    /// Never returns 0, since a note-on with velocity 0 is a note-off.
    pub fn scaled_velocity(&self, volume: f64) -> u8 {
        let scaled = (self.velocity as f64 * volume / 100.0).round();
        if scaled.is_nan() {
            return 1;
        }
        scaled.clamp(1.0, 127.0) as u8
    }
}
